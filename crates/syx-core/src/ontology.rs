//! The synthesis ontology: the structural contracts LLM output must satisfy.
//!
//! All types derive `JsonSchema`; `syx-schema` builds its registry from them
//! at construction time. Validation is structural only; nothing here checks
//! that a chemical formula or stoichiometry string is chemically meaningful.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage I/O envelopes
// ---------------------------------------------------------------------------

/// Output of the paragraph-extraction stage: the subset of the paper that
/// describes synthesis work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SynthesisParagraphs {
    /// Verbatim synthesis paragraphs, concatenated.
    pub synthesis_paragraphs: String,
}

/// Output of the material-extraction stage: which compounds the paper
/// actually synthesizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaterialList {
    /// Names of synthesized target materials, one entry per compound.
    pub materials: Vec<String>,
}

// ---------------------------------------------------------------------------
// General synthesis ontology
// ---------------------------------------------------------------------------

/// Role a material plays within a synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialRole {
    Precursor,
    Support,
    Solvent,
    Additive,
    Reagent,
}

/// A material consumed by the synthesis, with amount and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Material {
    /// Vendor, when stated (e.g. "Sinopharm Chemical Reagent Co. Ltd.").
    pub vendor: Option<String>,
    /// Material name (e.g. "Nickel Nitrate", "Deionized Water").
    pub name: String,
    /// Amount used, without unit.
    pub amount: f64,
    /// Unit of the amount (e.g. "g", "mol", "wt%").
    pub unit: String,
    pub role: MaterialRole,
    /// Stoichiometry within the synthesis (e.g. "1:2"), when stated.
    pub stoichiometry: Option<String>,
}

/// Physical conditions attached to a process step. All fields optional:
/// papers rarely state every one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conditions {
    pub temperature: Option<f64>,
    /// Unit of the temperature (e.g. "C", "K").
    pub temp_unit: Option<String>,
    pub duration: Option<f64>,
    /// Unit of the duration (e.g. "h", "min", "s").
    pub time_unit: Option<String>,
    /// Atmosphere (e.g. "air", "N2", "H2").
    pub atmosphere: Option<String>,
    pub stirring: Option<bool>,
}

/// The closed set of process actions the ontology recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Add,
    Mix,
    Heat,
    Reflux,
    Age,
    Filter,
    Wash,
    Dry,
    Reduce,
    Calcine,
}

impl StepAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Mix => "mix",
            Self::Heat => "heat",
            Self::Reflux => "reflux",
            Self::Age => "age",
            Self::Filter => "filter",
            Self::Wash => "wash",
            Self::Dry => "dry",
            Self::Reduce => "reduce",
            Self::Calcine => "calcine",
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the synthesis procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessStep {
    pub action: StepAction,
    /// Names of materials involved in this step.
    pub materials: Vec<String>,
    pub conditions: Option<Conditions>,
}

/// Support material of a catalyst target compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Support {
    /// Support material name (e.g. "Al2O3", "SiO2").
    pub name: String,
    /// Whether the support was purchased rather than synthesized.
    pub purchased: bool,
}

/// The compound a synthesis targets, for catalyst-style papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetCompound {
    /// Active species composition, without support (e.g. "Ni1Co9").
    pub active_species: String,
    /// Metals present (e.g. `["Co", "Ni"]`).
    pub metals: Vec<String>,
    pub metal_loading: f64,
    /// Unit of the metal loading (e.g. "wt%", "mol%").
    pub loading_unit: String,
    pub support: Support,
    /// Synthesis method (e.g. "sol-gel", "hydrothermal").
    pub synthesis_method: String,
}

/// The structured synthesis procedure extracted for one target material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneralSynthesisOntology {
    pub id: String,
    /// Target compound composition.
    pub target_compound: String,
    /// Materials used in the synthesis.
    pub materials: Vec<String>,
    /// Ordered process steps.
    pub steps: Vec<ProcessStep>,
    /// Free-form notes, when the procedure needs them.
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Judge evaluation
// ---------------------------------------------------------------------------

/// One scored category of the judge's evaluation, 1.0 (poor) to 5.0
/// (excellent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryScore {
    pub score: f64,
    pub reasoning: String,
}

/// Category scores for an extracted synthesis procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationScores {
    /// Coverage of all synthesis information from the source text.
    pub structural_completeness: CategoryScore,
    /// Accuracy of material names, amounts, and units.
    pub material_extraction: CategoryScore,
    /// Sequencing and action classification of process steps.
    pub process_steps: CategoryScore,
    /// Temperature, duration, and atmosphere accuracy.
    pub conditions_extraction: CategoryScore,
    /// Overall score across categories, 1.0 to 5.0.
    pub overall_score: f64,
}

/// Output of the judge stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SynthesisEvaluation {
    /// Material the evaluated procedure targets.
    pub material: String,
    pub scores: EvaluationScores,
}
