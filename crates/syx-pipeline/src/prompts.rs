//! Prompt construction for each chain role.
//!
//! The system prompt instructs the model to answer with a single JSON object
//! satisfying the stage's extraction schema; the user prompt carries the
//! stage input (paper text or upstream records). Prompt content is
//! deliberately plain; variants are selected by name and recorded in
//! provenance.

use syx_config::StageRole;
use syx_core::artifact::StageResult;
use syx_core::paper::Paper;

/// System prompt for a role, embedding the JSON schema the output must
/// satisfy.
#[must_use]
pub fn system_prompt(role: StageRole, schema: &serde_json::Value) -> String {
    let task = match role {
        StageRole::ParagraphExtraction => {
            "Extract every paragraph describing synthesis work from the paper, verbatim."
        }
        StageRole::MaterialExtraction => {
            "List the materials that the paper reports synthesizing. One entry per target compound."
        }
        StageRole::SynthesisExtraction => {
            "Extract the structured synthesis procedure from the synthesis paragraphs."
        }
        StageRole::Judge => {
            "Evaluate how faithfully the structured procedure captures the source text. \
             Score each category from 1.0 (poor) to 5.0 (excellent)."
        }
    };
    format!(
        "{task}\n\nRespond with a single JSON object conforming to this JSON schema, \
         with no surrounding text:\n{schema}"
    )
}

/// User prompt for a role, assembled from the paper and the records produced
/// by upstream stages.
#[must_use]
pub fn user_prompt(role: StageRole, paper: &Paper, completed: &[StageResult]) -> String {
    match role {
        StageRole::ParagraphExtraction => {
            if paper.si_text.is_empty() {
                format!("Paper:\n{}", paper.publication_text)
            } else {
                format!(
                    "Paper:\n{}\n\nSupporting information:\n{}",
                    paper.publication_text, paper.si_text
                )
            }
        }
        StageRole::MaterialExtraction => format!(
            "Synthesis paragraphs:\n{}",
            paragraphs(completed).unwrap_or(&paper.publication_text)
        ),
        StageRole::SynthesisExtraction => format!(
            "Synthesis paragraphs:\n{}\n\nTarget materials:\n{}",
            paragraphs(completed).unwrap_or(&paper.publication_text),
            materials(completed).unwrap_or_default().join(", ")
        ),
        StageRole::Judge => format!(
            "Source text:\n{}\n\nExtracted procedure:\n{}",
            paper.publication_text,
            prior_value(completed, StageRole::SynthesisExtraction)
                .map(ToString::to_string)
                .unwrap_or_default()
        ),
    }
}

/// The validated payload of an upstream role, if it succeeded.
#[must_use]
pub fn prior_value(completed: &[StageResult], role: StageRole) -> Option<&serde_json::Value> {
    completed
        .iter()
        .find(|r| r.stage == role.as_str())
        .and_then(StageResult::record)
        .map(|record| &record.value)
}

fn paragraphs(completed: &[StageResult]) -> Option<&String> {
    match prior_value(completed, StageRole::ParagraphExtraction)?.get("synthesis_paragraphs")? {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    }
}

fn materials(completed: &[StageResult]) -> Option<Vec<String>> {
    let list = prior_value(completed, StageRole::MaterialExtraction)?
        .get("materials")?
        .as_array()?;
    Some(
        list.iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
    )
}
