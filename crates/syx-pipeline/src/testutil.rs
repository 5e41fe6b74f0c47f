//! Shared fixtures for pipeline unit tests.

use syx_llm::StubProvider;

pub(crate) fn paragraphs_json() -> String {
    serde_json::json!({"synthesis_paragraphs": "heat 400C 2h"}).to_string()
}

pub(crate) fn materials_json() -> String {
    serde_json::json!({"materials": ["NiO"]}).to_string()
}

pub(crate) fn synthesis_json() -> String {
    serde_json::json!({
        "id": "doc1",
        "target_compound": "NiO",
        "materials": ["Nickel Nitrate"],
        "steps": [{"action": "calcine", "materials": ["Nickel Nitrate"], "conditions": null}]
    })
    .to_string()
}

pub(crate) fn evaluation_json() -> String {
    let category = serde_json::json!({"score": 4.0, "reasoning": "covers the text"});
    serde_json::json!({
        "material": "NiO",
        "scores": {
            "structural_completeness": category.clone(),
            "material_extraction": category.clone(),
            "process_steps": category.clone(),
            "conditions_extraction": category,
            "overall_score": 4.0
        }
    })
    .to_string()
}

/// A stub with a valid response scripted for every chain role.
pub(crate) fn fully_scripted_stub() -> StubProvider {
    StubProvider::new()
        .with_text("paragraph_extraction", paragraphs_json())
        .with_text("material_extraction", materials_json())
        .with_text("synthesis_extraction", synthesis_json())
        .with_text("judge", evaluation_json())
}
