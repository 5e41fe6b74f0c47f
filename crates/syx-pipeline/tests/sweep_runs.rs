//! End-to-end runs through compose, execute, and aggregate with a scripted
//! provider.

use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_jsonlines::json_lines;
use syx_config::{Composer, RunConfig, SynthexConfig};
use syx_core::artifact::RunArtifact;
use syx_llm::StubProvider;
use syx_pipeline::Executor;
use syx_schema::SchemaRegistry;

fn paragraphs_json() -> String {
    serde_json::json!({"synthesis_paragraphs": "heat 400C 2h"}).to_string()
}

fn scripted_stub() -> StubProvider {
    let category = serde_json::json!({"score": 4.0, "reasoning": "covers the text"});
    StubProvider::new()
        .with_text("paragraph_extraction", paragraphs_json())
        .with_text("material_extraction", serde_json::json!({"materials": ["NiO"]}).to_string())
        .with_text(
            "synthesis_extraction",
            serde_json::json!({
                "id": "doc1",
                "target_compound": "NiO",
                "materials": ["Nickel Nitrate"],
                "steps": [{"action": "calcine", "materials": ["Nickel Nitrate"], "conditions": null}]
            })
            .to_string(),
        )
        .with_text(
            "judge",
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
            .to_string(),
        )
}

fn base_config(data_dir: &Path, run_dir: &Path) -> SynthexConfig {
    let mut config = SynthexConfig::default();
    config.data.data_dir = data_dir.display().to_string();
    config.result.run_dir = run_dir.display().to_string();
    // The judge scorer makes scores deterministic across runs.
    config.result.scorer = "judge".into();
    config
}

fn compose(config: SynthexConfig, overrides: &[&str]) -> Vec<RunConfig> {
    let mut composer = Composer::new(config);
    for assignment in overrides {
        composer.parse_assignment(assignment).expect("override");
    }
    composer
        .compose()
        .expect("compose")
        .collect::<Result<_, _>>()
        .expect("sweep points")
}

fn executor() -> Executor<StubProvider> {
    Executor::new(Arc::new(scripted_stub()), Arc::new(SchemaRegistry::new()))
}

#[tokio::test]
async fn degenerate_sweep_is_a_single_unkeyed_point() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("alpha.txt"), "alpha body").unwrap();

    let points = compose(base_config(data.path(), results.path()), &[]);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].sweep_point_id, None);

    let summary = executor().execute("run-a", points).await.unwrap();
    assert_eq!(summary.total_units, 1);
    assert_eq!(summary.succeeded_units, 1);
    assert_eq!(summary.mean_score, Some(4.0));

    // No sweep point in the key, no point directory on disk.
    assert!(results.path().join("run-a/alpha.json").exists());
}

#[tokio::test]
async fn sweep_points_enumerate_in_deterministic_order() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();

    let points = compose(
        base_config(data.path(), results.path()),
        &[
            "judge.model=gpt-4o-mini,gpt-4o",
            "synthesis_extraction.prompt_variant=default,terse",
        ],
    );

    let seen: Vec<(Option<String>, String, String)> = points
        .iter()
        .map(|p| {
            (
                p.sweep_point_id.clone(),
                p.config.judge.model.clone(),
                p.config.synthesis_extraction.prompt_variant.clone(),
            )
        })
        .collect();

    // Earlier assignments vary slower.
    assert_eq!(
        seen,
        vec![
            (Some("point-000".into()), "gpt-4o-mini".into(), "default".into()),
            (Some("point-001".into()), "gpt-4o-mini".into(), "terse".into()),
            (Some("point-002".into()), "gpt-4o".into(), "default".into()),
            (Some("point-003".into()), "gpt-4o".into(), "terse".into()),
        ]
    );
}

#[tokio::test]
async fn two_by_two_sweep_over_two_documents_yields_eight_unique_artifacts() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("alpha.txt"), "alpha body").unwrap();
    std::fs::write(data.path().join("beta.txt"), "beta body").unwrap();

    let points = compose(
        base_config(data.path(), results.path()),
        &[
            "judge.model=gpt-4o-mini,gpt-4o",
            "synthesis_extraction.model=gpt-4o-mini,mistral-large",
        ],
    );
    assert_eq!(points.len(), 4);

    let summary = executor().execute("run-b", points).await.unwrap();
    assert_eq!(summary.total_units, 8);
    assert_eq!(summary.succeeded_units, 8);

    let artifacts: Vec<RunArtifact> = json_lines(results.path().join("run-b/artifacts.jsonl"))
        .unwrap()
        .collect::<std::io::Result<_>>()
        .unwrap();
    assert_eq!(artifacts.len(), 8);

    let mut keys: Vec<String> = artifacts.iter().map(RunArtifact::key).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 8, "artifact keys must be unique");

    for idx in 0..4 {
        for doc in ["alpha", "beta"] {
            let path = results
                .path()
                .join(format!("run-b/point-{idx:03}/{doc}.json"));
            assert!(path.exists(), "missing {}", path.display());
        }
    }
}

#[tokio::test]
async fn identical_configs_reproduce_identical_stage_payloads() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("alpha.txt"), "alpha body").unwrap();

    let config = base_config(data.path(), results.path());
    executor()
        .execute("run-first", compose(config.clone(), &[]))
        .await
        .unwrap();
    executor()
        .execute("run-second", compose(config, &[]))
        .await
        .unwrap();

    let first: RunArtifact = serde_json::from_slice(
        &std::fs::read(results.path().join("run-first/alpha.json")).unwrap(),
    )
    .unwrap();
    let second: RunArtifact = serde_json::from_slice(
        &std::fs::read(results.path().join("run-second/alpha.json")).unwrap(),
    )
    .unwrap();

    assert_eq!(first.score, second.score);
    let first_values: Vec<_> = first.stages.iter().map(|s| s.record().map(|r| &r.value)).collect();
    let second_values: Vec<_> = second.stages.iter().map(|s| s.record().map(|r| &r.value)).collect();
    assert_eq!(first_values, second_values);
}

#[tokio::test]
async fn forced_multirun_keys_a_single_point() {
    let data = tempfile::tempdir().unwrap();
    let results = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("alpha.txt"), "alpha body").unwrap();

    let points: Vec<RunConfig> = Composer::new(base_config(data.path(), results.path()))
        .force_multirun(true)
        .compose()
        .expect("compose")
        .collect::<Result<_, _>>()
        .expect("sweep points");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].sweep_point_id.as_deref(), Some("point-000"));

    executor().execute("run-c", points).await.unwrap();
    assert!(results.path().join("run-c/point-000/alpha.json").exists());
}
