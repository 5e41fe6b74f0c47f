use std::sync::Arc;

use anyhow::Context;
use syx_config::{Composer, RunConfig, SynthexConfig};
use syx_core::ids::new_run_id;
use syx_llm::OpenAiCompatClient;
use syx_pipeline::Executor;
use syx_schema::SchemaRegistry;

use crate::cli::ExtractArgs;
use crate::progress::Progress;

pub async fn handle(args: &ExtractArgs, quiet: bool) -> anyhow::Result<()> {
    let base = SynthexConfig::load_with_dotenv().context("failed to load configuration")?;

    let mut composer = Composer::new(base).force_multirun(args.multirun);
    for assignment in &args.set {
        composer
            .parse_assignment(assignment)
            .with_context(|| format!("invalid override '{assignment}'"))?;
    }
    // Convenience flags yield to an explicit -S on the same key.
    if let Some(data_dir) = &args.data_dir {
        if !composer.declares("data.data_dir") {
            composer = composer.with_override("data.data_dir", vec![data_dir.clone().into()]);
        }
    }
    if let Some(run_dir) = &args.run_dir {
        if !composer.declares("result.run_dir") {
            composer = composer.with_override("result.run_dir", vec![run_dir.clone().into()]);
        }
    }
    if let Some(limit) = &args.limit {
        if !composer.declares("data.limit") {
            composer = composer.with_override("data.limit", vec![(*limit).into()]);
        }
    }

    let sweep = composer.compose().context("failed to compose sweep")?;
    let total_points = sweep.total();
    let points: Vec<RunConfig> = sweep
        .collect::<Result<_, _>>()
        .context("failed to expand sweep points")?;

    let run_id = new_run_id();
    tracing::info!(run_id, sweep_points = total_points, "composed run");

    let executor = Executor::new(
        Arc::new(OpenAiCompatClient::new()),
        Arc::new(SchemaRegistry::new()),
    );
    let progress = Progress::bar("extracting", !quiet);
    let executor = {
        let progress = progress.clone();
        executor.with_progress(move |completed, total| progress.update(completed, total))
    };

    let summary = match executor.execute(&run_id, points).await {
        Ok(summary) => summary,
        Err(error) => {
            progress.finish_err("run aborted");
            return Err(error).context("extraction run failed");
        }
    };
    progress.finish_ok(&format!(
        "{}/{} units fully extracted",
        summary.succeeded_units, summary.total_units
    ));

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
