use anyhow::Context;
use syx_schema::SchemaRegistry;

use crate::cli::SchemaAction;

pub fn handle(action: &SchemaAction) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match action {
        SchemaAction::List => {
            for name in registry.list() {
                println!("{name}");
            }
            Ok(())
        }
        SchemaAction::Show { name } => {
            let schema = registry
                .resolve(name)
                .with_context(|| format!("unknown schema '{name}'"))?;
            println!("{}", serde_json::to_string_pretty(schema)?);
            Ok(())
        }
    }
}
