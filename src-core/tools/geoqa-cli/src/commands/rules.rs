// FICHIER : src-core/tools/geoqa-cli/src/commands/rules.rs

use anyhow::Result;
use clap::Args;
use geoqa::qa_engine::RuleEngine;
use serde_json::json;

#[derive(Args, Clone, Debug, Default)]
pub struct RulesArgs {
    /// Sortie JSON plutôt qu'un tableau texte
    #[arg(long)]
    pub json: bool,
}

pub fn handle(args: RulesArgs) -> Result<()> {
    println!("{}", render(&RuleEngine::standard(), args.json)?);
    Ok(())
}

fn render(engine: &RuleEngine, as_json: bool) -> Result<String> {
    if as_json {
        let rules: Vec<_> = engine
            .rules()
            .iter()
            .map(|r| {
                json!({
                    "name": r.name().as_str(),
                    "policy": r.describe(),
                    "fault_status": r.fault_status().as_str(),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&rules)?);
    }

    let width = engine
        .rules()
        .iter()
        .map(|r| r.name().as_str().len())
        .max()
        .unwrap_or(0);
    let lines: Vec<String> = engine
        .rules()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {:<width$}  {}",
                i + 1,
                r.name().as_str(),
                r.describe(),
                width = width
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
