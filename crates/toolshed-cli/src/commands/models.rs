//! `models`

use colored::Colorize;
use serde_json::json;
use toolshed_router::{ModelRegistry, ModelSpec};

use crate::error::Result;

pub fn run_models(json: bool, all: bool) -> Result<()> {
    let registry = ModelRegistry::builtin();
    let models: Vec<&ModelSpec> = if all {
        registry.all().iter().collect()
    } else {
        registry.active()
    };

    if json {
        let output = json!({
            "models": models,
            "routing_table": registry.routing_table(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Models".bold());
    println!();
    for spec in &models {
        let location = if spec.is_local() {
            format!("{} GB local", spec.size_gb).green()
        } else {
            format!("${}/${} per 1M", spec.cost_per_1m_in, spec.cost_per_1m_out).yellow()
        };
        let mut line = format!("  {} {} {}", spec.id.cyan(), spec.provider.to_string().dimmed(), location);
        if spec.deprecated {
            line.push_str(&format!(" {}", "(deprecated)".red()));
        }
        println!("{line}");
        println!("      {}", spec.specialization.dimmed());
    }

    println!();
    println!("{}", "Routing".bold());
    println!();
    for (category, model) in registry.routing_table() {
        println!("  {:<28} {}", category.to_string(), model.cyan());
    }
    Ok(())
}
