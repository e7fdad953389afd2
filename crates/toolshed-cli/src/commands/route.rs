//! `route`, `exec` and `classify`

use colored::Colorize;
use toolshed_core::Settings;
use toolshed_router::{ExecutionResult, Router, RouterDecision, RouterError};

use super::{block_on, task_text};
use crate::error::{CliError, Result};

/// Classify the task, then run it on the model for its category.
pub fn run_route(settings: &Settings, task: &[String], json: bool) -> Result<()> {
    let task = task_text(task)?;
    let router = Router::from_settings(&settings.router)?;

    let result = block_on(router.route(&task))?.map_err(explain_unknown_model)?;
    print_execution(&result, json)
}

/// Run the task on `model` without classifying it.
pub fn run_exec(settings: &Settings, model: &str, task: &[String], json: bool) -> Result<()> {
    let task = task_text(task)?;
    let router = Router::from_settings(&settings.router)?;

    let result = block_on(router.dispatcher().execute_with_model(model, &task))?
        .map_err(explain_unknown_model)?;
    print_execution(&result, json)
}

/// Show where the task would go without executing it.
pub fn run_classify(settings: &Settings, task: &[String], json: bool) -> Result<()> {
    let task = task_text(task)?;
    let router = Router::from_settings(&settings.router)?;

    let decision = block_on(router.decide(&task))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&decision);
    }
    Ok(())
}

fn print_decision(decision: &RouterDecision) {
    println!("{} {}", "Category:".bold(), decision.category.to_string().cyan());
    println!("{} {}", "Model:".bold(), decision.selected_model.green());
    println!("{} {:.2}", "Confidence:".bold(), decision.confidence);
    println!("{} {}", "Reasoning:".bold(), decision.reasoning.dimmed());
}

fn print_execution(result: &ExecutionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let kind = if result.is_local {
        "local".green()
    } else {
        "commercial".yellow()
    };

    if let Some(category) = result.category {
        println!("{} {}", "Category:".bold(), category.to_string().cyan());
    }
    println!(
        "{} {} ({}, {})",
        "Model:".bold(),
        result.selected_model.green(),
        result.provider,
        kind
    );
    println!("{} ${:.6}", "Cost:".bold(), result.cost_usd);
    println!("{} {}", "Reasoning:".bold(), result.routing_reasoning.dimmed());
    println!();
    println!("{}", result.result);
    Ok(())
}

fn explain_unknown_model(e: RouterError) -> CliError {
    match e {
        RouterError::UnknownModel { model, available } => CliError::user(format!(
            "Model {model} not found. Available: {}",
            available.join(", ")
        )),
        other => other.into(),
    }
}
