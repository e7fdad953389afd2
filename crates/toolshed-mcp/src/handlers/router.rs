// ============================================================================
// Router Handlers
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use toolshed_router::{ModelSpec, Provider};

use super::{non_empty, parse_args};
use crate::Result;
use crate::context::ServerContext;

#[derive(Deserialize)]
struct TaskArgs {
    task: String,
}

#[derive(Deserialize)]
struct ExecuteArgs {
    model: String,
    task: String,
}

/// Registry entry as listed to clients
#[derive(Serialize)]
struct ModelListing {
    id: &'static str,
    provider: Provider,
    params: &'static str,
    size_gb: f64,
    specialization: &'static str,
    when_to_use: &'static str,
    is_local: bool,
    cost_per_1m_in: f64,
    cost_per_1m_out: f64,
    deprecated: bool,
}

impl From<&ModelSpec> for ModelListing {
    fn from(spec: &ModelSpec) -> Self {
        Self {
            id: spec.id,
            provider: spec.provider,
            params: spec.params,
            size_gb: spec.size_gb,
            specialization: spec.specialization,
            when_to_use: spec.when_to_use,
            is_local: spec.is_local(),
            cost_per_1m_in: spec.cost_per_1m_in,
            cost_per_1m_out: spec.cost_per_1m_out,
            deprecated: spec.deprecated,
        }
    }
}

/// Handle list_models - Registry plus routing table
pub(super) fn list_models(ctx: &ServerContext) -> Result<Value> {
    let registry = ctx.router().registry();
    let models: Vec<ModelListing> = registry.all().iter().map(ModelListing::from).collect();
    Ok(json!({
        "models": models,
        "routing_table": registry.routing_table(),
    }))
}

/// Handle classify_task - Category and model without executing
pub(super) async fn classify_task(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: TaskArgs = parse_args(arguments)?;
    let task = non_empty("task", args.task)?;
    let decision = ctx.router().decide(&task).await;
    Ok(serde_json::to_value(decision)?)
}

/// Handle route_task - Classify and execute
pub(super) async fn route_task(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: TaskArgs = parse_args(arguments)?;
    let task = non_empty("task", args.task)?;
    let result = ctx.router().route(&task).await?;
    Ok(serde_json::to_value(result)?)
}

/// Handle execute_with_model - Run a task on a named model
pub(super) async fn execute_with_model(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: ExecuteArgs = parse_args(arguments)?;
    let model = non_empty("model", args.model)?;
    let task = non_empty("task", args.task)?;
    let result = ctx
        .router()
        .dispatcher()
        .execute_with_model(&model, &task)
        .await?;
    Ok(serde_json::to_value(result)?)
}
