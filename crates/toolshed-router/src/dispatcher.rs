//! Category to model dispatch and execution

use std::sync::Arc;

use serde::Serialize;

use crate::category::RoutingCategory;
use crate::client::{CompletionRequest, LlmClient};
use crate::registry::{DEFAULT_MODEL, ModelRegistry, ModelSpec, Provider};
use crate::{Result, RouterError};

/// Approximate tokens per whitespace-separated word
const TOKENS_PER_WORD: f64 = 1.3;

/// Outcome of running one task on one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub task_description: String,
    /// Absent when the caller picked the model directly
    pub category: Option<RoutingCategory>,
    pub selected_model: String,
    pub model_params: String,
    pub model_size_gb: f64,
    pub routing_reasoning: String,
    pub is_local: bool,
    pub provider: Provider,
    pub cost_usd: f64,
    pub result: String,
}

/// Rough USD cost of one call.
///
/// Local models are free. Commercial cost counts words in the task and the
/// reply at 1.3 tokens per word against the per-million prices.
pub fn estimate_cost(spec: &ModelSpec, input: &str, output: &str) -> f64 {
    if spec.is_local() {
        return 0.0;
    }
    let input_tokens = input.split_whitespace().count() as f64 * TOKENS_PER_WORD;
    let output_tokens = output.split_whitespace().count() as f64 * TOKENS_PER_WORD;
    input_tokens / 1_000_000.0 * spec.cost_per_1m_in
        + output_tokens / 1_000_000.0 * spec.cost_per_1m_out
}

/// The request a worker model receives for `task`.
pub fn worker_request(spec: &ModelSpec, task: &str) -> CompletionRequest {
    CompletionRequest::new(task).with_system(format!(
        "{}\nComplete the task using {}.",
        spec.persona(),
        spec.id
    ))
}

/// Runs tasks on registry models through an [`LlmClient`]
pub struct Dispatcher {
    registry: ModelRegistry,
    client: Arc<dyn LlmClient>,
    default_model: &'static ModelSpec,
}

impl Dispatcher {
    pub fn new(registry: ModelRegistry, client: Arc<dyn LlmClient>) -> Result<Self> {
        let default_model = registry
            .get(DEFAULT_MODEL)
            .ok_or_else(|| unknown_model(&registry, DEFAULT_MODEL))?;
        Ok(Self {
            registry,
            client,
            default_model,
        })
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Model for `category`, or the default model if the table has no
    /// registered entry for it.
    pub fn select(&self, category: RoutingCategory) -> &'static ModelSpec {
        match self.registry.for_category(category) {
            Some(spec) => spec,
            None => {
                tracing::warn!(%category, default = DEFAULT_MODEL, "No model for category, using default");
                self.default_model
            }
        }
    }

    /// Like [`select`](Self::select) for a category name that may not parse.
    pub fn select_by_name(&self, category: &str) -> &'static ModelSpec {
        match category.parse::<RoutingCategory>() {
            Ok(category) => self.select(category),
            Err(_) => {
                tracing::warn!(category, default = DEFAULT_MODEL, "Unknown category, using default");
                self.default_model
            }
        }
    }

    /// Run `task` on a model chosen by id.
    pub async fn execute_with_model(&self, model_id: &str, task: &str) -> Result<ExecutionResult> {
        let spec = self
            .registry
            .get(model_id)
            .ok_or_else(|| unknown_model(&self.registry, model_id))?;
        self.execute(spec, task, None, "").await
    }

    /// Run `task` on `spec` and build the result record.
    pub async fn execute(
        &self,
        spec: &'static ModelSpec,
        task: &str,
        category: Option<RoutingCategory>,
        reasoning: &str,
    ) -> Result<ExecutionResult> {
        if spec.deprecated {
            tracing::warn!(model = spec.id, "{}", spec.when_to_use);
        }
        tracing::info!(
            model = spec.id,
            provider = %spec.provider,
            local = spec.is_local(),
            speed = spec.speed,
            quality = spec.quality,
            "Executing task"
        );

        let result = self.client.complete(spec, &worker_request(spec, task)).await?;
        let cost_usd = estimate_cost(spec, task, &result);
        if cost_usd > 0.0 {
            tracing::info!(model = spec.id, cost_usd, "Estimated cost");
        }

        Ok(ExecutionResult {
            task_description: task.to_string(),
            category,
            selected_model: spec.id.to_string(),
            model_params: spec.params.to_string(),
            model_size_gb: spec.size_gb,
            routing_reasoning: reasoning.to_string(),
            is_local: spec.is_local(),
            provider: spec.provider,
            cost_usd,
            result,
        })
    }
}

fn unknown_model(registry: &ModelRegistry, model: &str) -> RouterError {
    RouterError::UnknownModel {
        model: model.to_string(),
        available: registry
            .active()
            .iter()
            .map(|m| m.id.to_string())
            .collect(),
    }
}
