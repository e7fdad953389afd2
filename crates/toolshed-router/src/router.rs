//! Classify, select, execute

use std::sync::Arc;

use serde::Serialize;
use toolshed_core::RouterSettings;

use crate::category::RoutingCategory;
use crate::classifier::{Classifier, TaskClassification};
use crate::client::{LlmClient, ProviderClients};
use crate::dispatcher::{Dispatcher, ExecutionResult};
use crate::registry::ModelRegistry;
use crate::{Result, RouterError};

/// Which model a task would go to, without running it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterDecision {
    pub task_description: String,
    pub category: RoutingCategory,
    pub selected_model: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// The full pipeline
pub struct Router {
    classifier: Classifier,
    dispatcher: Dispatcher,
}

impl Router {
    /// Build a router that talks to the providers named in `settings`.
    pub fn from_settings(settings: &RouterSettings) -> Result<Self> {
        let clients: Arc<dyn LlmClient> = Arc::new(ProviderClients::from_settings(settings)?);
        Self::with_client(settings, clients)
    }

    /// Build a router on an arbitrary client.
    pub fn with_client(settings: &RouterSettings, client: Arc<dyn LlmClient>) -> Result<Self> {
        let registry = ModelRegistry::builtin();
        let classifier_model = registry.get(&settings.classifier_model).ok_or_else(|| {
            RouterError::UnknownModel {
                model: settings.classifier_model.clone(),
                available: registry.ids().iter().map(|s| s.to_string()).collect(),
            }
        })?;
        let fallback: RoutingCategory = settings.default_category.parse()?;

        Ok(Self {
            classifier: Classifier::new(client.clone(), classifier_model, fallback),
            dispatcher: Dispatcher::new(registry, client)?,
        })
    }

    pub fn registry(&self) -> &ModelRegistry {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn classify(&self, task: &str) -> TaskClassification {
        self.classifier.classify(task).await
    }

    /// Classify `task` and pick its model.
    pub async fn decide(&self, task: &str) -> RouterDecision {
        let classification = self.classify(task).await;
        let model = self.dispatcher.select(classification.category);
        RouterDecision {
            task_description: task.to_string(),
            category: classification.category,
            selected_model: model.id.to_string(),
            confidence: classification.confidence,
            reasoning: classification.reasoning,
        }
    }

    /// Classify `task`, then run it on the selected model.
    pub async fn route(&self, task: &str) -> Result<ExecutionResult> {
        let classification = self.classify(task).await;
        let model = self.dispatcher.select(classification.category);
        tracing::info!(category = %classification.category, model = model.id, "Routing task");
        self.dispatcher
            .execute(
                model,
                task,
                Some(classification.category),
                &classification.reasoning,
            )
            .await
    }
}
