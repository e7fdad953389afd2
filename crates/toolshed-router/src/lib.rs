//! Hybrid LLM router
//!
//! A task string is classified into a [`RoutingCategory`], the category is
//! looked up in a fixed routing table, and the task runs on that model
//! through the matching provider client. Local models run on Ollama;
//! commercial models need their API key in the environment.

pub mod category;
pub mod classifier;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod router;

pub use category::RoutingCategory;
pub use classifier::{Classifier, TaskClassification, classification_prompt, parse_classification};
pub use client::{
    AnthropicClient, CompletionRequest, GeminiClient, LlmClient, OllamaClient, OpenAiClient,
    ProviderClients,
};
pub use dispatcher::{Dispatcher, ExecutionResult, estimate_cost};
pub use error::{Result, RouterError};
pub use registry::{DEFAULT_MODEL, ModelRegistry, ModelSpec, Provider};
pub use router::{Router, RouterDecision};
