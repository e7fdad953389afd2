//! Model registry and routing table

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::category::RoutingCategory;

/// Where a model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ollama,
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    /// Environment variable holding the provider's API key, if it needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Ollama => None,
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Google => Some("GEMINI_API_KEY"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Google => write!(f, "google"),
        }
    }
}

/// Static description of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    /// Name used in routing and on the command line
    pub id: &'static str,
    pub provider: Provider,
    /// Identifier sent to the provider's API
    pub remote_id: &'static str,
    pub params: &'static str,
    pub size_gb: f64,
    pub specialization: &'static str,
    pub capabilities: &'static [&'static str],
    pub when_to_use: &'static str,
    pub speed: &'static str,
    pub quality: &'static str,
    /// USD per million input tokens; zero for local models
    pub cost_per_1m_in: f64,
    pub cost_per_1m_out: f64,
    pub deprecated: bool,
}

impl ModelSpec {
    pub fn is_local(&self) -> bool {
        self.provider == Provider::Ollama
    }

    /// The persona a worker model is given before the task.
    pub fn persona(&self) -> String {
        format!(
            "You are powered by {}, a {} parameter model. Your specialization: {}. You excel at: {}.",
            self.id,
            self.params,
            self.specialization,
            self.capabilities.join(", ")
        )
    }
}

#[allow(clippy::too_many_arguments)]
const fn local(
    id: &'static str,
    remote_id: &'static str,
    size_gb: f64,
    params: &'static str,
    specialization: &'static str,
    capabilities: &'static [&'static str],
    when_to_use: &'static str,
    speed: &'static str,
    quality: &'static str,
) -> ModelSpec {
    ModelSpec {
        id,
        provider: Provider::Ollama,
        remote_id,
        params,
        size_gb,
        specialization,
        capabilities,
        when_to_use,
        speed,
        quality,
        cost_per_1m_in: 0.0,
        cost_per_1m_out: 0.0,
        deprecated: false,
    }
}

#[allow(clippy::too_many_arguments)]
const fn commercial(
    id: &'static str,
    provider: Provider,
    remote_id: &'static str,
    specialization: &'static str,
    capabilities: &'static [&'static str],
    when_to_use: &'static str,
    speed: &'static str,
    quality: &'static str,
    cost_per_1m_in: f64,
    cost_per_1m_out: f64,
) -> ModelSpec {
    ModelSpec {
        id,
        provider,
        remote_id,
        params: "proprietary",
        size_gb: 0.0,
        specialization,
        capabilities,
        when_to_use,
        speed,
        quality,
        cost_per_1m_in,
        cost_per_1m_out,
        deprecated: false,
    }
}

/// Model used when a category or model name cannot be resolved
pub const DEFAULT_MODEL: &str = "mixtral:8x7b";

static MODELS: &[ModelSpec] = &[
    local(
        "llama3.2-vision:90b",
        "llama3.2-vision:90b",
        54.0,
        "90B",
        "max_vision",
        &["vision", "multimodal", "ocr", "chart_analysis"],
        "Complex visual tasks requiring highest accuracy (charts, diagrams, OCR)",
        "slow",
        "highest",
    ),
    local(
        "llama3.1:70b",
        "llama3.1:70b",
        42.0,
        "70B",
        "long_context",
        &["general_purpose", "128k_context", "enterprise_grade"],
        "Large documents, long context windows (128K tokens)",
        "slow",
        "highest",
    ),
    local(
        "deepseek-r1:70b",
        "deepseek-r1:70b",
        42.0,
        "70B",
        "max_reasoning",
        &["deep_reasoning", "math", "logic", "complex_analysis"],
        "Complex reasoning, mathematical proofs, logic puzzles",
        "slow",
        "highest",
    ),
    local(
        "deepseek-v3",
        "deepseek-v3",
        404.0,
        "671B (37B active MoE)",
        "max_reasoning_moe",
        &["deep_reasoning", "moe_architecture", "efficient_inference"],
        "Extremely complex reasoning with MoE efficiency",
        "medium",
        "highest",
    ),
    local(
        "command-r-plus",
        "command-r-plus",
        59.0,
        "104B",
        "max_rag",
        &["rag", "document_search", "citations", "retrieval"],
        "Complex document search with citations and grounded answers",
        "slow",
        "highest",
    ),
    local(
        "qwen2.5:72b",
        "qwen2.5:72b",
        47.0,
        "72B",
        "max_quality_general",
        &["general_purpose", "reasoning", "coding", "multilingual"],
        "High-quality general tasks, complex coding, multilingual",
        "slow",
        "highest",
    ),
    local(
        "mixtral:8x7b",
        "mixtral:8x7b",
        26.0,
        "47B (8x7B MoE)",
        "default_general",
        &["general_purpose", "moe_architecture", "balanced_speed_quality"],
        "Default worker for general tasks (good speed/quality balance)",
        "medium",
        "high",
    ),
    local(
        "command-r",
        "command-r",
        18.0,
        "35B",
        "fast_rag",
        &["rag", "document_search", "grounded_answers"],
        "Fast RAG with good citation quality",
        "medium",
        "high",
    ),
    local(
        "gpt-oss:20b",
        "gpt-oss:20b",
        13.0,
        "20B",
        "agentic_tool_use",
        &["tool_calling", "api_integration", "function_calling"],
        "Agentic workflows, API calls, tool orchestration",
        "medium",
        "high",
    ),
    local(
        "llava:13b",
        "llava:13b",
        8.0,
        "13B",
        "fast_vision",
        &["vision", "image_captions", "fast_inference"],
        "Simple vision tasks (image descriptions, basic object detection)",
        "fast",
        "medium",
    ),
    local(
        "apriel-1.5-15b-thinker",
        "MichelRosselli/apriel-1.5-15b-thinker",
        9.7,
        "15B",
        "hybrid_reasoner",
        &["reasoning", "vision", "multimodal_reasoning"],
        "Visual reasoning tasks (math diagrams, flowcharts with logic)",
        "fast",
        "high",
    ),
    local(
        "phi4",
        "phi4",
        9.1,
        "14B",
        "efficient_reasoning",
        &["reasoning", "compact", "efficient"],
        "Text reasoning tasks requiring good quality but faster than 70B",
        "fast",
        "high",
    ),
    local(
        "qwen2.5:14b",
        "qwen2.5:14b",
        9.0,
        "14B",
        "structured_data",
        &["json_generation", "structured_output", "fast_coding"],
        "JSON generation, structured data extraction, fast coding",
        "fast",
        "high",
    ),
    local(
        "gemma2:9b",
        "gemma2:9b",
        5.4,
        "9B",
        "efficient_general",
        &["general_purpose", "efficient", "google_trained"],
        "General tasks requiring good efficiency",
        "fast",
        "medium",
    ),
    local(
        "mistral:7b",
        "mistral:7b",
        4.4,
        "7B",
        "simple_chat",
        &["conversation", "fast_responses", "lightweight"],
        "Simple chat, fastest conversational responses",
        "fastest",
        "medium",
    ),
    local(
        "nous-hermes2",
        "nous-hermes2",
        6.1,
        "7B",
        "instruction_following",
        &["instruction_following", "helpful_assistant"],
        "Tasks requiring precise instruction following",
        "fast",
        "medium",
    ),
    local(
        "solar",
        "solar",
        6.1,
        "11B",
        "korean_multilingual",
        &["multilingual", "korean", "general_purpose"],
        "Korean language tasks or multilingual needs",
        "fast",
        "medium",
    ),
    local(
        "llama3.2:1b",
        "llama3.2:1b",
        1.3,
        "1B",
        "router",
        &["classification", "ultra_fast", "routing"],
        "Task classification only",
        "ultra_fast",
        "low",
    ),
    local(
        "nomic-embed-text",
        "nomic-embed-text",
        0.274,
        "137M",
        "embeddings",
        &["text_embeddings", "vector_search", "similarity"],
        "Text embeddings for RAG, vector search, semantic similarity",
        "ultra_fast",
        "specialized",
    ),
    ModelSpec {
        deprecated: true,
        ..local(
            "llama3:70b",
            "llama3:70b",
            39.0,
            "70B",
            "deprecated",
            &["general_purpose"],
            "DEPRECATED - Use llama3.1:70b instead",
            "slow",
            "high",
        )
    },
    commercial(
        "claude-sonnet-3.7",
        Provider::Anthropic,
        "claude-3-7-sonnet-20250219",
        "max_quality_reasoning",
        &["advanced_reasoning", "coding", "analysis", "long_form_writing"],
        "Critical reasoning or coding where only the best answer will do",
        "medium",
        "highest",
        3.0,
        15.0,
    ),
    commercial(
        "gpt-4o",
        Provider::OpenAi,
        "gpt-4o",
        "max_quality_multimodal",
        &["multimodal", "vision", "reasoning", "general_purpose"],
        "Best multimodal intelligence when local vision models fall short",
        "fast",
        "highest",
        2.5,
        10.0,
    ),
    commercial(
        "gpt-4o-mini",
        Provider::OpenAi,
        "gpt-4o-mini",
        "fast_commercial",
        &["general_purpose", "classification", "fast_responses"],
        "Fast commercial fallback when local models are insufficient",
        "fast",
        "high",
        0.15,
        0.6,
    ),
    commercial(
        "claude-haiku-3.5",
        Provider::Anthropic,
        "claude-3-5-haiku-20241022",
        "ultra_fast_commercial",
        &["fast_responses", "coding", "lightweight"],
        "Ultra-fast commercial responses",
        "fastest",
        "high",
        0.8,
        4.0,
    ),
    commercial(
        "gemini-2.0-flash",
        Provider::Google,
        "gemini-2.0-flash",
        "multimodal_grounded",
        &["multimodal", "web_grounding", "vision", "long_context"],
        "Multimodal tasks that need web grounding",
        "fastest",
        "high",
        0.1,
        0.4,
    ),
];

/// Model that handles a category
fn routed_model(category: RoutingCategory) -> &'static str {
    match category {
        RoutingCategory::MaxVision => "llama3.2-vision:90b",
        RoutingCategory::FastVision => "llava:13b",
        RoutingCategory::MaxReasoning => "deepseek-r1:70b",
        RoutingCategory::MaxReasoningMoe => "deepseek-v3",
        RoutingCategory::EfficientReasoning => "phi4",
        RoutingCategory::HybridReasoner => "apriel-1.5-15b-thinker",
        RoutingCategory::MaxRag => "command-r-plus",
        RoutingCategory::FastRag => "command-r",
        RoutingCategory::AgenticToolUse => "gpt-oss:20b",
        RoutingCategory::StructuredData => "qwen2.5:14b",
        RoutingCategory::SimpleChat => "mistral:7b",
        RoutingCategory::InstructionFollowing => "nous-hermes2",
        RoutingCategory::LongContext => "llama3.1:70b",
        RoutingCategory::MaxQualityGeneral => "qwen2.5:72b",
        RoutingCategory::DefaultGeneral => "mixtral:8x7b",
        RoutingCategory::EfficientGeneral => "gemma2:9b",
        RoutingCategory::KoreanMultilingual => "solar",
        RoutingCategory::Embeddings => "nomic-embed-text",
        RoutingCategory::MaxQualityReasoning => "claude-sonnet-3.7",
        RoutingCategory::MaxQualityMultimodal => "gpt-4o",
        RoutingCategory::FastCommercial => "gpt-4o-mini",
        RoutingCategory::UltraFastCommercial => "claude-haiku-3.5",
        RoutingCategory::MultimodalGrounded => "gemini-2.0-flash",
    }
}

/// Read-only view over the built-in model table
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry {
    models: &'static [ModelSpec],
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        Self { models: MODELS }
    }

    /// Every registered model, deprecated ones included.
    pub fn all(&self) -> &'static [ModelSpec] {
        self.models
    }

    pub fn get(&self, id: &str) -> Option<&'static ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn for_category(&self, category: RoutingCategory) -> Option<&'static ModelSpec> {
        self.get(routed_model(category))
    }

    /// Models that are not deprecated.
    pub fn active(&self) -> Vec<&'static ModelSpec> {
        self.models.iter().filter(|m| !m.deprecated).collect()
    }

    /// Unknown ids count as not local.
    pub fn is_local(&self, id: &str) -> bool {
        self.get(id).is_some_and(ModelSpec::is_local)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.id).collect()
    }

    /// Category to model id, in category order.
    pub fn routing_table(&self) -> BTreeMap<RoutingCategory, &'static str> {
        RoutingCategory::ALL
            .iter()
            .map(|c| (*c, routed_model(*c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn twenty_local_and_five_commercial() {
        let registry = ModelRegistry::builtin();
        let local = registry.all().iter().filter(|m| m.is_local()).count();
        assert_eq!(local, 20);
        assert_eq!(registry.all().len(), 25);
    }

    #[test]
    fn ids_are_unique() {
        let ids = ModelRegistry::builtin().ids();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn every_category_routes_to_an_active_model() {
        let registry = ModelRegistry::builtin();
        for (category, id) in registry.routing_table() {
            let spec = registry
                .for_category(category)
                .unwrap_or_else(|| panic!("{category} routes to unregistered {id}"));
            assert!(!spec.deprecated, "{category} routes to deprecated {id}");
            assert_eq!(spec.is_local(), !category.is_commercial(), "{category}");
        }
    }

    #[test]
    fn deprecated_model_is_not_active() {
        let registry = ModelRegistry::builtin();
        assert!(registry.get("llama3:70b").unwrap().deprecated);
        assert!(registry.active().iter().all(|m| m.id != "llama3:70b"));
        assert_eq!(registry.active().len(), 24);
    }

    #[test]
    fn locality_by_id() {
        let registry = ModelRegistry::builtin();
        assert!(registry.is_local("phi4"));
        assert!(!registry.is_local("gpt-4o"));
        assert!(!registry.is_local("no-such-model"));
    }

    #[test]
    fn local_models_are_free() {
        let registry = ModelRegistry::builtin();
        for spec in registry.all().iter().filter(|m| m.is_local()) {
            assert_eq!(spec.cost_per_1m_in, 0.0);
            assert_eq!(spec.cost_per_1m_out, 0.0);
        }
        let sonnet = registry.get("claude-sonnet-3.7").unwrap();
        assert_eq!((sonnet.cost_per_1m_in, sonnet.cost_per_1m_out), (3.0, 15.0));
    }

    #[test]
    fn persona_names_specialization_and_capabilities() {
        let phi = ModelRegistry::builtin().get("phi4").unwrap();
        assert_eq!(
            phi.persona(),
            "You are powered by phi4, a 14B parameter model. Your specialization: \
             efficient_reasoning. You excel at: reasoning, compact, efficient."
        );
    }
}
