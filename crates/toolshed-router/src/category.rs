//! Routing categories
//!
//! A category names the kind of work a task is. Each one maps to exactly
//! one model in the registry's routing table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouterError;

/// Fixed label the classifier assigns to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingCategory {
    MaxVision,
    FastVision,
    MaxReasoning,
    MaxReasoningMoe,
    EfficientReasoning,
    HybridReasoner,
    MaxRag,
    FastRag,
    AgenticToolUse,
    StructuredData,
    SimpleChat,
    InstructionFollowing,
    LongContext,
    MaxQualityGeneral,
    DefaultGeneral,
    EfficientGeneral,
    KoreanMultilingual,
    Embeddings,
    // Paid
    MaxQualityReasoning,
    MaxQualityMultimodal,
    FastCommercial,
    UltraFastCommercial,
    MultimodalGrounded,
}

impl RoutingCategory {
    /// Every category, grouped by family in prompt order.
    pub const ALL: [RoutingCategory; 23] = [
        RoutingCategory::MaxVision,
        RoutingCategory::FastVision,
        RoutingCategory::MaxReasoning,
        RoutingCategory::MaxReasoningMoe,
        RoutingCategory::EfficientReasoning,
        RoutingCategory::HybridReasoner,
        RoutingCategory::MaxRag,
        RoutingCategory::FastRag,
        RoutingCategory::AgenticToolUse,
        RoutingCategory::StructuredData,
        RoutingCategory::SimpleChat,
        RoutingCategory::InstructionFollowing,
        RoutingCategory::LongContext,
        RoutingCategory::MaxQualityGeneral,
        RoutingCategory::DefaultGeneral,
        RoutingCategory::EfficientGeneral,
        RoutingCategory::KoreanMultilingual,
        RoutingCategory::Embeddings,
        RoutingCategory::MaxQualityReasoning,
        RoutingCategory::MaxQualityMultimodal,
        RoutingCategory::FastCommercial,
        RoutingCategory::UltraFastCommercial,
        RoutingCategory::MultimodalGrounded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingCategory::MaxVision => "max_vision",
            RoutingCategory::FastVision => "fast_vision",
            RoutingCategory::MaxReasoning => "max_reasoning",
            RoutingCategory::MaxReasoningMoe => "max_reasoning_moe",
            RoutingCategory::EfficientReasoning => "efficient_reasoning",
            RoutingCategory::HybridReasoner => "hybrid_reasoner",
            RoutingCategory::MaxRag => "max_rag",
            RoutingCategory::FastRag => "fast_rag",
            RoutingCategory::AgenticToolUse => "agentic_tool_use",
            RoutingCategory::StructuredData => "structured_data",
            RoutingCategory::SimpleChat => "simple_chat",
            RoutingCategory::InstructionFollowing => "instruction_following",
            RoutingCategory::LongContext => "long_context",
            RoutingCategory::MaxQualityGeneral => "max_quality_general",
            RoutingCategory::DefaultGeneral => "default_general",
            RoutingCategory::EfficientGeneral => "efficient_general",
            RoutingCategory::KoreanMultilingual => "korean_multilingual",
            RoutingCategory::Embeddings => "embeddings",
            RoutingCategory::MaxQualityReasoning => "max_quality_reasoning",
            RoutingCategory::MaxQualityMultimodal => "max_quality_multimodal",
            RoutingCategory::FastCommercial => "fast_commercial",
            RoutingCategory::UltraFastCommercial => "ultra_fast_commercial",
            RoutingCategory::MultimodalGrounded => "multimodal_grounded",
        }
    }

    /// One-line description shown to the classifier.
    pub fn description(&self) -> &'static str {
        match self {
            RoutingCategory::MaxVision => "Complex charts, diagrams, OCR, detailed image analysis",
            RoutingCategory::FastVision => "Simple image captions, basic object detection",
            RoutingCategory::MaxReasoning => "Complex math proofs, logic puzzles, deep analysis",
            RoutingCategory::MaxReasoningMoe => {
                "Extremely complex reasoning (uses 671B MoE model)"
            }
            RoutingCategory::EfficientReasoning => "Text reasoning (faster than 70B models)",
            RoutingCategory::HybridReasoner => "Visual reasoning (math diagrams, flowcharts)",
            RoutingCategory::MaxRag => "Complex document search with citations",
            RoutingCategory::FastRag => "Fast RAG with good citation quality",
            RoutingCategory::AgenticToolUse => "API calls, tool orchestration, function calling",
            RoutingCategory::StructuredData => "JSON generation, data extraction",
            RoutingCategory::SimpleChat => "Basic conversation, fast responses",
            RoutingCategory::InstructionFollowing => "Precise instruction execution",
            RoutingCategory::LongContext => "Large documents (128K tokens)",
            RoutingCategory::MaxQualityGeneral => "High-quality general tasks, complex coding",
            RoutingCategory::DefaultGeneral => "General tasks (balanced speed/quality)",
            RoutingCategory::EfficientGeneral => "General tasks (fast, lightweight)",
            RoutingCategory::KoreanMultilingual => "Korean language tasks",
            RoutingCategory::Embeddings => "Text embeddings, vector search",
            RoutingCategory::MaxQualityReasoning => {
                "Critical reasoning/coding requiring absolute best (Claude Sonnet 3.7)"
            }
            RoutingCategory::MaxQualityMultimodal => "Best multimodal intelligence (GPT-4o)",
            RoutingCategory::FastCommercial => {
                "Fast commercial when local insufficient (GPT-4o-mini)"
            }
            RoutingCategory::UltraFastCommercial => "Ultra-fast commercial (Claude Haiku 3.5)",
            RoutingCategory::MultimodalGrounded => {
                "Multimodal + web grounding (Gemini 2.0 Flash)"
            }
        }
    }

    /// Heading the category is listed under in the classification prompt.
    pub fn family(&self) -> &'static str {
        use RoutingCategory::*;
        match self {
            MaxVision | FastVision => "VISION TASKS",
            MaxReasoning | MaxReasoningMoe | EfficientReasoning | HybridReasoner => {
                "REASONING TASKS"
            }
            MaxRag | FastRag => "RETRIEVAL/RAG TASKS",
            AgenticToolUse => "TOOL/AGENT TASKS",
            StructuredData => "DATA TASKS",
            SimpleChat | InstructionFollowing => "CHAT TASKS",
            LongContext | MaxQualityGeneral | DefaultGeneral | EfficientGeneral => {
                "CONTEXT TASKS"
            }
            KoreanMultilingual | Embeddings => "SPECIALIZED",
            MaxQualityReasoning
            | MaxQualityMultimodal
            | FastCommercial
            | UltraFastCommercial
            | MultimodalGrounded => "COMMERCIAL MODELS (Use only when necessary)",
        }
    }

    /// Whether the category routes to a paid API.
    pub fn is_commercial(&self) -> bool {
        matches!(
            self,
            RoutingCategory::MaxQualityReasoning
                | RoutingCategory::MaxQualityMultimodal
                | RoutingCategory::FastCommercial
                | RoutingCategory::UltraFastCommercial
                | RoutingCategory::MultimodalGrounded
        )
    }
}

impl FromStr for RoutingCategory {
    type Err = RouterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RoutingCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| RouterError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for RoutingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
