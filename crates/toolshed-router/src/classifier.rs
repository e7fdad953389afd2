//! Task classification
//!
//! One prompt goes to the classifier model and the reply is parsed as JSON.
//! There is no retry and no confidence threshold: anything that goes wrong
//! yields the fallback classification.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::category::RoutingCategory;
use crate::client::{CompletionRequest, LlmClient};
use crate::registry::ModelSpec;
use crate::{Result, RouterError};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid JSON object regex"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[a-zA-Z]*").expect("Invalid code fence regex"));

/// Reasoning attached to the fallback classification
pub const FALLBACK_REASONING: &str = "Fallback due to classification error";

const FEW_SHOT: &[(&str, RoutingCategory)] = &[
    ("Analyze this sales chart and extract revenue trends", RoutingCategory::MaxVision),
    ("Prove that √2 is irrational", RoutingCategory::MaxReasoning),
    ("What's the weather like today?", RoutingCategory::SimpleChat),
    ("Generate JSON schema for user profile", RoutingCategory::StructuredData),
    (
        "Search 500 PDFs for mentions of 'quantum computing' with citations",
        RoutingCategory::MaxRag,
    ),
    ("Call the weather API and book a restaurant", RoutingCategory::AgenticToolUse),
    (
        "Write production-grade distributed system code for my startup's core architecture",
        RoutingCategory::MaxQualityReasoning,
    ),
    (
        "Provide comprehensive strategic analysis for board presentation",
        RoutingCategory::MaxQualityReasoning,
    ),
    (
        "Analyze this complex image and search web for related context",
        RoutingCategory::MultimodalGrounded,
    ),
    ("I need the absolute best answer possible", RoutingCategory::MaxQualityMultimodal),
];

const SYSTEM_PROMPT: &str = "You are Mission Control for a hybrid fleet of LLM models: \
local models that are free to run and commercial models that are paid per token. \
Route each task to the most cost-effective model. Prefer local models. Use commercial \
models only when the task needs the absolute best quality, local models are insufficient \
for its complexity, or the user explicitly asks for premium quality.";

/// The classifier's verdict for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskClassification {
    pub category: RoutingCategory,
    pub confidence: f64,
    pub reasoning: String,
}

impl TaskClassification {
    pub fn fallback(category: RoutingCategory) -> Self {
        Self {
            category,
            confidence: 0.5,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.reasoning == FALLBACK_REASONING
    }
}

/// Build the classification prompt for `task`.
pub fn classification_prompt(task: &str) -> String {
    let mut out = String::from("Analyze this task and classify it into ONE of these categories:\n");

    let mut family = "";
    for category in RoutingCategory::ALL {
        if category.family() != family {
            family = category.family();
            out.push_str(&format!("\n{family}:\n"));
        }
        out.push_str(&format!("- {}: {}\n", category, category.description()));
    }

    out.push_str("\nFEW-SHOT EXAMPLES:\n");
    for (i, (example, category)) in FEW_SHOT.iter().enumerate() {
        let kind = if category.is_commercial() { "commercial" } else { "local" };
        out.push_str(&format!("{}. \"{}\" → {} ({})\n", i + 1, example, category, kind));
    }

    out.push_str(&format!(
        "\nTASK TO CLASSIFY:\n{task}\n\n\
         Return ONLY valid JSON:\n\
         {{\n    \"category\": \"<one of the categories above>\",\n    \
         \"confidence\": <0.0 to 1.0>,\n    \
         \"reasoning\": \"<brief explanation>\"\n}}\n"
    ));
    out
}

#[derive(Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: String,
}

/// Parse a classifier reply.
///
/// Code fences and surrounding prose are ignored; the first `{` through the
/// last `}` must be a JSON object naming a known category. Confidence is
/// clamped to `[0, 1]` and defaults to 0.5 when absent or not finite.
pub fn parse_classification(reply: &str) -> Result<TaskClassification> {
    let cleaned = CODE_FENCE.replace_all(reply, "");
    let object = JSON_OBJECT
        .find(&cleaned)
        .ok_or_else(|| RouterError::Classification("no JSON object in reply".into()))?;

    let raw: RawClassification = serde_json::from_str(object.as_str())
        .map_err(|e| RouterError::Classification(e.to_string()))?;
    let category: RoutingCategory = raw.category.parse()?;

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.5);

    Ok(TaskClassification {
        category,
        confidence,
        reasoning: raw.reasoning,
    })
}

/// Sends tasks to the classifier model
pub struct Classifier {
    client: Arc<dyn LlmClient>,
    model: &'static ModelSpec,
    fallback: RoutingCategory,
}

impl Classifier {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: &'static ModelSpec,
        fallback: RoutingCategory,
    ) -> Self {
        Self {
            client,
            model,
            fallback,
        }
    }

    pub fn model(&self) -> &'static ModelSpec {
        self.model
    }

    /// Classify `task`, falling back on any error.
    pub async fn classify(&self, task: &str) -> TaskClassification {
        match self.try_classify(task).await {
            Ok(classification) => {
                tracing::info!(
                    category = %classification.category,
                    confidence = classification.confidence,
                    "Task classified"
                );
                classification
            }
            Err(e) => {
                tracing::warn!(
                    model = self.model.id,
                    error = %e,
                    fallback = %self.fallback,
                    "Classification failed, using fallback category"
                );
                TaskClassification::fallback(self.fallback)
            }
        }
    }

    async fn try_classify(&self, task: &str) -> Result<TaskClassification> {
        let request = CompletionRequest::new(classification_prompt(task))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(0.1);
        let reply = self.client.complete(self.model, &request).await?;
        tracing::debug!(reply = %reply, "Classifier reply");
        parse_classification(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Canned(std::result::Result<&'static str, ()>);

    #[async_trait]
    impl LlmClient for Canned {
        async fn complete(&self, _model: &ModelSpec, request: &CompletionRequest) -> Result<String> {
            assert!(request.prompt.contains("TASK TO CLASSIFY"));
            self.0.map(str::to_string).map_err(|_| RouterError::Unreachable {
                provider: crate::Provider::OpenAi,
                url: "http://nowhere".into(),
            })
        }
    }

    fn classifier(reply: std::result::Result<&'static str, ()>) -> Classifier {
        let model = ModelRegistry::builtin().get("gpt-4o-mini").unwrap();
        Classifier::new(Arc::new(Canned(reply)), model, RoutingCategory::DefaultGeneral)
    }

    #[test]
    fn prompt_lists_every_category_and_the_task() {
        let prompt = classification_prompt("Summarize my notes");
        for category in RoutingCategory::ALL {
            assert!(prompt.contains(&format!("- {category}: ")), "{category}");
        }
        assert!(prompt.contains("VISION TASKS:\n- max_vision"));
        assert!(prompt.contains("COMMERCIAL MODELS (Use only when necessary):"));
        assert!(prompt.contains("10. \"I need the absolute best answer possible\" → max_quality_multimodal (commercial)"));
        assert!(prompt.contains("TASK TO CLASSIFY:\nSummarize my notes\n"));
        assert!(prompt.trim_end().ends_with('}'));
    }

    #[rstest]
    #[case(r#"{"category":"max_vision","confidence":0.92,"reasoning":"chart"}"#)]
    #[case("```json\n{\"category\": \"max_vision\", \"confidence\": 0.92, \"reasoning\": \"chart\"}\n```")]
    #[case("Sure! Here you go:\n{\"category\":\"max_vision\",\"confidence\":0.92,\"reasoning\":\"chart\"}\nHope that helps.")]
    fn parses_plain_fenced_and_chatty_replies(#[case] reply: &str) {
        let parsed = parse_classification(reply).unwrap();
        assert_eq!(
            parsed,
            TaskClassification {
                category: RoutingCategory::MaxVision,
                confidence: 0.92,
                reasoning: "chart".into(),
            }
        );
    }

    #[rstest]
    #[case("7.5", 1.0)]
    #[case("-1", 0.0)]
    fn confidence_is_clamped(#[case] raw: &str, #[case] expected: f64) {
        let reply = format!(r#"{{"category":"simple_chat","confidence":{raw},"reasoning":""}}"#);
        assert_eq!(parse_classification(&reply).unwrap().confidence, expected);
    }

    #[test]
    fn missing_confidence_defaults_to_half() {
        let parsed = parse_classification(r#"{"category":"embeddings"}"#).unwrap();
        assert_eq!(parsed.confidence, 0.5);
    }

    #[rstest]
    #[case("I think it's a vision task")]
    #[case(r#"{"category":"mind_reading","confidence":1}"#)]
    #[case(r#"{"confidence":1}"#)]
    #[case("{not json}")]
    fn bad_replies_are_errors(#[case] reply: &str) {
        assert!(parse_classification(reply).is_err());
    }

    #[tokio::test]
    async fn classify_returns_parsed_reply() {
        let c = classifier(Ok(r#"{"category":"structured_data","confidence":0.8,"reasoning":"json"}"#));
        let result = c.classify("Generate a JSON schema").await;
        assert_eq!(result.category, RoutingCategory::StructuredData);
        assert!(!result.is_fallback());
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let result = classifier(Err(())).classify("anything").await;
        assert_eq!(result, TaskClassification::fallback(RoutingCategory::DefaultGeneral));
        assert!(result.is_fallback());
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back() {
        let result = classifier(Ok("no idea")).classify("anything").await;
        assert_eq!(result.category, RoutingCategory::DefaultGeneral);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.reasoning, "Fallback due to classification error");
    }
}
