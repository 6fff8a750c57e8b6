//! Coaching recommendation generation.

use async_trait::async_trait;

/// Recommendation used whenever no generated one is available.
pub const FALLBACK_RECOMMENDATION: &str =
    "Focus on maintaining consistent sleep schedule and creating a relaxing bedtime routine.";

/// What the generator knows about one night.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightRequest {
    pub duration_minutes: i64,
    pub quality: u8,
    pub pre_notes: String,
    pub post_notes: String,
    pub activities: Vec<String>,
}

/// Source of coaching recommendations.
///
/// Implementations must always produce text; on any internal failure they
/// return [`FALLBACK_RECOMMENDATION`].
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &InsightRequest) -> String;
}

/// Generator that always returns the fallback recommendation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticInsightGenerator;

#[async_trait]
impl InsightGenerator for StaticInsightGenerator {
    fn name(&self) -> &str {
        "static"
    }

    async fn generate(&self, _request: &InsightRequest) -> String {
        FALLBACK_RECOMMENDATION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_generator_returns_fallback() {
        let generator = StaticInsightGenerator;
        let request = InsightRequest {
            duration_minutes: 300,
            quality: 40,
            post_notes: "groggy".to_string(),
            activities: vec!["caffeine".to_string()],
            ..Default::default()
        };
        assert_eq!(generator.generate(&request).await, FALLBACK_RECOMMENDATION);
        assert_eq!(generator.name(), "static");
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let generator: Box<dyn InsightGenerator> = Box::new(StaticInsightGenerator);
        let text = generator.generate(&InsightRequest::default()).await;
        assert!(!text.is_empty());
    }
}
