use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::ZeroShotClassifier;

pub const SENTIMENT_LABELS: [&str; 3] = ["Anxious", "Neutral", "Reassured"];
pub const INTENT_LABELS: [&str; 3] = [
    "Seeking reassurance",
    "Reporting symptoms",
    "Expressing concern",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentIntent {
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
    #[serde(rename = "Intent")]
    pub intent: String,
}

/// Top sentiment and intent label for what the patient said.
pub async fn analyze_sentiment_intent(
    classifier: &dyn ZeroShotClassifier,
    patient_text: &str,
) -> Result<SentimentIntent> {
    let sentiment = classifier
        .classify(patient_text, &SENTIMENT_LABELS)
        .await
        .context("Sentiment classification failed")?;
    let intent = classifier
        .classify(patient_text, &INTENT_LABELS)
        .await
        .context("Intent classification failed")?;

    Ok(SentimentIntent {
        sentiment: sentiment
            .top()
            .context("Classifier returned no sentiment labels")?
            .to_string(),
        intent: intent
            .top()
            .context("Classifier returned no intent labels")?
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, ModelService};
    use async_trait::async_trait;

    /// Ranks candidates in reverse of the order given.
    struct Reversing;

    #[async_trait]
    impl ModelService for Reversing {
        fn name(&self) -> &str {
            "reversing"
        }

        async fn ready(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ZeroShotClassifier for Reversing {
        async fn classify(&self, _text: &str, labels: &[&str]) -> Result<Classification> {
            let labels: Vec<String> = labels.iter().rev().map(|l| l.to_string()).collect();
            let scores = (0..labels.len()).map(|i| 1.0 / (i + 1) as f64).collect();
            Ok(Classification { labels, scores })
        }
    }

    #[tokio::test]
    async fn test_picks_top_labels() {
        let result = analyze_sentiment_intent(&Reversing, "I'm doing better").await.unwrap();
        assert_eq!(result.sentiment, "Reassured");
        assert_eq!(result.intent, "Expressing concern");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["Sentiment"], "Reassured");
        assert_eq!(value["Intent"], "Expressing concern");
    }
}
