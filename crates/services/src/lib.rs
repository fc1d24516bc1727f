pub mod client;
pub mod http;
pub mod hub;
pub mod models;
pub mod sentiment;

pub use client::InferenceClient;
pub use http::HostedModel;
pub use hub::{ModelHub, ServiceStatus, ServicesConfig};
pub use models::{
    Classification, KeywordExtractor, ModelService, Recognizer, Summarizer, SummaryOptions,
    ZeroShotClassifier,
};
pub use sentiment::{analyze_sentiment_intent, SentimentIntent};
