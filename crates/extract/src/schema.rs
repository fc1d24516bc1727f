use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for any report field the transcript does not support.
pub const NOT_MENTIONED: &str = "Not mentioned";

/// Default current status when no "occasional ..." phrase is found.
pub const BACK_TO_NORMAL: &str = "Back to normal";

/// Entity kind as emitted by the biomedical recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    BiologicalStructure,
    SignSymptom,
    TherapeuticProcedure,
    DiseaseDisorder,
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::BiologicalStructure => "Biological_structure",
            EntityLabel::SignSymptom => "Sign_symptom",
            EntityLabel::TherapeuticProcedure => "Therapeutic_procedure",
            EntityLabel::DiseaseDisorder => "Disease_disorder",
            EntityLabel::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for EntityLabel {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Biological_structure" => EntityLabel::BiologicalStructure,
            "Sign_symptom" => EntityLabel::SignSymptom,
            "Therapeutic_procedure" => EntityLabel::TherapeuticProcedure,
            "Disease_disorder" => EntityLabel::DiseaseDisorder,
            _ => EntityLabel::Other(name),
        }
    }
}

impl From<&str> for EntityLabel {
    fn from(name: &str) -> Self {
        EntityLabel::from(name.to_string())
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span exactly as the recognizer hands it over.
///
/// Every field is optional so that a missing one surfaces as a
/// validation error from the normalizer instead of a deserialisation
/// failure. Keys other than the ones below are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    pub start: Option<usize>,
    pub end: Option<usize>,
    #[serde(alias = "entity_group")]
    pub label: Option<String>,
    #[serde(alias = "score")]
    pub confidence: Option<f32>,
    /// Recognizer's own rendering of the text. Never trusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

impl RawSpan {
    pub fn new(start: usize, end: usize, label: &str, confidence: f32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            label: Some(label.to_string()),
            confidence: Some(confidence),
            word: None,
        }
    }
}

/// A validated span over the source text. Offsets are code points.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
    pub text: String,
    /// Recognizer score, kept in its native precision until the output boundary.
    pub confidence: f32,
}

impl Span {
    pub fn is(&self, label: &EntityLabel) -> bool {
        &self.label == label
    }
}

/// Arithmetic mean of two scores. Not a probabilistic fusion.
pub(crate) fn mean_confidence(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}

/// Output-boundary form of a span, with a standard `f64` confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "entity_group")]
    pub label: EntityLabel,
    #[serde(rename = "word")]
    pub text: String,
    #[serde(rename = "score")]
    pub confidence: f64,
}

impl From<&Span> for Entity {
    fn from(span: &Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
            label: span.label.clone(),
            text: span.text.clone(),
            confidence: f64::from(span.confidence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    #[serde(rename = "Patient_Name")]
    pub patient_name: String,
    #[serde(rename = "Symptoms")]
    pub symptoms: Vec<String>,
    #[serde(rename = "Diagnosis")]
    pub diagnosis: String,
    #[serde(rename = "Treatment")]
    pub treatments: Vec<String>,
    #[serde(rename = "Current_Status")]
    pub current_status: String,
    #[serde(rename = "Prognosis")]
    pub prognosis: String,
}

impl StructuredReport {
    /// True when `values` is the `["Not mentioned"]` placeholder list.
    pub fn is_placeholder(values: &[String]) -> bool {
        values.len() == 1 && values[0] == NOT_MENTIONED
    }
}

/// Result of one consolidation run: the report plus the entity list for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub report: StructuredReport,
    pub entities: Vec<Entity>,
}
