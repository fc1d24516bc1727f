use crate::negation::affirmed_symptoms;
use crate::schema::{EntityLabel, Span, StructuredReport, BACK_TO_NORMAL, NOT_MENTIONED};
use crate::source::SourceText;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static PATIENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Good morning,\s*(Ms\.|Mr\.|Mrs\.|Dr\.)\s+([A-Z][a-z]+(?:\s[A-Z][a-z]+)?)")
        .expect("name pattern is valid")
});
static DIAGNOSIS_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(whiplash injury)").expect("diagnosis pattern is valid"));
static TREATMENT_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(painkillers)").expect("treatment pattern is valid"));
static PROGNOSIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)full recovery within (.*?)\.").expect("prognosis pattern is valid")
});
static CURRENT_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)occasional (.*?)\.").expect("status pattern is valid"));

/// "Good morning, Ms. Jones" -> "Ms. Jones".
pub fn patient_name(text: &str) -> Option<String> {
    let caps = PATIENT_NAME.captures(text)?;
    Some(format!("{} {}", &caps[1], &caps[2]))
}

pub fn prognosis(text: &str) -> Option<String> {
    PROGNOSIS.find(text).map(|m| m.as_str().to_string())
}

pub fn current_status(text: &str) -> Option<String> {
    CURRENT_STATUS.find(text).map(|m| m.as_str().to_string())
}

/// Build the report from consolidated spans plus fixed-phrase fallbacks.
///
/// Diagnosis prefers `Disease_disorder` spans and only falls back to the
/// literal "whiplash injury" phrase when there are none. A recognizer that
/// tags a fragment such as "whiplash" therefore yields that fragment, where a
/// phrase-only lookup would have reported "whiplash injury".
pub fn extract_fields(source: &SourceText, spans: &[Span]) -> StructuredReport {
    let text = source.as_str();

    let symptoms = distinct(affirmed_symptoms(source, spans));

    let mut treatments = distinct(texts_of(spans, &EntityLabel::TherapeuticProcedure));
    if let Some(caps) = TREATMENT_FALLBACK.captures(text) {
        if !treatments.iter().any(|t| t == "painkillers") {
            treatments.push(caps[1].to_string());
        }
    }

    let mut diagnoses = distinct(texts_of(spans, &EntityLabel::DiseaseDisorder));
    if diagnoses.is_empty() {
        if let Some(caps) = DIAGNOSIS_FALLBACK.captures(text) {
            diagnoses.push(caps[1].to_string());
        }
    }

    StructuredReport {
        patient_name: patient_name(text).unwrap_or_else(|| NOT_MENTIONED.to_string()),
        symptoms: or_placeholder(symptoms),
        diagnosis: if diagnoses.is_empty() {
            NOT_MENTIONED.to_string()
        } else {
            diagnoses.join(", ")
        },
        treatments: or_placeholder(distinct(treatments)),
        current_status: current_status(text).unwrap_or_else(|| BACK_TO_NORMAL.to_string()),
        prognosis: prognosis(text).unwrap_or_else(|| NOT_MENTIONED.to_string()),
    }
}

fn texts_of(spans: &[Span], label: &EntityLabel) -> Vec<String> {
    spans
        .iter()
        .filter(|s| s.is(label))
        .map(|s| s.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// De-duplicate, keeping first-seen order.
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

fn or_placeholder(values: Vec<String>) -> Vec<String> {
    if values.is_empty() {
        vec![NOT_MENTIONED.to_string()]
    } else {
        values
    }
}
