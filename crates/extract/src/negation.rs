use crate::schema::{EntityLabel, Span};
use crate::source::SourceText;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Chars of context inspected on each side of a symptom.
pub const NEGATION_WINDOW: usize = 50;

static NEGATION_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(no|not|don't|didn't|no longer|none|denies)\b").expect("negation pattern is valid")
});

/// True when a negation cue appears within the window around `span`.
///
/// Purely local: the window may cross sentence or speaker boundaries.
pub fn is_negated(source: &SourceText, span: &Span) -> bool {
    let start = span.start.saturating_sub(NEGATION_WINDOW);
    let end = span.end + NEGATION_WINDOW;
    let context = source.slice(start, end).to_lowercase();
    NEGATION_CUES.is_match(&context)
}

/// Trimmed texts of the symptom spans that are not negated, in span order.
pub fn affirmed_symptoms(source: &SourceText, spans: &[Span]) -> Vec<String> {
    let mut kept = Vec::new();
    let mut negated = 0;

    for span in spans.iter().filter(|s| s.is(&EntityLabel::SignSymptom)) {
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        if is_negated(source, span) {
            negated += 1;
            continue;
        }
        kept.push(text.to_string());
    }

    debug!(kept = kept.len(), negated, "Filtered negated symptoms");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symptom(start: usize, end: usize, text: &str) -> Span {
        Span {
            start,
            end,
            label: EntityLabel::SignSymptom,
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_denies_suppresses() {
        let source = SourceText::new("denies neck pain");
        let spans = vec![symptom(12, 16, "pain")];
        assert!(affirmed_symptoms(&source, &spans).is_empty());
    }

    #[test]
    fn test_reports_keeps() {
        let source = SourceText::new("reports neck pain");
        let spans = vec![symptom(13, 17, "pain")];
        assert_eq!(affirmed_symptoms(&source, &spans), vec!["pain"]);
    }

    #[test]
    fn test_whole_word_only() {
        // "nothing" and "knot" contain cues only as substrings.
        let source = SourceText::new("nothing but a knot of pain");
        assert!(!is_negated(&source, &symptom(22, 26, "pain")));
    }

    #[test]
    fn test_case_insensitive() {
        let source = SourceText::new("No fever today");
        assert!(is_negated(&source, &symptom(3, 8, "fever")));
    }

    #[test]
    fn test_window_edge() {
        // Cue ends exactly 50 chars before the span: inside. One further: outside.
        let pad = "x".repeat(47);
        let inside = format!("no {pad}pain");
        let source = SourceText::new(&inside);
        assert!(is_negated(&source, &symptom(50, 54, "pain")));

        let outside = format!("no  {pad}pain");
        let source = SourceText::new(&outside);
        assert!(!is_negated(&source, &symptom(51, 55, "pain")));
    }

    #[test]
    fn test_non_symptoms_are_ignored() {
        let source = SourceText::new("physiotherapy");
        let spans = vec![Span {
            label: EntityLabel::TherapeuticProcedure,
            ..symptom(0, 13, "physiotherapy")
        }];
        assert!(affirmed_symptoms(&source, &spans).is_empty());
    }
}
