use crate::schema::{mean_confidence, EntityLabel, Span};
use tracing::debug;

/// Largest gap, in chars, between a body part and the symptom it qualifies.
pub const COMBINE_TOLERANCE: usize = 5;

/// Fuse `Biological_structure` + `Sign_symptom` pairs into one symptom ("neck" + "pain").
///
/// Cursor scan over the merged spans. When span `i` is a structure and span
/// `i + 1` a symptom starting at most five chars after it, both are consumed
/// and one composite symptom is emitted (cursor += 2). Otherwise span `i` is
/// emitted as is (cursor += 1). No chaining: a structure combines at most once.
pub fn combine_structure_symptoms(spans: Vec<Span>) -> Vec<Span> {
    let input = spans.len();
    let mut combined = Vec::with_capacity(input);
    let mut cursor = 0;

    while cursor < spans.len() {
        let current = &spans[cursor];
        match spans.get(cursor + 1) {
            Some(next) if qualifies(current, next) => {
                combined.push(Span {
                    start: current.start,
                    end: next.end,
                    label: EntityLabel::SignSymptom,
                    text: format!("{} {}", current.text, next.text),
                    confidence: mean_confidence(current.confidence, next.confidence),
                });
                cursor += 2;
            }
            _ => {
                combined.push(current.clone());
                cursor += 1;
            }
        }
    }

    debug!(input, output = combined.len(), "Combined structure/symptom pairs");
    combined
}

fn qualifies(structure: &Span, symptom: &Span) -> bool {
    structure.is(&EntityLabel::BiologicalStructure)
        && symptom.is(&EntityLabel::SignSymptom)
        && symptom.start <= structure.end + COMBINE_TOLERANCE
}
