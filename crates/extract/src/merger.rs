use crate::schema::{mean_confidence, Span};
use crate::source::SourceText;
use tracing::debug;

/// Largest gap, in chars, still bridged between two same-label spans.
pub const ADJACENCY_TOLERANCE: usize = 1;

/// Coalesce runs of same-label spans left by sub-word tagging.
///
/// Expects spans sorted by `start`. A span joins the running accumulator when
/// it has the same label and begins at most one char after the accumulator ends;
/// the merged text is re-read from `source` and the confidence is the plain
/// mean of the two scores.
pub fn merge_adjacent(source: &SourceText, spans: Vec<Span>) -> Vec<Span> {
    let input = spans.len();
    let mut iter = spans.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        if next.label == current.label && next.start <= current.end + ADJACENCY_TOLERANCE {
            current.end = current.end.max(next.end);
            current.text = source.span_text(current.start, current.end);
            current.confidence = mean_confidence(current.confidence, next.confidence);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    debug!(input, output = merged.len(), "Merged adjacent spans");
    merged
}
