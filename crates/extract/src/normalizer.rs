use crate::error::{SpanError, SpanResult};
use crate::schema::{EntityLabel, RawSpan, Span};
use crate::source::SourceText;
use tracing::debug;

const STAGE: &str = "normalize";

/// Validate raw recognizer spans, drop empty ones and sort them by offset.
///
/// Text is always re-derived from `source`; the recognizer's `word` is ignored.
/// Ties on `start` are broken by `(end, label, confidence)` so the result does
/// not depend on input order.
pub fn normalize_spans(source: &SourceText, raw: &[RawSpan]) -> SpanResult<Vec<Span>> {
    let mut spans = Vec::with_capacity(raw.len());
    let mut dropped = 0;

    for (index, item) in raw.iter().enumerate() {
        let start = item.start.ok_or(SpanError::MissingField {
            stage: STAGE,
            index,
            field: "start",
        })?;
        let end = item.end.ok_or(SpanError::MissingField {
            stage: STAGE,
            index,
            field: "end",
        })?;
        let label = item.label.as_deref().ok_or(SpanError::MissingField {
            stage: STAGE,
            index,
            field: "label",
        })?;
        let confidence = item.confidence.ok_or(SpanError::MissingField {
            stage: STAGE,
            index,
            field: "confidence",
        })?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(SpanError::InvalidConfidence {
                stage: STAGE,
                index,
                value: confidence,
            });
        }

        if start >= end {
            dropped += 1;
            continue;
        }

        if end > source.len() {
            return Err(SpanError::OutOfBounds {
                stage: STAGE,
                index,
                start,
                end,
                len: source.len(),
            });
        }

        spans.push(Span {
            start,
            end,
            label: EntityLabel::from(label),
            text: source.span_text(start, end),
            confidence,
        });
    }

    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then_with(|| a.label.cmp(&b.label))
            .then(a.confidence.total_cmp(&b.confidence))
    });

    debug!(input = raw.len(), kept = spans.len(), dropped, "Normalized spans");
    Ok(spans)
}
