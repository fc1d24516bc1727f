pub mod combiner;
pub mod error;
pub mod fields;
pub mod merger;
pub mod negation;
pub mod normalizer;
pub mod schema;
pub mod source;

pub use error::{SpanError, SpanResult};
pub use schema::{
    Analysis, Entity, EntityLabel, RawSpan, Span, StructuredReport, BACK_TO_NORMAL, NOT_MENTIONED,
};
pub use source::SourceText;

use tracing::info;

/// Normalize, merge and combine raw recognizer spans over `text`.
pub fn consolidate(source: &SourceText, raw: &[RawSpan]) -> SpanResult<Vec<Span>> {
    let spans = normalizer::normalize_spans(source, raw)?;
    let spans = merger::merge_adjacent(source, spans);
    Ok(combiner::combine_structure_symptoms(spans))
}

/// Full consolidation pass for one transcript.
///
/// Pure and synchronous: the only failure is malformed span input. An empty
/// span list still yields a report made of fallbacks and placeholders.
pub fn analyze(text: &str, raw: &[RawSpan]) -> SpanResult<Analysis> {
    let source = SourceText::new(text);
    let spans = consolidate(&source, raw)?;
    let report = fields::extract_fields(&source, &spans);

    info!(
        raw_spans = raw.len(),
        entities = spans.len(),
        symptoms = report.symptoms.len(),
        "Consolidated transcript entities"
    );

    Ok(Analysis {
        report,
        entities: spans.iter().map(Entity::from).collect(),
    })
}
