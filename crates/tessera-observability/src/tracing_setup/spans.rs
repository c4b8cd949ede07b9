//! Span macros for the engine's operations.

/// Span around one selection request.
#[macro_export]
macro_rules! selection_span {
    ($top_k:expr, $dimensions:expr) => {
        tracing::info_span!("tessera.selection", top_k = $top_k, dimensions = $dimensions)
    };
}

/// Span around processing one feedback event.
#[macro_export]
macro_rules! feedback_span {
    ($fragment_count:expr) => {
        tracing::info_span!("tessera.feedback", fragment_count = $fragment_count)
    };
}

/// Span around ingesting one source text.
#[macro_export]
macro_rules! ingestion_span {
    ($scope:expr) => {
        tracing::info_span!("tessera.ingestion", scope = ?$scope)
    };
}

/// Span around fitting the query partition.
#[macro_export]
macro_rules! quantizer_span {
    ($clusters:expr, $samples:expr) => {
        tracing::info_span!("tessera.quantizer", clusters = $clusters, samples = $samples)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SELECTION: &str = "tessera.selection";
    pub const FEEDBACK: &str = "tessera.feedback";
    pub const INGESTION: &str = "tessera.ingestion";
    pub const QUANTIZER: &str = "tessera.quantizer";
}

#[cfg(test)]
mod tests {
    #[test]
    fn spans_can_be_entered() {
        let span = crate::selection_span!(5usize, 384usize);
        let _guard = span.enter();
        let _ = crate::feedback_span!(3usize);
        let _ = crate::ingestion_span!(Some("book-1"));
        let _ = crate::quantizer_span!(16usize, 1000usize);
    }
}
