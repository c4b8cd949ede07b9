//! Structured log events for notable system operations.

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn index_rebuilt(fragments: usize, vocabulary: usize) {
    tracing::info!(
        event = "index_rebuilt",
        fragments,
        vocabulary,
        "sparse index rebuilt"
    );
}

pub fn clusters_refit(clusters: usize, samples: usize) {
    tracing::info!(
        event = "clusters_refit",
        clusters,
        samples,
        "query partition refit"
    );
}

pub fn feedback_rejected(reason: &str) {
    tracing::warn!(event = "feedback_rejected", reason = %reason, "feedback rejected");
}
