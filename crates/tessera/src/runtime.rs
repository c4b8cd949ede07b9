//! TesseraRuntime: owns every engine, the feedback worker and the metrics.
//!
//! Construction needs a Tokio runtime for the feedback worker. Selection,
//! ingestion and maintenance calls are synchronous; when an HTTP embedding
//! provider is configured, call them from blocking context (for example
//! `tokio::task::spawn_blocking`), since the provider drives its own
//! current-thread runtime per request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use tessera_core::config::TesseraConfig;
use tessera_core::errors::{TesseraError, TesseraResult};
use tessera_core::models::{
    FeedbackAck, FeedbackEvent, FeedbackOutcome, SelectionRequest, SelectionResult,
};
use tessera_core::traits::{IEmbeddingProvider, IFeedbackProcessor, ISegmentStore, IValueStore};
use tessera_embeddings::{create_oracle, EmbeddingEngine};
use tessera_learning::{FeedbackQueue, QueueStats, ReinforcementLoop, ShutdownMode};
use tessera_observability::tracing_setup::{self, events};
use tessera_observability::{
    feedback_span, ingestion_span, quantizer_span, selection_span, HealthReport, HealthSnapshot,
    ObservabilityEngine,
};
use tessera_retrieval::{
    AdaptiveSelector, IngestionPipeline, QueryQuantizer, RetrievalEngine, SparseActivator,
};
use tessera_storage::StorageEngine;

/// Options for opening a runtime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// SQLite database path. Falls back to `storage.db_path` in the config,
    /// then to an in-memory database.
    pub db_path: Option<PathBuf>,
    /// TOML configuration. Defaults apply when absent.
    pub config_toml: Option<String>,
    /// Fixed seed for the exploration RNG, for reproducible runs.
    pub selector_seed: Option<u64>,
}

/// Records every processed outcome before handing it back to the queue.
struct MeteredProcessor {
    inner: Arc<ReinforcementLoop>,
    observability: Arc<ObservabilityEngine>,
}

impl IFeedbackProcessor for MeteredProcessor {
    fn process(&self, event: &FeedbackEvent) -> FeedbackOutcome {
        let span = feedback_span!(event.fragment_ids.len());
        let _guard = span.enter();
        let outcome = self.inner.process(event);
        self.observability.metrics.feedback.record(&outcome);
        outcome
    }
}

pub struct TesseraRuntime {
    config: TesseraConfig,
    storage: Arc<StorageEngine>,
    embeddings: Arc<EmbeddingEngine>,
    activator: Arc<SparseActivator>,
    quantizer: Arc<QueryQuantizer>,
    retrieval: RetrievalEngine,
    ingestion: IngestionPipeline,
    processor: Arc<MeteredProcessor>,
    feedback: FeedbackQueue,
    observability: Arc<ObservabilityEngine>,
}

impl TesseraRuntime {
    /// Wire every engine, rebuild the sparse index from the store, fit the
    /// query partition when the store has content, and start the feedback worker.
    pub fn open(opts: RuntimeOptions) -> TesseraResult<Self> {
        let config = match &opts.config_toml {
            Some(toml_str) => TesseraConfig::from_toml(toml_str)?,
            None => TesseraConfig::default(),
        };
        config.validate()?;
        tracing_setup::init_from_config(&config.observability);

        let storage = Arc::new(match &opts.db_path {
            Some(path) => StorageEngine::open(path)?,
            None => StorageEngine::from_config(&config.storage)?,
        });
        let embeddings = Arc::new(EmbeddingEngine::new(config.embedding.clone()));
        let observability = Arc::new(ObservabilityEngine::new());

        let activator = Arc::new(SparseActivator::new(config.sparse.clone()));
        let indexed = activator.build_index(storage.as_ref(), None)?;

        let quantizer = Arc::new(QueryQuantizer::new(config.quantizer.clone()));
        if indexed > 0 {
            if let Err(e) = quantizer.fit_from_store(storage.as_ref()) {
                warn!(error = %e, "initial quantizer fit failed; using a single cluster");
            }
        }

        let selector = match opts.selector_seed {
            Some(seed) => AdaptiveSelector::seeded(config.selector.clone(), seed),
            None => AdaptiveSelector::new(config.selector.clone()),
        };
        let retrieval = RetrievalEngine::new(
            storage.clone(),
            storage.clone(),
            activator.clone(),
            quantizer.clone(),
            selector,
            &config,
        );
        let ingestion = IngestionPipeline::new(
            storage.clone(),
            embeddings.clone(),
            activator.clone(),
            &config,
        )?;

        let reinforcement = ReinforcementLoop::new(
            storage.clone(),
            storage.clone(),
            embeddings.clone(),
            activator.clone(),
            quantizer.clone(),
            &config,
        )
        .with_oracle(create_oracle(&config.embedding));
        let processor = Arc::new(MeteredProcessor {
            inner: Arc::new(reinforcement),
            observability: observability.clone(),
        });
        let feedback = FeedbackQueue::from_config(processor.clone(), &config.feedback)?;

        info!(
            fragments = indexed,
            clusters = quantizer.cluster_count(),
            provider = embeddings.active_provider(),
            "tessera runtime opened"
        );
        Ok(Self {
            config,
            storage,
            embeddings,
            activator,
            quantizer,
            retrieval,
            ingestion,
            processor,
            feedback,
            observability,
        })
    }

    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn observability(&self) -> &Arc<ObservabilityEngine> {
        &self.observability
    }

    /// Select fragments for a query whose embedding the caller already has.
    pub fn select(&self, request: &SelectionRequest) -> TesseraResult<SelectionResult> {
        let span = selection_span!(request.top_k, request.query_embedding.len());
        let _guard = span.enter();
        let started = Instant::now();
        match self.retrieval.select(request) {
            Ok(result) => {
                self.observability
                    .metrics
                    .selection
                    .record(&result, started.elapsed());
                Ok(result)
            }
            Err(e) => {
                self.observability.metrics.selection.record_error(&e);
                Err(e)
            }
        }
    }

    /// Embed `query_text` with the configured provider, then select.
    pub fn select_text(&self, query_text: &str, top_k: usize) -> TesseraResult<SelectionResult> {
        let embedding = self.embeddings.embed(query_text);
        self.sync_degradation();
        self.select(&SelectionRequest::new(query_text, embedding?, top_k))
    }

    /// [`select_text`](Self::select_text) on the blocking pool, for async callers.
    pub async fn select_text_async(
        self: Arc<Self>,
        query_text: String,
        top_k: usize,
    ) -> TesseraResult<SelectionResult> {
        tokio::task::spawn_blocking(move || self.select_text(&query_text, top_k))
            .await
            .map_err(|e| TesseraError::ConcurrencyError(e.to_string()))?
    }

    /// Queue feedback for asynchronous processing. Never blocks.
    ///
    /// Events with a malformed query or generated embedding are rejected
    /// here and never reach the worker.
    pub fn submit_feedback(&self, event: FeedbackEvent) -> FeedbackAck {
        let ack = match event.validate(self.config.embedding.dimensions) {
            Ok(()) => self.feedback.submit(event),
            Err(e) => FeedbackAck::Rejected {
                reason: e.to_string(),
            },
        };
        self.observability
            .metrics
            .feedback
            .record_submission(ack.is_accepted());
        if let FeedbackAck::Rejected { reason } = &ack {
            events::feedback_rejected(reason);
        }
        ack
    }

    /// Process one event on the calling thread, bypassing the queue.
    pub fn process_feedback(&self, event: &FeedbackEvent) -> FeedbackOutcome {
        self.processor.process(event)
    }

    /// Split, weigh, embed and store `text`. Returns the new fragment ids.
    pub fn ingest(&self, text: &str, scope: Option<&str>) -> TesseraResult<Vec<String>> {
        let span = ingestion_span!(scope);
        let _guard = span.enter();
        let result = self.ingestion.ingest(text, scope);
        self.sync_degradation();
        result
    }

    /// Rebuild the sparse index from the store. Returns the indexed count.
    pub fn rebuild_index(&self) -> TesseraResult<usize> {
        let indexed = self.activator.build_index(self.storage.as_ref(), None)?;
        events::index_rebuilt(indexed, self.activator.vocabulary_size());
        Ok(indexed)
    }

    /// Refit the query partition from stored embeddings. Returns the cluster count.
    ///
    /// Learned values are keyed by cluster index; a refit reassigns what those
    /// indices mean, so values learned under the old partition carry over as-is.
    pub fn refit_clusters(&self) -> TesseraResult<usize> {
        let span = quantizer_span!(
            self.config.quantizer.clusters,
            self.config.quantizer.sample_size
        );
        let _guard = span.enter();
        let clusters = self.quantizer.fit_from_store(self.storage.as_ref())?;
        events::clusters_refit(clusters, self.storage.count()?);
        Ok(clusters)
    }

    /// Health report over storage, index, partition, embeddings and the queue.
    pub fn health(&self) -> TesseraResult<HealthReport> {
        self.sync_degradation();
        let queue = self.feedback.stats();
        let snapshot = HealthSnapshot {
            fragment_count: self.storage.count()?,
            value_entry_count: self.storage.entry_count()?,
            indexed_fragments: self.activator.len(),
            vocabulary_size: self.activator.vocabulary_size(),
            cluster_count: self.quantizer.cluster_count(),
            quantizer_fitted: self.quantizer.is_fitted(),
            embedding_provider: self.embeddings.active_provider().to_string(),
            embedding_available: self.embeddings.is_available(),
            embedding_degraded: self.embeddings.active_provider() != self.config.embedding.provider,
            embedding_cache_entries: self.embeddings.cache_len(),
            queue_capacity: queue.capacity,
            queue_backlog: queue.backlog,
            queue_running: queue.running,
        };
        Ok(self.observability.health_report(snapshot))
    }

    pub fn feedback_stats(&self) -> QueueStats {
        self.feedback.stats()
    }

    /// Stop the feedback worker. `Drain` processes the backlog first,
    /// `Discard` drops it.
    pub async fn shutdown(&self, mode: ShutdownMode) -> QueueStats {
        let stats = self.feedback.shutdown(mode).await;
        info!(
            processed = stats.processed,
            discarded = stats.discarded,
            "tessera runtime stopped"
        );
        stats
    }

    /// Move provider fallbacks recorded by the embedding chain into the tracker.
    fn sync_degradation(&self) {
        for event in self.embeddings.drain_degradation_events() {
            self.observability.record_degradation(event);
        }
    }
}

impl std::fmt::Debug for TesseraRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseraRuntime")
            .field("dimensions", &self.config.embedding.dimensions)
            .field("indexed", &self.activator.len())
            .field("clusters", &self.quantizer.cluster_count())
            .finish()
    }
}
