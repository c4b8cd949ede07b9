//! FeedbackQueue lifecycle: drain, discard, back-pressure, timeouts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tessera_core::models::{FeedbackAck, FeedbackEvent, FeedbackOutcome, StorageAction};
use tessera_core::traits::{IFeedbackProcessor, IValueStore};
use tessera_core::TesseraConfig;
use tessera_embeddings::HashEmbeddingProvider;
use tessera_learning::{FeedbackQueue, ReinforcementLoop, ShutdownMode};
use tessera_retrieval::{QueryQuantizer, SparseActivator};
use tessera_storage::{InMemoryValueStore, StorageEngine};

/// Counts events; blocks each one until the gate opens.
#[derive(Default)]
struct GatedProcessor {
    open: AtomicBool,
    seen: AtomicUsize,
    delay: Option<Duration>,
}

impl GatedProcessor {
    fn open() -> Self {
        Self {
            open: AtomicBool::new(true),
            ..Default::default()
        }
    }

    fn sleeping(delay: Duration) -> Self {
        Self {
            open: AtomicBool::new(true),
            delay: Some(delay),
            ..Default::default()
        }
    }
}

impl IFeedbackProcessor for GatedProcessor {
    fn process(&self, _event: &FeedbackEvent) -> FeedbackOutcome {
        while !self.open.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(2));
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.seen.fetch_add(1, Ordering::AcqRel);
        FeedbackOutcome {
            reward: 0.5,
            cluster_id: 0,
            updated: 0,
            update_failures: 0,
            action: StorageAction::Skipped,
        }
    }
}

fn event() -> FeedbackEvent {
    FeedbackEvent::new(vec!["f".to_string()], vec![1.0, 0.0])
}

#[tokio::test]
async fn drain_processes_the_backlog() {
    let processor = Arc::new(GatedProcessor::open());
    let queue = FeedbackQueue::start(processor.clone(), 16, Duration::from_secs(5)).unwrap();

    for _ in 0..5 {
        assert_eq!(queue.submit(event()), FeedbackAck::Accepted);
    }
    let stats = queue.shutdown(ShutdownMode::Drain).await;

    assert_eq!(stats.processed, 5);
    assert_eq!(stats.discarded, 0);
    assert_eq!(stats.backlog, 0);
    assert!(!stats.running);
    assert_eq!(processor.seen.load(Ordering::Acquire), 5);
}

#[tokio::test]
async fn discard_drops_the_backlog() {
    let processor = Arc::new(GatedProcessor::default());
    let queue = FeedbackQueue::start(processor.clone(), 16, Duration::from_secs(5)).unwrap();

    for _ in 0..3 {
        assert!(queue.submit(event()).is_accepted());
    }
    // Let the worker pick up the first event and block on the gate.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let gate = processor.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        gate.open.store(true, Ordering::Release);
    });
    let stats = queue.shutdown(ShutdownMode::Discard).await;

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.discarded, 2);
    assert_eq!(processor.seen.load(Ordering::Acquire), 1);
}

#[tokio::test]
async fn full_queue_rejects_without_blocking() {
    let processor = Arc::new(GatedProcessor::default());
    let queue = FeedbackQueue::start(processor.clone(), 1, Duration::from_secs(5)).unwrap();

    let acks: Vec<FeedbackAck> = (0..10).map(|_| queue.submit(event())).collect();
    let accepted = acks.iter().filter(|a| a.is_accepted()).count();
    assert!(accepted >= 1 && accepted <= 2);
    match acks.last() {
        Some(FeedbackAck::Rejected { reason }) => assert!(reason.contains("full")),
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(queue.stats().rejected as usize, 10 - accepted);

    processor.open.store(true, Ordering::Release);
    let stats = queue.shutdown(ShutdownMode::Drain).await;
    assert_eq!(stats.processed as usize, accepted);
}

#[tokio::test]
async fn closed_queue_rejects() {
    let queue = FeedbackQueue::start(
        Arc::new(GatedProcessor::open()),
        4,
        Duration::from_secs(5),
    )
    .unwrap();
    queue.shutdown(ShutdownMode::Drain).await;

    match queue.submit(event()) {
        FeedbackAck::Rejected { reason } => assert!(reason.contains("closed")),
        FeedbackAck::Accepted => panic!("closed queue accepted an event"),
    }
    assert_eq!(queue.stats().rejected, 1);
}

#[tokio::test]
async fn slow_events_time_out_and_the_worker_moves_on() {
    let processor = Arc::new(GatedProcessor::sleeping(Duration::from_millis(300)));
    let queue = FeedbackQueue::start(processor, 4, Duration::from_millis(20)).unwrap();

    queue.submit(event());
    queue.submit(event());
    let stats = queue.shutdown(ShutdownMode::Drain).await;

    assert_eq!(stats.timed_out, 2);
    assert_eq!(stats.processed, 0);
}

#[tokio::test]
async fn reinforcement_loop_runs_behind_the_queue() {
    let mut config = TesseraConfig::default();
    config.embedding.dimensions = 4;
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let values = Arc::new(InMemoryValueStore::new());
    let looped = Arc::new(ReinforcementLoop::new(
        store,
        values.clone(),
        Arc::new(HashEmbeddingProvider::new(4)),
        Arc::new(SparseActivator::new(config.sparse.clone())),
        Arc::new(QueryQuantizer::new(config.quantizer.clone())),
        &config,
    ));
    let queue = FeedbackQueue::from_config(looped, &config.feedback).unwrap();

    let ev = FeedbackEvent::new(vec!["frag-a".to_string()], vec![1.0, 0.0, 0.0, 0.0])
        .with_automatic_score(1.0);
    assert!(queue.submit(ev).is_accepted());
    let stats = queue.shutdown(ShutdownMode::Drain).await;

    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 0);
    let entry = values.get_or_default("frag-a", 0).unwrap();
    assert_eq!(entry.visits, 1);
    assert!((entry.value - 0.535).abs() < 1e-9);
}
