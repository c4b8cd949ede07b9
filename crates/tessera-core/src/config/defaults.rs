// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "tessera.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hash";
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_PROVIDER_MAX_RETRIES: u32 = 3;
pub const DEFAULT_PROVIDER_BACKOFF_MS: u64 = 100;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROVIDER_COOLDOWN_SECS: u64 = 30;
pub const DEFAULT_HASH_FALLBACK: bool = false;

// --- Sparse activation ---
pub const DEFAULT_SPARSE_CANDIDATES: usize = 200;
pub const DEFAULT_MIN_KEYWORD_CHARS: usize = 3;

// --- Dense reranking ---
pub const DEFAULT_RERANK_TOP_N: usize = 20;
pub const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.7;
pub const DEFAULT_IMPORTANCE_WEIGHT: f64 = 0.3;
pub const DEFAULT_WEIGHT_UPPER_BOUND: f64 = 2.0;
pub const DEFAULT_FALLBACK_THRESHOLD: f64 = 0.2;

// --- Quantizer ---
pub const DEFAULT_CLUSTER_COUNT: usize = 50;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 50;
pub const DEFAULT_KMEANS_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_FIT_SAMPLE_SIZE: usize = 5_000;
pub const DEFAULT_KMEANS_SEED: u64 = 42;

// --- Selector ---
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.1;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_UCB_CONSTANT: f64 = std::f64::consts::SQRT_2;

// --- Feedback ---
pub const DEFAULT_HIGH_QUALITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MEDIUM_QUALITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 100;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1_024;
pub const DEFAULT_EVENT_TIMEOUT_SECS: u64 = 30;

// --- Ingestion ---
pub const DEFAULT_CHAPTER_BOOST: f64 = 0.5;
pub const DEFAULT_TONAL_SHIFT_BOOST: f64 = 0.25;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TRACING_ENABLED: bool = false;
