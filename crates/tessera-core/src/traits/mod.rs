mod embedding;
mod feedback;
mod scoring;
mod segment_store;
mod value_store;

pub use embedding::IEmbeddingProvider;
pub use feedback::IFeedbackProcessor;
pub use scoring::IScoringOracle;
pub use segment_store::ISegmentStore;
pub use value_store::IValueStore;
