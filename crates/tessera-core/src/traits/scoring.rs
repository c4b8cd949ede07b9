use crate::errors::TesseraResult;

/// Opaque judge of generation quality.
pub trait IScoringOracle: Send + Sync {
    /// Score generated text against the context it was produced from, in [0, 1].
    fn score(&self, generated_text: &str, context: &[String]) -> TesseraResult<f64>;

    /// Human-readable oracle name.
    fn name(&self) -> &str;
}
