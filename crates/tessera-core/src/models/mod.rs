mod degradation_event;
mod feedback;
mod selection;

pub use degradation_event::DegradationEvent;
pub use feedback::{FeedbackAck, FeedbackEvent, FeedbackOutcome, HumanSignal, StorageAction};
pub use selection::{
    CandidatePath, SelectedFragment, SelectionMode, SelectionRequest, SelectionResult,
};

use crate::errors::{TesseraError, TesseraResult};

/// Shape check shared by selection requests and feedback events.
fn check_embedding(
    what: &str,
    embedding: &[f32],
    expected_dimensions: usize,
) -> TesseraResult<()> {
    if embedding.is_empty() {
        return Err(TesseraError::invalid_input(format!("{what} is empty")));
    }
    if embedding.len() != expected_dimensions {
        return Err(TesseraError::invalid_input(format!(
            "{what} has {} dimensions, expected {expected_dimensions}",
            embedding.len()
        )));
    }
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(TesseraError::invalid_input(format!("{what} contains non-finite values")));
    }
    Ok(())
}
