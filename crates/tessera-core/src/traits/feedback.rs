use std::sync::Arc;

use crate::models::{FeedbackEvent, FeedbackOutcome};

/// Consumer of feedback events. Processing is infallible from the caller's
/// view: failures are reported inside the outcome.
pub trait IFeedbackProcessor: Send + Sync {
    fn process(&self, event: &FeedbackEvent) -> FeedbackOutcome;
}

impl<T: IFeedbackProcessor + ?Sized> IFeedbackProcessor for Arc<T> {
    fn process(&self, event: &FeedbackEvent) -> FeedbackOutcome {
        (**self).process(event)
    }
}
