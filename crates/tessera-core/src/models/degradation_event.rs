use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of a component falling back to a degraded path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}
