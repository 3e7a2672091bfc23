use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directed subscription edge; (follower_id, following_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}
