use serde::{Deserialize, Serialize};

/// A stored upload: opaque id pointing at a file name in the media area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub filename: String,
}
