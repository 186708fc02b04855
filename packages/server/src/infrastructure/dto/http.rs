//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One connected session, as shown by the debug endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub user_id: String,
    pub session_id: String,
    /// RFC 3339, UTC
    pub connected_at: String,
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
