use serde::{Deserialize, Serialize};

/// Uniform response body of the applications backend.
///
/// `authenticated: Some(false)` marks an expired or missing session and is
/// distinct from an ordinary `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub authenticated: Option<bool>,
}

impl<T> Envelope<T> {
    pub fn is_unauthenticated(&self) -> bool {
        !self.success && self.authenticated == Some(false)
    }
}
