//! Remote instance client error types

use thiserror::Error;

/// Errors reported by an [`InstanceClient`](crate::InstanceClient)
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Instance not found: {0}")]
    NotFound(String),

    #[error("API error{}: {message}", status_suffix(.status))]
    Api {
        /// HTTP status code, when the transport exposes one
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid instance handle: {0}")]
    InvalidHandle(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn api(message: impl Into<String>) -> Self {
        CloudError::Api {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        CloudError::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    /// True for a genuine "instance does not exist" answer.
    ///
    /// Transports that only surface raw HTTP errors are covered by
    /// treating a 404 status the same as [`CloudError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CloudError::NotFound(_)
                | CloudError::Api {
                    status: Some(404),
                    ..
                }
        )
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
