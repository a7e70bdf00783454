use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of the most recent completed or in-flight request.
///
/// Only changed through [`RequestStatus::reduce`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestStatus {
    pub response: Option<Value>,
    pub uploading: bool,
    pub error: bool,
}

/// The three transitions a status can go through.
#[derive(Debug, Clone, PartialEq)]
pub enum PostAction {
    UploadInit,
    UploadSuccess(Value),
    UploadError,
}

/// Derived view of a status, for rendering and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PostPhase {
    #[display("idle")]
    Idle,
    #[display("uploading")]
    Uploading,
    #[display("succeeded")]
    Succeeded,
    #[display("failed")]
    Failed,
}

impl RequestStatus {
    /// Apply a transition, returning the next status.
    ///
    /// `UploadInit` keeps the previous response in place; it is stale until
    /// the attempt settles.
    pub fn reduce(&self, action: PostAction) -> Self {
        match action {
            PostAction::UploadInit => Self {
                uploading: true,
                error: false,
                ..self.clone()
            },
            PostAction::UploadSuccess(payload) => Self {
                response: Some(payload),
                uploading: false,
                error: false,
            },
            PostAction::UploadError => Self {
                response: None,
                uploading: false,
                error: true,
            },
        }
    }

    pub fn phase(&self) -> PostPhase {
        if self.uploading {
            PostPhase::Uploading
        } else if self.error {
            PostPhase::Failed
        } else if self.response.is_some() {
            PostPhase::Succeeded
        } else {
            PostPhase::Idle
        }
    }
}
