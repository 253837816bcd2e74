use thiserror::Error;

/// Failure of a host platform call. Never retried by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("missing permission: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("http status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Short reason suitable for an end-user reply.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "missing permissions",
            Self::NotFound(_) => "target not found",
            Self::Http { status, .. } if *status == 429 => "rate limited",
            Self::Http { .. } | Self::Decode(_) => "unexpected response",
            Self::Transport(_) => "connection problem",
        }
    }
}
