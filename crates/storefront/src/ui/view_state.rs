//! Loading/error/empty/ready state for a data-backed section.

use crate::api::ApiError;

/// What a data section shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// Not fetched yet; rendered as a placeholder that requests its data.
    Loading,
    /// The fetch failed; carries the message to display.
    Error(String),
    /// The fetch succeeded with nothing to show.
    Empty,
    Ready(T),
}

impl<T> ViewState<T> {
    /// Build from a fetch result. `ready` returns `None` when the payload
    /// has nothing to show.
    pub fn from_fetch<L>(
        result: Result<L, ApiError>,
        error_message: &str,
        ready: impl FnOnce(L) -> Option<T>,
    ) -> Self {
        match result {
            Ok(payload) => ready(payload).map_or(Self::Empty, Self::Ready),
            Err(e) => {
                tracing::error!(error = %e, "Section fetch failed");
                Self::Error(error_message.to_string())
            }
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}
