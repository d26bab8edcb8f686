//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::images::ImageNormalizer;
use crate::middleware::security_headers::content_security_policy;
use crate::session::SessionEvents;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("api client: {0}")]
    Api(#[from] ApiError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    images: ImageNormalizer,
    content: ContentStore,
    session_events: SessionEvents,
    content_security_policy: String,
}

impl AppState {
    /// Build the state, loading markdown content from the configured
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the content
    /// directory cannot be read.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let content = ContentStore::load(&config.content_dir)?;
        Self::with_content(config, content)
    }

    /// Build the state around an already loaded content store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_content(config: StorefrontConfig, content: ContentStore) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api)?;
        let images = ImageNormalizer::from_config(&config.display);
        let content_security_policy = content_security_policy(&config.display.asset_base_url);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                images,
                content,
                session_events: SessionEvents::new(),
                content_security_policy,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Remote catalog and customer API.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn images(&self) -> &ImageNormalizer {
        &self.inner.images
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn session_events(&self) -> &SessionEvents {
        &self.inner.session_events
    }

    #[must_use]
    pub fn content_security_policy(&self) -> &str {
        &self.inner.content_security_policy
    }

    /// Currency symbol prefixed to prices.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.inner.config.display.currency_symbol
    }
}

impl FromRef<AppState> for SessionEvents {
    fn from_ref(state: &AppState) -> Self {
        state.inner.session_events.clone()
    }
}
