//! Search control handling and the remote lookup.

use crate::error::{Error, Result};
use crate::surface::{SEARCH_LABEL, SEARCHING_LABEL, Surface};
use crate::types::{Event, SearchResult};

use super::AudioClient;

/// Info message shown while the service extracts metadata
pub(crate) const EXTRACTING_MESSAGE: &str = "Extracting video information...";

/// Keeps the search control disabled while alive; restores it when dropped
struct SearchControlGuard<'a> {
    surface: &'a Surface,
}

impl<'a> SearchControlGuard<'a> {
    fn engage(surface: &'a Surface) -> Self {
        surface.set_control_state(false, SEARCHING_LABEL);
        Self { surface }
    }
}

impl Drop for SearchControlGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_control_state(true, SEARCH_LABEL);
    }
}

impl AudioClient {
    /// Handle a click on the search control
    ///
    /// Reads the URL input and runs [`search`](Self::search). Returns `None` without doing
    /// anything if the control is disabled (a search is already in flight).
    pub async fn click_search(&self) -> Option<Result<SearchResult>> {
        let control = self.surface.control();
        if !control.enabled {
            tracing::debug!("search control is disabled, ignoring click");
            return None;
        }
        Some(self.search(&control.input).await)
    }

    /// Search the service for `input` and render the result
    ///
    /// The search control is disabled and labelled "Searching..." until this returns. Empty
    /// or whitespace-only input fails with [`Error::MissingUrl`] without a network call.
    /// Every outcome is reported through a notification; the error is also returned.
    pub async fn search(&self, input: &str) -> Result<SearchResult> {
        let _control = SearchControlGuard::engage(&self.surface);

        let url = input.trim();
        if url.is_empty() {
            let err = Error::MissingUrl;
            tracing::warn!("search requested with an empty URL");
            self.notifier.error(err.to_string());
            self.emit_event(Event::SearchFailed {
                error: err.to_string(),
            });
            return Err(err);
        }

        self.emit_event(Event::SearchStarted {
            url: url.to_string(),
        });
        self.notifier.info(EXTRACTING_MESSAGE);

        match self.service.search(url).await {
            Ok(result) => {
                tracing::info!(url, title = %result.metadata.title, "media found");
                self.notifier
                    .success(format!("Video found: {}", result.metadata.title));
                self.emit_event(Event::SearchCompleted {
                    title: result.metadata.title.clone(),
                });
                self.render_result(&result);
                Ok(result)
            }
            Err(e) => {
                tracing::error!(url, error = %e, code = e.error_code(), "search failed");
                self.notifier.error(format!("Error: {}", e));
                self.emit_event(Event::SearchFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
