//! In-memory document model
//!
//! The [`Surface`] is the headless stand-in for the page: it holds the search control, the
//! result region, stacked notifications, progress overlays, temporary save anchors and the
//! object URLs backing them. Hosts read it through snapshot accessors (every accessor
//! returns owned clones), while the client components mutate it through crate-internal
//! methods.
//!
//! Transient elements are owned through [`ElementGuard`] / [`ObjectUrl`] values that remove
//! their element when dropped, so an element cannot outlive the code path that created it.

use crate::types::{DownloadJob, Notification, ProgressState, Variant};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Label of the search control while idle
pub const SEARCH_LABEL: &str = "Search";
/// Label of the search control while a search is in flight
pub const SEARCHING_LABEL: &str = "Searching...";

/// Identifier of an element mounted on the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The search input and its trigger control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchControl {
    /// Current contents of the URL input
    pub input: String,
    /// Whether the trigger accepts clicks
    pub enabled: bool,
    /// Trigger label
    pub label: String,
}

impl Default for SearchControl {
    fn default() -> Self {
        Self {
            input: String::new(),
            enabled: true,
            label: SEARCH_LABEL.to_string(),
        }
    }
}

/// Lifecycle phase of a notification element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPhase {
    /// Appended, not yet transitioned
    Mounted,
    /// Fully visible
    Visible,
    /// Fading out; removed when the fade completes
    Hiding,
}

/// A notification element
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationElement {
    /// Element ID
    pub id: ElementId,
    /// Message and style
    pub notification: Notification,
    /// Current phase
    pub phase: NotificationPhase,
}

/// A progress overlay element
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayElement {
    /// Element ID
    pub id: ElementId,
    /// Whether the overlay carries the shared overlay key
    pub shared: bool,
    /// Heading ("Enhanced download")
    pub heading: String,
    /// Subtitle (media title)
    pub subtitle: String,
    /// Current progress
    pub progress: ProgressState,
}

/// A bound download action inside the rendered result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAction {
    /// Button label
    pub label: String,
    /// Job started when the action is clicked
    pub job: DownloadJob,
}

/// The rendered result region
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    /// Media title (raw, unescaped)
    pub title: String,
    /// Escaped markup of the result card
    pub html: String,
    /// Action bound to the original download
    pub original: DownloadAction,
    /// Action bound to the enhanced download
    pub enhanced: DownloadAction,
}

impl ResultView {
    /// Action bound to the given variant
    pub fn action(&self, variant: Variant) -> &DownloadAction {
        match variant {
            Variant::Original => &self.original,
            Variant::Enhanced => &self.enhanced,
        }
    }
}

/// A temporary element that carries an object URL and filename during a save
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAnchor {
    /// Element ID
    pub id: ElementId,
    /// Object URL of the blob being saved
    pub object_url: String,
    /// Suggested filename
    pub filename: String,
}

/// How an overlay update or close finds its overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OverlayTarget {
    /// A specific overlay
    Element(ElementId),
    /// The first overlay carrying the shared key
    Shared,
}

#[derive(Debug, Default)]
struct SurfaceState {
    next_id: u64,
    control: SearchControl,
    result: Option<ResultView>,
    notifications: Vec<NotificationElement>,
    overlays: Vec<OverlayElement>,
    anchors: Vec<SaveAnchor>,
    object_urls: HashMap<String, Arc<Vec<u8>>>,
    scroll_requests: u64,
    reflows: u64,
}

impl SurfaceState {
    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    fn overlay_index(&self, target: OverlayTarget) -> Option<usize> {
        match target {
            OverlayTarget::Element(id) => self.overlays.iter().position(|o| o.id == id),
            OverlayTarget::Shared => self.overlays.iter().position(|o| o.shared),
        }
    }
}

/// Shared handle to the in-memory document (cheap to clone)
#[derive(Clone, Debug, Default)]
pub struct Surface {
    state: Arc<Mutex<SurfaceState>>,
}

impl Surface {
    /// Create an empty surface with an idle search control
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        // Drop impls remove elements through here, so poisoning must not stop them.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- host-facing accessors ---

    /// Replace the contents of the URL input
    pub fn set_url_input(&self, input: impl Into<String>) {
        self.state().control.input = input.into();
    }

    /// Snapshot of the search control
    pub fn control(&self) -> SearchControl {
        self.state().control.clone()
    }

    /// Snapshot of the rendered result, if any
    pub fn result(&self) -> Option<ResultView> {
        self.state().result.clone()
    }

    /// Snapshot of the mounted notifications, oldest first
    pub fn notifications(&self) -> Vec<NotificationElement> {
        self.state().notifications.clone()
    }

    /// Snapshot of the mounted progress overlays, oldest first
    pub fn overlays(&self) -> Vec<OverlayElement> {
        self.state().overlays.clone()
    }

    /// Snapshot of the mounted save anchors
    pub fn anchors(&self) -> Vec<SaveAnchor> {
        self.state().anchors.clone()
    }

    /// Number of object URLs that have not been released
    pub fn object_url_count(&self) -> usize {
        self.state().object_urls.len()
    }

    /// Number of scroll-into-view requests issued for the result region
    pub fn scroll_requests(&self) -> u64 {
        self.state().scroll_requests
    }

    /// Number of forced layout recomputations
    pub fn reflow_count(&self) -> u64 {
        self.state().reflows
    }

    /// Whether an element with this ID is mounted
    pub fn contains(&self, id: ElementId) -> bool {
        let state = self.state();
        state.notifications.iter().any(|n| n.id == id)
            || state.overlays.iter().any(|o| o.id == id)
            || state.anchors.iter().any(|a| a.id == id)
    }

    // --- search control / result region ---

    pub(crate) fn set_control_state(&self, enabled: bool, label: &str) {
        let mut state = self.state();
        state.control.enabled = enabled;
        state.control.label = label.to_string();
    }

    pub(crate) fn replace_result(&self, view: ResultView) {
        let mut state = self.state();
        if let Some(previous) = state.result.replace(view) {
            tracing::debug!(title = %previous.title, "replaced rendered result");
        }
    }

    pub(crate) fn scroll_result_into_view(&self) {
        self.state().scroll_requests += 1;
    }

    /// Force a layout recomputation for `id` so its next style change is observable
    pub(crate) fn reflow(&self, id: ElementId) {
        let mut state = self.state();
        state.reflows += 1;
        tracing::trace!(element = %id, "reflow");
    }

    // --- notifications ---

    pub(crate) fn mount_notification(&self, notification: Notification) -> ElementGuard {
        let id = {
            let mut state = self.state();
            let id = state.allocate();
            state.notifications.push(NotificationElement {
                id,
                notification,
                phase: NotificationPhase::Mounted,
            });
            id
        };
        ElementGuard::new(self.clone(), id)
    }

    pub(crate) fn set_notification_phase(&self, id: ElementId, phase: NotificationPhase) -> bool {
        let mut state = self.state();
        match state.notifications.iter_mut().find(|n| n.id == id) {
            Some(element) => {
                element.phase = phase;
                true
            }
            None => false,
        }
    }

    // --- progress overlays ---

    pub(crate) fn mount_overlay(
        &self,
        shared: bool,
        heading: String,
        subtitle: String,
        progress: ProgressState,
    ) -> ElementId {
        let mut state = self.state();
        let id = state.allocate();
        state.overlays.push(OverlayElement {
            id,
            shared,
            heading,
            subtitle,
            progress,
        });
        id
    }

    pub(crate) fn update_overlay(&self, target: OverlayTarget, progress: ProgressState) -> bool {
        let mut state = self.state();
        match state.overlay_index(target) {
            Some(index) => {
                state.overlays[index].progress = progress;
                true
            }
            None => false,
        }
    }

    pub(crate) fn overlay_progress(&self, target: OverlayTarget) -> Option<ProgressState> {
        let state = self.state();
        state
            .overlay_index(target)
            .map(|index| state.overlays[index].progress.clone())
    }

    pub(crate) fn remove_overlay(&self, target: OverlayTarget) -> bool {
        let mut state = self.state();
        match state.overlay_index(target) {
            Some(index) => {
                state.overlays.remove(index);
                true
            }
            None => false,
        }
    }

    // --- object URLs and save anchors ---

    pub(crate) fn create_object_url(&self, data: Vec<u8>) -> ObjectUrl {
        let url = {
            let mut state = self.state();
            let id = state.allocate();
            let url = format!("blob:audio-dl/{}", id.0);
            state.object_urls.insert(url.clone(), Arc::new(data));
            url
        };
        ObjectUrl {
            surface: self.clone(),
            url,
        }
    }

    pub(crate) fn resolve_object_url(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.state().object_urls.get(url).cloned()
    }

    fn revoke_object_url(&self, url: &str) -> bool {
        self.state().object_urls.remove(url).is_some()
    }

    pub(crate) fn append_save_anchor(&self, object_url: &ObjectUrl, filename: &str) -> ElementGuard {
        let id = {
            let mut state = self.state();
            let id = state.allocate();
            state.anchors.push(SaveAnchor {
                id,
                object_url: object_url.as_str().to_string(),
                filename: filename.to_string(),
            });
            id
        };
        ElementGuard::new(self.clone(), id)
    }

    /// Remove any element (notification, overlay or anchor) by ID
    pub(crate) fn remove_element(&self, id: ElementId) -> bool {
        let mut state = self.state();
        let before = state.notifications.len() + state.overlays.len() + state.anchors.len();
        state.notifications.retain(|n| n.id != id);
        state.overlays.retain(|o| o.id != id);
        state.anchors.retain(|a| a.id != id);
        before != state.notifications.len() + state.overlays.len() + state.anchors.len()
    }
}

/// Owns a mounted element; removes it from the surface when dropped
#[derive(Debug)]
pub struct ElementGuard {
    surface: Surface,
    id: ElementId,
}

impl ElementGuard {
    fn new(surface: Surface, id: ElementId) -> Self {
        Self { surface, id }
    }

    /// ID of the guarded element
    pub fn id(&self) -> ElementId {
        self.id
    }
}

impl Drop for ElementGuard {
    fn drop(&mut self) {
        if !self.surface.remove_element(self.id) {
            tracing::debug!(element = %self.id, "element already removed");
        }
    }
}

/// Owns an object URL; releases it when dropped
#[derive(Debug)]
pub struct ObjectUrl {
    surface: Surface,
    url: String,
}

impl ObjectUrl {
    /// The URL string
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if !self.surface.revoke_object_url(&self.url) {
            tracing::warn!(url = %self.url, "object URL already released");
        }
    }
}
