//! History-backed suggestion field.
//!
//! [`SuggestionField`] wraps a [`TextInput`], loads the field's history
//! through the shared [`HistoryManager`], and drives an
//! [`OverlayPresenter`] with the entries matching what the user typed.
//!
//! The field is event driven: the host forwards [`InputEvent`]s and
//! [`OverlayEvent`]s, calls [`SuggestionField::tick`] while the overlay
//! animates, and draws whatever [`SuggestionField::overlay_view`] returns.
//! Engine methods are synchronous; history I/O runs on spawned Tokio tasks.

mod filter;

pub use filter::filter_suggestions;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use recall_lib::{FieldHistory, HistoryManager};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, SuggestionConfig};
use crate::geometry::Rect;
use crate::input::{InputEvent, TextInput};
use crate::overlay::{ItemRenderer, OverlayEvent, OverlayPhase, OverlayPresenter, OverlayView};

type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Lifecycle of a suggestion field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    /// History is being loaded; the input is read-only.
    #[default]
    Loading,
    /// Ready, no suggestions shown.
    Idle,
    /// The overlay lists matching entries.
    ShowingSuggestions,
    /// Torn down; every method is a no-op.
    Disposed,
}

#[derive(Clone, Copy)]
enum CallbackKind {
    Selected,
    Submitted,
}

#[derive(Default)]
struct Callbacks {
    on_selected: Option<Callback>,
    on_submitted: Option<Callback>,
}

struct FieldInner {
    state: FieldState,
    history: FieldHistory,
    /// Last text seen from the input.
    query: String,
    /// Current filtered result; empty unless suggestions are shown.
    suggestions: Vec<String>,
    overlay: OverlayPresenter,
}

impl FieldInner {
    fn is_active(&self) -> bool {
        matches!(self.state, FieldState::Idle | FieldState::ShowingSuggestions)
    }

    fn hide(&mut self, now: Instant) {
        self.suggestions.clear();
        self.overlay.dismiss(now);
        if self.state == FieldState::ShowingSuggestions {
            self.state = FieldState::Idle;
        }
    }
}

struct FieldShared<I> {
    field_name: String,
    config: SuggestionConfig,
    manager: HistoryManager,
    input: I,
    inner: RwLock<FieldInner>,
    callbacks: RwLock<Callbacks>,
    in_callback: AtomicBool,
    mounted: AtomicBool,
    liveness: CancellationToken,
    pending_saves: Mutex<Vec<JoinHandle<()>>>,
}

/// Resets the re-entrancy flag when a callback returns or panics.
struct CallbackGuard<'a>(&'a AtomicBool);

impl Drop for CallbackGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A text input that suggests entries from its own search history.
///
/// Cheap to clone; clones share the same state.
///
/// # Example
///
/// ```ignore
/// let manager = HistoryManager::open_default().await?;
/// let field = SuggestionField::builder("product_search", manager, TextField::new())
///     .on_submitted(|query| println!("searching for {query}"))
///     .build()?;
/// field.mount();
/// ```
pub struct SuggestionField<I: TextInput> {
    shared: Arc<FieldShared<I>>,
}

impl<I: TextInput> Clone for SuggestionField<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I: TextInput> std::fmt::Debug for SuggestionField<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionField")
            .field("field_name", &self.shared.field_name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SuggestionField`].
pub struct SuggestionFieldBuilder<I: TextInput> {
    field_name: String,
    manager: HistoryManager,
    input: I,
    config: SuggestionConfig,
    callbacks: Callbacks,
}

impl<I: TextInput> SuggestionFieldBuilder<I> {
    pub fn config(mut self, config: SuggestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Called with the entry when the user picks a suggestion.
    pub fn on_selected(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.callbacks.on_selected = Some(Arc::new(f));
        self
    }

    /// Called with the trimmed text when the user submits.
    pub fn on_submitted(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.callbacks.on_submitted = Some(Arc::new(f));
        self
    }

    /// Validate the config and create the field in the `Loading` state.
    pub fn build(self) -> Result<SuggestionField<I>, ConfigError> {
        self.config.validate()?;

        let inner = FieldInner {
            state: FieldState::Loading,
            history: FieldHistory::new(self.config.max_history_items),
            query: String::new(),
            suggestions: Vec::new(),
            overlay: OverlayPresenter::new(&self.config),
        };

        Ok(SuggestionField {
            shared: Arc::new(FieldShared {
                field_name: self.field_name,
                config: self.config,
                manager: self.manager,
                input: self.input,
                inner: RwLock::new(inner),
                callbacks: RwLock::new(self.callbacks),
                in_callback: AtomicBool::new(false),
                mounted: AtomicBool::new(false),
                liveness: CancellationToken::new(),
                pending_saves: Mutex::new(Vec::new()),
            }),
        })
    }
}

impl<I: TextInput> SuggestionField<I> {
    /// Start building a field whose history is stored under `field_name`.
    pub fn builder(
        field_name: impl Into<String>,
        manager: HistoryManager,
        input: I,
    ) -> SuggestionFieldBuilder<I> {
        SuggestionFieldBuilder {
            field_name: field_name.into(),
            manager,
            input,
            config: SuggestionConfig::default(),
            callbacks: Callbacks::default(),
        }
    }

    /// Load the history in the background.
    ///
    /// The input stays read-only until the load resolves. If the field is
    /// disposed first, the result is dropped. Only the first call loads;
    /// later calls return a handle that completes immediately.
    pub fn mount(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        if shared.mounted.swap(true, Ordering::SeqCst) || shared.liveness.is_cancelled() {
            return tokio::spawn(async {});
        }
        shared.input.set_read_only(true);

        tokio::spawn(async move {
            let mode = shared.config.storage_type;
            let loaded = tokio::select! {
                _ = shared.liveness.cancelled() => None,
                entries = shared.manager.get_history(&shared.field_name, mode) => Some(entries),
            };
            let Some(entries) = loaded else {
                log::debug!("Field '{}' disposed before history loaded", shared.field_name);
                return;
            };
            if shared.liveness.is_cancelled() {
                return;
            }

            let field = SuggestionField { shared };
            field.finish_load(entries);
        })
    }

    fn finish_load(&self, entries: Vec<String>) {
        let shared = &self.shared;
        {
            let Ok(mut inner) = shared.inner.write() else {
                return;
            };
            if inner.state != FieldState::Loading {
                return;
            }
            inner.history = FieldHistory::from_entries(entries, shared.config.max_history_items);
            inner.state = FieldState::Idle;
            log::debug!(
                "Loaded {} history entries for '{}'",
                inner.history.len(),
                shared.field_name
            );
        }

        shared.input.set_read_only(false);
        if shared.input.has_focus() {
            self.evaluate(&shared.input.text(), Instant::now());
        } else if let Ok(mut inner) = shared.inner.write() {
            inner.query = shared.input.text();
        }
    }

    /// React to an event from the text input.
    pub fn handle_input(&self, event: InputEvent) {
        if self.is_disposed() {
            return;
        }
        let now = Instant::now();
        match event {
            InputEvent::Changed(text) => self.evaluate(&text, now),
            InputEvent::FocusChanged(true) => self.evaluate(&self.shared.input.text(), now),
            InputEvent::FocusChanged(false) => {
                if let Ok(mut inner) = self.shared.inner.write() {
                    inner.hide(now);
                }
                self.shared.input.unfocus();
            }
            InputEvent::Submitted => self.submit(now),
        }
    }

    /// React to an event from the overlay.
    pub fn handle_overlay(&self, event: OverlayEvent) {
        match event {
            OverlayEvent::Select(index) => self.select_suggestion(index),
            OverlayEvent::Remove(index) => {
                self.remove_suggestion(index);
            }
            OverlayEvent::DismissOutside => self.dismiss(),
        }
    }

    /// Recompute suggestions for `text` and show or hide the overlay.
    fn evaluate(&self, text: &str, now: Instant) {
        let config = &self.shared.config;
        let trimmed = text.trim();
        let eligible = config.enable_suggestions
            && config.filter_on_typing
            && self.shared.input.is_enabled()
            && trimmed.chars().count() >= config.min_chars_for_suggestions;

        let Ok(mut inner) = self.shared.inner.write() else {
            return;
        };
        inner.query = text.to_string();
        if !inner.is_active() {
            return;
        }
        if trimmed.is_empty() || !eligible {
            inner.hide(now);
            return;
        }

        let suggestions = filter_suggestions(trimmed, inner.history.entries());

        if suggestions.is_empty() {
            inner.hide(now);
        } else {
            inner.overlay.present(suggestions.clone(), now);
            inner.suggestions = suggestions;
            inner.state = FieldState::ShowingSuggestions;
        }
    }

    fn submit(&self, now: Instant) {
        let text = self.shared.input.text();
        let trimmed = text.trim();

        let save = {
            let Ok(mut inner) = self.shared.inner.write() else {
                return;
            };
            inner.hide(now);
            if inner.state == FieldState::Loading {
                log::debug!("Submit on '{}' before history loaded", self.shared.field_name);
                None
            } else if inner.history.insert_or_promote(trimmed) {
                Some(inner.history.to_vec())
            } else {
                None
            }
        };

        if let Some(entries) = save {
            self.persist(entries);
        }
        self.fire(CallbackKind::Submitted, trimmed);
    }

    /// Fill the input with the suggestion at `index` and report it.
    ///
    /// Ignored unless the overlay is shown. History is left untouched.
    pub fn select_suggestion(&self, index: usize) {
        let entry = {
            let Ok(mut inner) = self.shared.inner.write() else {
                return;
            };
            if !inner.is_active() || !inner.overlay.is_shown() {
                return;
            }
            let Some(entry) = inner.overlay.entries().get(index).cloned() else {
                return;
            };
            inner.query = entry.clone();
            inner.hide(Instant::now());
            entry
        };

        self.shared.input.set_text(&entry);
        self.shared.input.set_cursor(entry.chars().count());
        self.fire(CallbackKind::Selected, &entry);
    }

    /// Remove the suggestion at `index` from the history.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove_suggestion(&self, index: usize) -> bool {
        let entry = {
            let Ok(inner) = self.shared.inner.read() else {
                return false;
            };
            if !inner.overlay.is_shown() {
                return false;
            }
            match inner.overlay.entries().get(index) {
                Some(entry) => entry.clone(),
                None => return false,
            }
        };
        self.remove_entry(&entry)
    }

    /// Remove `entry` from the history and the current suggestions.
    ///
    /// The overlay is updated in place, or dismissed if nothing is left.
    /// Removing an entry that isn't in the history does nothing.
    pub fn remove_entry(&self, entry: &str) -> bool {
        let entries = {
            let Ok(mut inner) = self.shared.inner.write() else {
                return false;
            };
            if !inner.is_active() || !inner.history.remove(entry) {
                return false;
            }

            inner.suggestions.retain(|s| s != entry);
            if inner.suggestions.is_empty() {
                inner.hide(Instant::now());
            } else {
                let remaining = inner.suggestions.clone();
                inner.overlay.update(remaining);
            }
            inner.history.to_vec()
        };

        log::debug!("Removed history entry from '{}'", self.shared.field_name);
        self.persist(entries);
        true
    }

    /// Hide the overlay without touching focus or text.
    pub fn dismiss(&self) {
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.hide(Instant::now());
        }
    }

    /// Advance the overlay animation. Returns `true` while another frame is
    /// needed.
    pub fn tick(&self, now: Instant) -> bool {
        match self.shared.inner.write() {
            Ok(mut inner) => inner.overlay.tick(now),
            Err(_) => false,
        }
    }

    /// The overlay frame to draw within `viewport`, if any.
    pub fn overlay_view<R: ItemRenderer>(
        &self,
        viewport: Rect,
        now: Instant,
        renderer: &R,
    ) -> Option<OverlayView<R::Output>> {
        let anchor = self.shared.input.geometry();
        let inner = self.shared.inner.read().ok()?;
        inner
            .overlay
            .render(anchor, viewport, now, inner.query.trim(), renderer)
    }

    /// Scroll the suggestion list.
    pub fn scroll_overlay(&self, delta: f32) {
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.overlay.scroll_by(delta);
        }
    }

    /// Wait for every history write issued so far.
    pub async fn flush(&self) {
        let handles = match self.shared.pending_saves.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        for handle in handles {
            if let Err(e) = handle.await {
                log::warn!("History save task failed: {}", e);
            }
        }
    }

    /// Tear the field down.
    ///
    /// Cancels a pending load, removes the overlay immediately and drops the
    /// callbacks. Writes already issued still complete.
    pub fn dispose(&self) {
        if self.shared.liveness.is_cancelled() {
            return;
        }
        self.shared.liveness.cancel();
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.state = FieldState::Disposed;
            inner.suggestions.clear();
            inner.overlay.remove();
        }
        if let Ok(mut callbacks) = self.shared.callbacks.write() {
            *callbacks = Callbacks::default();
        }
        log::debug!("Disposed field '{}'", self.shared.field_name);
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.liveness.is_cancelled()
    }

    pub fn state(&self) -> FieldState {
        self.shared
            .inner
            .read()
            .map(|inner| inner.state)
            .unwrap_or(FieldState::Disposed)
    }

    /// History entries, most recent first.
    pub fn history(&self) -> Vec<String> {
        self.shared
            .inner
            .read()
            .map(|inner| inner.history.to_vec())
            .unwrap_or_default()
    }

    /// Entries currently suggested.
    pub fn suggestions(&self) -> Vec<String> {
        self.shared
            .inner
            .read()
            .map(|inner| inner.suggestions.clone())
            .unwrap_or_default()
    }

    /// Last text seen from the input.
    pub fn query(&self) -> String {
        self.shared
            .inner
            .read()
            .map(|inner| inner.query.clone())
            .unwrap_or_default()
    }

    pub fn overlay_phase(&self) -> OverlayPhase {
        self.shared
            .inner
            .read()
            .map(|inner| inner.overlay.phase())
            .unwrap_or_default()
    }

    pub fn field_name(&self) -> &str {
        &self.shared.field_name
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.shared.config
    }

    pub fn input(&self) -> &I {
        &self.shared.input
    }

    /// Write `entries` through the manager without blocking the caller.
    fn persist(&self, entries: Vec<String>) {
        let save = self.shared.manager.save_history(
            &self.shared.field_name,
            entries,
            self.shared.config.storage_type,
        );

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!(
                "No async runtime, history for '{}' kept in memory only",
                self.shared.field_name
            );
            return;
        };
        // Failures are logged by the manager.
        let handle = runtime.spawn(async move {
            let _ = save.await;
        });

        if let Ok(mut pending) = self.shared.pending_saves.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    fn fire(&self, kind: CallbackKind, value: &str) {
        let callback = self.shared.callbacks.read().ok().and_then(|callbacks| match kind {
            CallbackKind::Selected => callbacks.on_selected.clone(),
            CallbackKind::Submitted => callbacks.on_submitted.clone(),
        });
        let Some(callback) = callback else {
            return;
        };

        if self.shared.in_callback.swap(true, Ordering::SeqCst) {
            log::debug!("Suppressed nested callback on '{}'", self.shared.field_name);
            return;
        }
        let _guard = CallbackGuard(&self.shared.in_callback);
        callback(value);
    }
}
