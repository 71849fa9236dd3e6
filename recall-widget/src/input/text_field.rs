//! Toolkit-free text field.

use std::sync::{Arc, RwLock};

use unicode_width::UnicodeWidthStr;

use super::{InputEvent, Key, Modifiers, TextInput};
use crate::geometry::Rect;

#[derive(Debug)]
struct TextFieldInner {
    text: String,
    /// Cursor position (char offset).
    cursor: usize,
    /// Selection anchor. When Some and != cursor, text is selected.
    anchor: Option<usize>,
    enabled: bool,
    read_only: bool,
    focused: bool,
    geometry: Option<Rect>,
}

impl Default for TextFieldInner {
    fn default() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            anchor: None,
            enabled: true,
            read_only: false,
            focused: false,
            geometry: None,
        }
    }
}

impl TextFieldInner {
    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.anchor.and_then(|a| {
            if a != self.cursor {
                Some((a.min(self.cursor), a.max(self.cursor)))
            } else {
                None
            }
        })
    }

    /// Remove the selected text. Returns true if anything was selected.
    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        let start_byte = char_to_byte_index(&self.text, start);
        let end_byte = char_to_byte_index(&self.text, end);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = start;
        self.anchor = None;
        true
    }

    fn insert_char(&mut self, c: char) {
        self.delete_selection();
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor - 1);
        self.text.remove(byte_pos);
        self.cursor -= 1;
        true
    }

    fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.char_count() {
            return false;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
        true
    }

    fn move_cursor(&mut self, target: usize, extend_selection: bool) {
        if extend_selection {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = target.min(self.char_count());
    }
}

/// A single-line editable text field.
///
/// Implements [`TextInput`] so a suggestion field can drive it, and turns
/// key presses into [`InputEvent`]s via [`TextField::handle_key`]. Clones
/// share the same state.
///
/// # Example
///
/// ```
/// use recall_widget::input::{InputEvent, Key, Modifiers, TextField};
///
/// let field = TextField::new();
/// assert_eq!(
///     field.handle_key(Key::Char('a'), Modifiers::new()),
///     Some(InputEvent::Changed("a".into()))
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextField {
    inner: Arc<RwLock<TextFieldInner>>,
}

impl TextField {
    /// Create an empty, enabled field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field with initial text, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let field = Self::new();
        field.set_text(&text.into());
        field
    }

    /// Apply a key press.
    ///
    /// Returns the event to forward to the suggestion engine, or `None` when
    /// the key only moved the cursor, changed nothing, or the field is
    /// disabled or read-only.
    pub fn handle_key(&self, key: Key, modifiers: Modifiers) -> Option<InputEvent> {
        let Ok(mut guard) = self.inner.write() else {
            return None;
        };
        if !guard.enabled || guard.read_only {
            return None;
        }

        let changed = match key {
            Key::Char('a') if modifiers.ctrl => {
                if !guard.text.is_empty() {
                    guard.anchor = Some(0);
                    guard.cursor = guard.char_count();
                }
                false
            }
            Key::Char(c) if modifiers.none() || (modifiers.shift && !modifiers.ctrl) => {
                guard.insert_char(c);
                true
            }
            Key::Backspace if modifiers.none() => guard.delete_back(),
            Key::Delete if modifiers.none() => guard.delete_forward(),
            Key::Left if !modifiers.ctrl => {
                match guard.selection() {
                    Some((start, _)) if !modifiers.shift => guard.move_cursor(start, false),
                    _ => {
                        let target = guard.cursor.saturating_sub(1);
                        guard.move_cursor(target, modifiers.shift);
                    }
                }
                false
            }
            Key::Right if !modifiers.ctrl => {
                match guard.selection() {
                    Some((_, end)) if !modifiers.shift => guard.move_cursor(end, false),
                    _ => {
                        let target = guard.cursor + 1;
                        guard.move_cursor(target, modifiers.shift);
                    }
                }
                false
            }
            Key::Home if !modifiers.ctrl => {
                guard.move_cursor(0, modifiers.shift);
                false
            }
            Key::End if !modifiers.ctrl => {
                let end = guard.char_count();
                guard.move_cursor(end, modifiers.shift);
                false
            }
            Key::Enter => return Some(InputEvent::Submitted),
            _ => false,
        };

        changed.then(|| InputEvent::Changed(guard.text.clone()))
    }

    /// Take focus. Returns the event to forward if focus changed.
    pub fn focus(&self) -> Option<InputEvent> {
        let mut guard = self.inner.write().ok()?;
        if guard.focused || !guard.enabled {
            return None;
        }
        guard.focused = true;
        Some(InputEvent::FocusChanged(true))
    }

    /// Lose focus, e.g. because the user tabbed away. Returns the event to
    /// forward if focus changed.
    pub fn blur(&self) -> Option<InputEvent> {
        let mut guard = self.inner.write().ok()?;
        if !guard.focused {
            return None;
        }
        guard.focused = false;
        guard.anchor = None;
        Some(InputEvent::FocusChanged(false))
    }

    /// Enable or disable the field. Disabling also drops focus.
    pub fn set_enabled(&self, enabled: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.enabled = enabled;
            if !enabled {
                guard.focused = false;
            }
        }
    }

    /// Whether user edits are currently blocked.
    pub fn is_read_only(&self) -> bool {
        self.inner.read().map(|guard| guard.read_only).unwrap_or(true)
    }

    /// Record the field's laid-out bounds (called by the host after layout).
    pub fn set_geometry(&self, rect: Rect) {
        if let Ok(mut guard) = self.inner.write() {
            guard.geometry = Some(rect);
        }
    }

    /// Forget the field's bounds, e.g. when it scrolls out of view.
    pub fn clear_geometry(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.geometry = None;
        }
    }

    /// Cursor position (char offset).
    pub fn cursor(&self) -> usize {
        self.inner.read().map(|guard| guard.cursor).unwrap_or(0)
    }

    /// Display column of the cursor, accounting for wide characters.
    pub fn cursor_column(&self) -> usize {
        self.inner
            .read()
            .map(|guard| {
                let byte_pos = char_to_byte_index(&guard.text, guard.cursor);
                guard.text[..byte_pos].width()
            })
            .unwrap_or(0)
    }
}

impl TextInput for TextField {
    fn text(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        if let Ok(mut guard) = self.inner.write() {
            guard.text = text.to_string();
            guard.cursor = guard.char_count();
            guard.anchor = None;
        }
    }

    fn set_cursor(&self, position: usize) {
        if let Ok(mut guard) = self.inner.write() {
            guard.move_cursor(position, false);
        }
    }

    fn selection(&self) -> Option<(usize, usize)> {
        self.inner.read().ok().and_then(|guard| guard.selection())
    }

    fn is_enabled(&self) -> bool {
        self.inner.read().map(|guard| guard.enabled).unwrap_or(false)
    }

    fn set_read_only(&self, read_only: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.read_only = read_only;
        }
    }

    fn has_focus(&self) -> bool {
        self.inner.read().map(|guard| guard.focused).unwrap_or(false)
    }

    fn unfocus(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.focused = false;
            guard.anchor = None;
        }
    }

    fn geometry(&self) -> Option<Rect> {
        self.inner.read().ok().and_then(|guard| guard.geometry)
    }
}

/// Convert character index to byte index in a string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
