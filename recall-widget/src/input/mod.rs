//! Text input primitive contract.
//!
//! The suggestion engine never talks to a toolkit widget directly. It drives
//! anything implementing [`TextInput`] and reacts to the [`InputEvent`]s the
//! host forwards from it. [`TextField`] is a toolkit-free implementation.

mod text_field;

pub use text_field::TextField;

use crate::geometry::Rect;

/// Events a text input reports to the suggestion engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The user edited the text; carries the new value.
    Changed(String),
    /// The user submitted the field (enter / search action).
    Submitted,
    /// The field gained (`true`) or lost (`false`) focus.
    FocusChanged(bool),
}

/// An editable text field the suggestion engine can drive.
///
/// Implementations are handles: methods take `&self` and the engine may call
/// them from a spawned task, so interior mutability and `Send + Sync` are
/// required. Cursor and selection positions are character offsets.
pub trait TextInput: Send + Sync + 'static {
    /// Current text value.
    fn text(&self) -> String;

    /// Replace the text and move the cursor to the end.
    ///
    /// Programmatic changes must not be reported back as
    /// [`InputEvent::Changed`].
    fn set_text(&self, text: &str);

    /// Move the cursor, clamped to the text length. Clears any selection.
    fn set_cursor(&self, position: usize);

    /// Selected range as `(start, end)` with `start < end`, if any.
    fn selection(&self) -> Option<(usize, usize)>;

    /// Whether the host has enabled the field.
    fn is_enabled(&self) -> bool;

    /// Block or allow user edits without disabling the field.
    fn set_read_only(&self, read_only: bool);

    /// Whether the field currently has input focus.
    fn has_focus(&self) -> bool;

    /// Give up input focus.
    fn unfocus(&self);

    /// The field's current on-screen bounds, or `None` before layout.
    fn geometry(&self) -> Option<Rect>;
}

/// Keys understood by [`TextField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    /// No modifier held.
    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}
