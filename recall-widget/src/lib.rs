//! Search field with history suggestions
//!
//! A toolkit-agnostic suggestion engine: it wraps any [`TextInput`],
//! remembers what the user submitted through a shared
//! [`recall_lib::HistoryManager`], and presents matching entries in an
//! animated overlay below the input.

pub mod config;
pub mod field;
pub mod geometry;
pub mod input;
pub mod overlay;
pub mod transitions;

pub use config::{ConfigError, SuggestionConfig};
pub use field::{FieldState, SuggestionField, SuggestionFieldBuilder};
pub use geometry::Rect;
pub use input::{InputEvent, TextField, TextInput};
pub use overlay::{OverlayEvent, OverlayPhase, OverlayPresenter};
