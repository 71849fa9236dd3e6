//! Suggestion row rendering.

use super::OverlayEvent;

/// Everything a renderer needs to draw one suggestion row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemContext<'a> {
    /// Position of the row in the suggestion list.
    pub index: usize,
    /// The history entry shown in this row.
    pub text: &'a str,
    /// The query the list was filtered with.
    pub query: &'a str,
    /// Event to send back when the row is tapped.
    pub on_select: OverlayEvent,
    /// Event to send back when the row's remove affordance is tapped, if
    /// removal is enabled.
    pub on_remove: Option<OverlayEvent>,
}

/// Turns suggestion rows into whatever the host toolkit draws.
///
/// A custom renderer fully replaces the default presentation; it still gets
/// the select and remove events for its row through [`ItemContext`].
///
/// # Example
///
/// ```
/// use recall_widget::overlay::{ItemContext, ItemRenderer};
///
/// struct Uppercase;
///
/// impl ItemRenderer for Uppercase {
///     type Output = String;
///
///     fn render(&self, cx: &ItemContext<'_>) -> String {
///         cx.text.to_uppercase()
///     }
/// }
/// ```
pub trait ItemRenderer {
    /// Rendered row type.
    type Output;

    /// Render one row.
    fn render(&self, cx: &ItemContext<'_>) -> Self::Output;
}

/// Default row: the entry text plus an optional remove affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionItem {
    pub text: String,
    pub on_tap: OverlayEvent,
    pub remove_button: Option<OverlayEvent>,
}

/// Renders [`SuggestionItem`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultItemRenderer;

impl ItemRenderer for DefaultItemRenderer {
    type Output = SuggestionItem;

    fn render(&self, cx: &ItemContext<'_>) -> SuggestionItem {
        SuggestionItem {
            text: cx.text.to_string(),
            on_tap: cx.on_select,
            remove_button: cx.on_remove,
        }
    }
}
