//! Suggestion field configuration

use std::time::Duration;

use recall_lib::{DEFAULT_MAX_HISTORY_ITEMS, StorageMode};
use serde::Deserialize;

/// Errors reported when validating a [`SuggestionConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `max_history_items` must be at least one.
    #[error("max_history_items must be greater than zero")]
    InvalidMaxHistoryItems,

    /// A size or margin is negative or not a finite number.
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidDimension {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Configuration for a suggestion field.
///
/// Every setting has a default and can be overridden on its own. Can also be
/// deserialized, with missing keys falling back to the defaults.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use recall_widget::SuggestionConfig;
/// use recall_lib::StorageMode;
///
/// let config = SuggestionConfig::default()
///     .with_max_history_items(20)
///     .with_storage_type(StorageMode::Temporary)
///     .with_animation_duration(Duration::from_millis(120));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Maximum entries kept in the field's history.
    ///
    /// Default: 50
    pub max_history_items: usize,

    /// Show a remove affordance next to each suggestion.
    ///
    /// Default: true
    pub show_remove_button: bool,

    /// Master switch for the suggestion overlay.
    ///
    /// Default: true
    pub enable_suggestions: bool,

    /// Filter the history against the typed text. When off, the whole
    /// history is offered.
    ///
    /// Default: true
    pub filter_on_typing: bool,

    /// Minimum trimmed characters before suggestions appear.
    ///
    /// Default: 1
    pub min_chars_for_suggestions: usize,

    /// Where the history is kept.
    ///
    /// Default: persistent
    pub storage_type: StorageMode,

    /// Height cap of the suggestion list; taller content scrolls.
    ///
    /// Default: 200
    pub max_suggestions_height: f32,

    /// Duration of the show/dismiss animation.
    ///
    /// Default: 200 ms
    #[serde(rename = "animation_duration_ms", with = "duration_ms")]
    pub animation_duration: Duration,

    /// Gap between the input's bottom edge and the list.
    ///
    /// Default: 4
    pub suggestion_box_margin: f32,

    /// Space kept free on the left and right of the list.
    ///
    /// Default: 16
    pub horizontal_margin: f32,

    /// Height of one suggestion row.
    ///
    /// Default: 48
    pub item_height: f32,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_history_items: DEFAULT_MAX_HISTORY_ITEMS,
            show_remove_button: true,
            enable_suggestions: true,
            filter_on_typing: true,
            min_chars_for_suggestions: 1,
            storage_type: StorageMode::Persistent,
            max_suggestions_height: 200.0,
            animation_duration: Duration::from_millis(200),
            suggestion_box_margin: 4.0,
            horizontal_margin: 16.0,
            item_height: 48.0,
        }
    }
}

impl SuggestionConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the history bound.
    pub fn with_max_history_items(mut self, max: usize) -> Self {
        self.max_history_items = max;
        self
    }

    /// Shows or hides the remove affordance.
    pub fn with_show_remove_button(mut self, show: bool) -> Self {
        self.show_remove_button = show;
        self
    }

    /// Enables or disables suggestions.
    pub fn with_enable_suggestions(mut self, enable: bool) -> Self {
        self.enable_suggestions = enable;
        self
    }

    /// Enables or disables filtering while typing.
    pub fn with_filter_on_typing(mut self, filter: bool) -> Self {
        self.filter_on_typing = filter;
        self
    }

    /// Sets the minimum query length.
    pub fn with_min_chars_for_suggestions(mut self, min: usize) -> Self {
        self.min_chars_for_suggestions = min;
        self
    }

    /// Sets the storage mode.
    pub fn with_storage_type(mut self, mode: StorageMode) -> Self {
        self.storage_type = mode;
        self
    }

    /// Sets the list height cap.
    pub fn with_max_suggestions_height(mut self, height: f32) -> Self {
        self.max_suggestions_height = height;
        self
    }

    /// Sets the animation duration.
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Sets the gap below the input.
    pub fn with_suggestion_box_margin(mut self, margin: f32) -> Self {
        self.suggestion_box_margin = margin;
        self
    }

    /// Sets the horizontal margin.
    pub fn with_horizontal_margin(mut self, margin: f32) -> Self {
        self.horizontal_margin = margin;
        self
    }

    /// Sets the row height.
    pub fn with_item_height(mut self, height: f32) -> Self {
        self.item_height = height;
        self
    }

    /// Check the config for values the field can't work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_items == 0 {
            return Err(ConfigError::InvalidMaxHistoryItems);
        }

        let dimensions = [
            ("max_suggestions_height", self.max_suggestions_height),
            ("suggestion_box_margin", self.suggestion_box_margin),
            ("horizontal_margin", self.horizontal_margin),
            ("item_height", self.item_height),
        ];
        for (name, value) in dimensions {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }

        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuggestionConfig::default();
        assert_eq!(config.max_history_items, 50);
        assert!(config.show_remove_button);
        assert!(config.enable_suggestions);
        assert!(config.filter_on_typing);
        assert_eq!(config.min_chars_for_suggestions, 1);
        assert_eq!(config.storage_type, StorageMode::Persistent);
        assert_eq!(config.max_suggestions_height, 200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let config = SuggestionConfig::default().with_max_history_items(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxHistoryItems));
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        let config = SuggestionConfig::default().with_item_height(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimension { name: "item_height", .. })
        ));

        let config = SuggestionConfig::default().with_max_suggestions_height(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let raw = r#"{
            "max_history_items": 10,
            "storage_type": "temporary",
            "animation_duration_ms": 90
        }"#;
        let config: SuggestionConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.max_history_items, 10);
        assert_eq!(config.storage_type, StorageMode::Temporary);
        assert_eq!(config.animation_duration, Duration::from_millis(90));
        assert_eq!(config.horizontal_margin, 16.0);
    }
}
