//! History filtering.

/// Filter a history against a query.
///
/// Keeps entries that contain the trimmed query case-insensitively, except
/// an entry equal to the query (ignoring case): offering the user exactly
/// what they already typed is noise. History order is preserved.
///
/// # Example
///
/// ```
/// use recall_widget::field::filter_suggestions;
///
/// let history = vec!["apples".to_string(), "apple pie".into(), "banana".into()];
/// assert_eq!(filter_suggestions("Apple", &history), vec!["apples", "apple pie"]);
/// ```
pub fn filter_suggestions(query: &str, history: &[String]) -> Vec<String> {
    let query = query.trim().to_lowercase();
    history
        .iter()
        .filter(|entry| {
            let entry = entry.to_lowercase();
            entry.contains(&query) && entry != query
        })
        .cloned()
        .collect()
}
