//! Table rendering for CLI listings.

use std::fmt::Write as _;

/// One stored configuration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Container name.
    pub name: String,
    /// Format tag.
    pub format: String,
    /// Size of the raw configuration in bytes.
    pub size: usize,
}

/// Renders `items` as an aligned table with a header row.
#[must_use]
pub fn render_items(items: &[Item]) -> String {
    let name_width = items.iter().map(|i| i.name.len()).chain([4]).max().unwrap_or(4);
    let format_width = items.iter().map(|i| i.format.len()).chain([6]).max().unwrap_or(6);

    let mut out = String::new();
    let _ = writeln!(out, "{:<name_width$}  {:<format_width$}  SIZE", "NAME", "FORMAT");
    for item in items {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<format_width$}  {} B",
            item.name, item.format, item.size
        );
    }
    out
}
