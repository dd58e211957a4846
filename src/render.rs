//! Plain-text rendering of query results.

use std::fmt::Display;

/// Render a ranked list, one numbered line per item.
///
/// Example output:
/// ```text
/// Most expensive launches
///  1. 2017-01-01 rocket_0 from VAFB to Low Earth Orbit (successful, 999999999)
///  2. 2017-06-01 rocket_0 from VAFB to Medium Earth Orbit (successful, 99999999)
/// ```
pub fn render_ranking<T: Display>(title: &str, items: &[T]) -> String {
    let mut output = String::new();
    output.push_str(title);
    output.push('\n');

    if items.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    let width = items.len().to_string().len();
    for (i, item) in items.iter().enumerate() {
        output.push_str(&format!("{:>width$}. {}\n", i + 1, item, width = width + 1));
    }
    output
}

/// Render a single answer under a heading.
pub fn render_answer(title: &str, answer: &str) -> String {
    format!("{}\n  {}\n", title, answer)
}
