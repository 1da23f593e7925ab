//! Name helpers for qualified type names, nested paths, and columns.

/// Separator between segments of a flattened nested attribute name.
pub const PATH_SEPARATOR: &str = "::";

/// Separator between segments of a flattened nested column name.
pub const COLUMN_SEPARATOR: &str = "_";

/// Returns the last segment of a qualified name.
///
/// Both `.` and `::` separate segments; generic arguments are left intact.
#[must_use]
pub fn simple_name(qualified: &str) -> &str {
    let head = qualified.split('<').next().unwrap_or(qualified);
    let dot = head.rfind('.').map(|i| i + 1);
    let colons = head.rfind("::").map(|i| i + 2);
    let start = dot.max(colons).unwrap_or(0);
    &qualified[start..]
}

/// Joins a nested owner path and an embedded member name (`owner::member`).
#[must_use]
pub fn nested_path(owner: &str, member: &str) -> String {
    format!("{owner}{PATH_SEPARATOR}{member}")
}

/// Joins a nested owner path and an embedded column (`owner_column`).
///
/// Any `::` in the owner path is flattened to `_` as well.
#[must_use]
pub fn nested_column(owner: &str, column: &str) -> String {
    format!(
        "{}{COLUMN_SEPARATOR}{column}",
        owner.replace(PATH_SEPARATOR, COLUMN_SEPARATOR)
    )
}

/// Splits a comma-separated name list, trimming and dropping empty entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
