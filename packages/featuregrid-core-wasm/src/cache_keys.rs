// Utility functions to generate consistent page cache keys for feature
// stores across the application.

/// Generate a consistent key for a paged request: "start_limit_sort".
/// An empty sort field is normalized so that "no sort" always maps to the
/// same key regardless of how the caller spelled it.
pub fn make_page_key(start: u32, limit: u32, sort: &str) -> String {
    let sort = normalize_sort(sort);
    if sort.is_empty() {
        format!("{}_{}", start, limit)
    } else {
        format!("{}_{}_{}", start, limit, sort)
    }
}

fn normalize_sort(sort: &str) -> &str {
    sort.trim()
}
