/// Categories every account starts with.
pub(crate) const DEFAULT_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Bills",
    "Shopping",
    "Entertainment",
    "Health",
    "Other",
];

/// Find a category by name (case-insensitive) in a slice.
pub(crate) fn find_by_name<'a>(categories: &'a [String], name: &str) -> Option<&'a String> {
    let lower = name.trim().to_lowercase();
    categories.iter().find(|c| c.to_lowercase() == lower)
}
