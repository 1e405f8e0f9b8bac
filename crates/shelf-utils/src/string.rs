/// Turn a display name into a URL-safe slug.
///
/// Lowercases ASCII letters, spells `&` as `and`, and collapses every run of
/// other characters into a single `-`. Leading and trailing separators are
/// dropped.
///
/// # Examples
///
/// ```
/// use shelf_utils::string::slugify;
///
/// assert_eq!(slugify("Storage & State"), "storage-and-state");
/// assert_eq!(slugify("  React Native Reanimated "), "react-native-reanimated");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            push_word(&mut slug, &mut pending_separator, |s| {
                s.push(c.to_ascii_lowercase())
            });
        } else if c == '&' {
            pending_separator = true;
            push_word(&mut slug, &mut pending_separator, |s| s.push_str("and"));
            pending_separator = true;
        } else {
            pending_separator = true;
        }
    }

    slug
}

fn push_word<F: FnOnce(&mut String)>(slug: &mut String, pending: &mut bool, write: F) {
    if *pending && !slug.is_empty() {
        slug.push('-');
    }
    *pending = false;
    write(slug);
}

/// Check that `slug` is lowercase ASCII words joined by single dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
