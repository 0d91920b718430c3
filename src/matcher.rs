/*!
 * Minimal glob matching used by project detection
 *
 * Only the shapes the rule table needs are supported: literal names,
 * `*.ext` suffixes and a single `*` wildcard. Anything richer is compared
 * literally.
 */

/// Return true when `name` matches `pattern`.
///
/// A `*` never crosses a path separator, and every pattern is anchored to
/// the whole name.
///
/// # Examples
/// ```
/// use ctxdump::matcher::matches;
///
/// assert!(matches("*.go", "main.go"));
/// assert!(!matches("*.go", "algorithm.gold"));
/// assert!(matches("Dockerfile", "Dockerfile"));
/// ```
pub fn matches(pattern: &str, name: &str) -> bool {
    if !is_supported_wildcard(pattern) {
        return pattern == name;
    }

    // Exactly one '*' from here on
    let Some((prefix, suffix)) = pattern.split_once('*') else {
        return pattern == name;
    };

    if name.len() < prefix.len() + suffix.len() {
        return false;
    }
    if !name.starts_with(prefix) || !name.ends_with(suffix) {
        return false;
    }

    let middle = &name[prefix.len()..name.len() - suffix.len()];
    !middle.contains(['/', '\\'])
}

/// Whether a pattern is something other than a literal name
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// A single `*` and no other glob syntax
fn is_supported_wildcard(pattern: &str) -> bool {
    pattern.matches('*').count() == 1 && !pattern.contains(['?', '[', ']', '{', '}'])
}
