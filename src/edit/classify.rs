/*!
 * Recognition of edit payloads pasted into the clipboard
 *
 * Two shapes are understood, both introduced by a `// <path>` line that may
 * sit on a code-fence opening:
 *
 * ```text
 * // src/app.ts
 * <whole new file content>
 *
 * // src/app.ts
 * ------- SEARCH
 * <exact text to find>
 * =======
 * <replacement>
 * +++++++ REPLACE
 * ```
 */

use super::error::{EditError, EditResult};
use super::EditOperation;

/// Opens the text to search for
pub const SEARCH_MARKER: &str = "------- SEARCH";
/// Separates search text from its replacement
pub const SEPARATOR_MARKER: &str = "=======";
/// Closes the replacement
pub const REPLACE_MARKER: &str = "+++++++ REPLACE";

/// Payloads above this size are refused without being scanned
pub const MAX_PAYLOAD_BYTES: usize = 8 * 1024 * 1024;

const PATH_MARKER: &str = "//";
const FENCE_CHAR: char = '`';
const MIN_FENCE_LEN: usize = 3;

/// Header line of a recognized payload
#[derive(Debug, Clone, PartialEq, Eq)]
struct Header<'a> {
    path: &'a str,
    /// Length of the opening backtick run, zero when unfenced
    fence_len: usize,
    /// Everything after the header line
    body: &'a str,
}

/// Classify clipboard text
///
/// `Ok(None)` means the text is not an edit payload and must be left alone.
///
/// # Examples
/// ```
/// use ctxdump::edit::{classify, EditOperation};
///
/// let op = classify("// a.ts\nconsole.log(1)\n").unwrap();
/// assert_eq!(
///     op,
///     Some(EditOperation::WholeFile {
///         path: "a.ts".to_string(),
///         content: "console.log(1)\n".to_string(),
///     })
/// );
/// ```
pub fn classify(text: &str) -> EditResult<Option<EditOperation>> {
    if text.len() > MAX_PAYLOAD_BYTES {
        return Err(EditError::PayloadTooLarge {
            size: text.len(),
            limit: MAX_PAYLOAD_BYTES,
        });
    }

    let Some(header) = parse_header(text) else {
        return Ok(None);
    };
    // A bare header carries no content and must not truncate the target
    if header.body.trim().is_empty() {
        return Ok(None);
    }
    let path = header.path.to_string();

    if let Some((search, replace)) = split_search_replace(header.body) {
        if search.is_empty() {
            return Err(EditError::EmptySearch);
        }
        return Ok(Some(EditOperation::SearchReplace {
            path,
            search: search.to_string(),
            replace: replace.to_string(),
        }));
    }

    let content = if header.fence_len > 0 {
        strip_closing_fence(header.body, header.fence_len)
    } else {
        header.body.to_string()
    };
    if content.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(EditOperation::WholeFile { path, content }))
}

/// Find the first non-empty line and check it is a path header
fn parse_header(text: &str) -> Option<Header<'_>> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fence_len = backtick_run(trimmed);
        let marker_line = match fence_len {
            0 => trimmed,
            n if n >= MIN_FENCE_LEN => strip_language_tag(&trimmed[n..])?,
            _ => return None,
        };
        let path = marker_line.strip_prefix(PATH_MARKER)?.trim();
        if !looks_like_path(path) {
            return None;
        }

        return Some(Header {
            path,
            fence_len,
            body: &text[offset..],
        });
    }
    None
}

/// Drop an optional language tag from a fence opening, e.g. "ts // a.ts"
fn strip_language_tag(rest: &str) -> Option<&str> {
    let rest = rest.trim_start();
    if rest.starts_with(PATH_MARKER) {
        return Some(rest);
    }
    let (_, after_tag) = rest.split_once(char::is_whitespace)?;
    let after_tag = after_tag.trim_start();
    after_tag.starts_with(PATH_MARKER).then_some(after_tag)
}

/// Number of leading backticks on a line
fn backtick_run(line: &str) -> usize {
    line.chars().take_while(|&c| c == FENCE_CHAR).count()
}

/// Conservative path check that keeps ordinary comments from triggering
///
/// A token without a separator needs a file extension with at least one
/// letter, so `// e.g.` and `// v1.2` stay comments.
fn looks_like_path(path: &str) -> bool {
    if path.is_empty() || path.chars().any(char::is_whitespace) || path.contains("://") {
        return false;
    }
    if path.contains(['/', '\\']) {
        return true;
    }
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        !ext.is_empty()
            && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && ext.chars().any(|c| c.is_ascii_alphabetic())
    })
}

/// Locate the three markers in order; returns trimmed (search, replace)
fn split_search_replace(body: &str) -> Option<(&str, &str)> {
    let search_start = body.find(SEARCH_MARKER)? + SEARCH_MARKER.len();
    let separator_at = search_start + body[search_start..].find(SEPARATOR_MARKER)?;
    let replace_start = separator_at + SEPARATOR_MARKER.len();
    let replace_end = replace_start + body[replace_start..].find(REPLACE_MARKER)?;

    Some((
        body[search_start..separator_at].trim(),
        body[replace_start..replace_end].trim(),
    ))
}

/// Remove a trailing closing fence line from fenced content
///
/// The closing line is a run of backticks at least as long as the opening.
fn strip_closing_fence(body: &str, fence_len: usize) -> String {
    let mut lines: Vec<&str> = body.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|line| {
        let line = line.trim();
        line.len() >= fence_len && backtick_run(line) == line.len()
    }) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}
