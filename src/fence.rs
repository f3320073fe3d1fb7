//! Code fence selection for embedding arbitrary text in Markdown.

/// The character every fence is built from.
pub const FENCE_CHAR: char = '`';

const MIN_FENCE_LEN: usize = 3;

/// Returns a backtick fence that cannot be closed early by `content`.
///
/// The fence is one longer than the longest run of backticks found anywhere
/// in the content, and never shorter than three.
pub fn safe_fence(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;

    for c in content.chars() {
        if c == FENCE_CHAR {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    FENCE_CHAR
        .to_string()
        .repeat(MIN_FENCE_LEN.max(longest + 1))
}

/// True when converter output already opens with its own fence.
///
/// Leading whitespace is ignored; both backtick and tilde fences count.
pub fn is_prefenced(content: &str) -> bool {
    let trimmed = content.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Wraps `content` in a fenced block annotated with `hint`.
pub fn wrap_code_block(content: &str, hint: &str) -> String {
    let fence = safe_fence(content);
    format!("{fence}{hint}\n{content}\n{fence}\n")
}
