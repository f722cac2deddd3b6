const FENCE: &str = "```";

/// Returns the trimmed inner text of the last complete triple-backtick
/// fenced block in `text`, or the trimmed full input when no block exists.
///
/// Models sometimes emit a draft block before a final corrected one, so
/// when several blocks are present the last one wins. A missing fence is
/// never an error: the caller gets the raw text back.
pub fn extract_fenced_block(text: &str) -> &str {
    let mut cursor = 0;
    let mut last_block: Option<&str> = None;

    while let Some(offset) = text[cursor..].find(FENCE) {
        let open = cursor + offset + FENCE.len();
        let Some(close_offset) = text[open..].find(FENCE) else {
            // Dangling opening fence; whatever we matched so far stands.
            break;
        };
        let close = open + close_offset;
        last_block = Some(strip_language_tag(&text[open..close]));
        cursor = close + FENCE.len();
    }

    last_block.unwrap_or(text).trim()
}

/// Drops an optional language tag (`json`, `markdown`, ...) directly after
/// the opening fence. Only a single word terminated by a newline counts; a
/// block whose first line is payload is left intact.
fn strip_language_tag(inner: &str) -> &str {
    let Some((first_line, rest)) = inner.split_once('\n') else {
        return inner;
    };
    let tag = first_line.trim_end_matches('\r');
    if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || "_+-.".contains(c)) {
        rest
    } else {
        inner
    }
}
