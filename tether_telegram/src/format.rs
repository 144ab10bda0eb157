/// Maximum characters in one Telegram text message.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Split `text` into pieces of at most `max_chars` characters, never inside
/// a UTF-8 sequence. A piece ends at the last newline it contains when there
/// is one, so paragraphs survive where possible.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some((cut, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_string());
            break;
        };
        let end = rest[..cut].rfind('\n').filter(|&i| i > 0).map_or(cut, |i| i + 1);
        chunks.push(rest[..end].to_string());
        rest = &rest[end..];
    }

    chunks
}

/// Turn lines fully wrapped in `*asterisks*` into `> quotes`; models use the
/// former for stage directions.
#[must_use]
pub fn asterisk_to_quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.len() > 1 && trimmed.starts_with('*') && trimmed.ends_with('*') {
                format!("> {}", trimmed.trim_matches('*').trim())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", 4096), ["hello"]);
        assert!(split_message("", 4096).is_empty());
    }

    #[test]
    fn long_text_splits_on_char_boundaries() {
        let text = "é".repeat(10);
        let chunks = split_message(&text, 4);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn split_prefers_line_breaks() {
        let chunks = split_message("abc\ndefgh", 6);
        assert_eq!(chunks, ["abc\n", "defgh"]);
    }

    #[test]
    fn telegram_limit_is_respected() {
        let text = "x".repeat(TELEGRAM_MESSAGE_LIMIT * 2 + 1);
        let chunks = split_message(&text, TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "x");
    }

    #[test]
    fn starred_lines_become_quotes() {
        let text = "*sighs*\nI guess.\n  *looks away*  \n*";
        assert_eq!(
            asterisk_to_quote(text),
            "> sighs\nI guess.\n> looks away\n*"
        );
    }
}
