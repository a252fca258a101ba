//! Tokenizer (component D).
//!
//! Two entry points, for the two shapes a caller hands us (§4.2). Most callers (a program's own
//! `argv`) already come pre-split, so [`tokenize`] just tracks which already-delimited argument the
//! completion cursor falls inside and the prefix typed so far. A shell completion hook instead hands
//! a single raw command line, so [`split_command_line`]/[`locate_line_cursor`] do the actual
//! splitting: whitespace separates tokens, a single or double quote groups characters verbatim until
//! the matching close quote, and a mismatched quote consumes to end of input. No backslash escaping.

/// One raw argument together with its position in the original argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub index: usize,
}

/// The result of tokenizing under completion mode (§4.5).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionCursor {
    /// Index into the token list of the argument the cursor is inside of, if any. `None` means the
    /// cursor is past the last argument (a fresh, empty word).
    pub token_index: Option<usize>,
    /// The text already typed at the cursor, from the start of that argument up to the cursor.
    pub prefix: String,
}

/// Tokenize `args`. When `comp_index` is `Some`, it is treated as a position in a conceptual,
/// space-joined command line (as shells like bash report `COMP_POINT`); the matching token and
/// partially-typed prefix are returned alongside.
pub fn tokenize(args: &[String], comp_index: Option<usize>) -> (Vec<Token>, Option<CompletionCursor>) {
    let tokens: Vec<Token> = args
        .iter()
        .enumerate()
        .map(|(index, text)| Token {
            text: text.clone(),
            index,
        })
        .collect();

    let cursor = comp_index.map(|pos| locate_cursor(args, pos));
    (tokens, cursor)
}

fn locate_cursor(args: &[String], pos: usize) -> CompletionCursor {
    let mut offset = 0usize;
    for (i, arg) in args.iter().enumerate() {
        let start = offset;
        let end = start + arg.chars().count();
        if pos >= start && pos <= end {
            let typed: String = arg.chars().take(pos - start).collect();
            return CompletionCursor {
                token_index: Some(i),
                prefix: typed,
            };
        }
        offset = end + 1; // account for the joining space
    }
    CompletionCursor {
        token_index: None,
        prefix: String::new(),
    }
}

/// Split `arg` on the first `=` into `(name, value)`, per the `name=value` inline syntax (§3.1
/// "Inline values", §4.3). Returns `None` if there is no `=`.
pub fn split_inline(arg: &str) -> Option<(&str, &str)> {
    arg.split_once('=')
}

/// One token recovered from a raw command line, with its byte-offset span in the original string.
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split `line` into tokens using the §4.2 minimal rule set: whitespace separates tokens; a
/// single or double quote groups characters verbatim until the matching closing quote; a
/// mismatched quote consumes to end of input. Quote characters themselves are stripped from the
/// returned text; backslash escaping is not interpreted.
pub fn split_command_line(line: &str) -> Vec<LineToken> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        while pos < bytes.len() && (bytes[pos] as char).is_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        let start = pos;
        let (text, end) = scan_token(line, start, line.len());
        tokens.push(LineToken { text, start, end });
        pos = end;
    }

    tokens
}

/// Scan one token starting at byte offset `start`, stopping no later than `limit`, and return its
/// quote-stripped text so far together with the byte offset reached (the next whitespace, `limit`,
/// or end of input, whichever comes first).
fn scan_token(line: &str, start: usize, limit: usize) -> (String, usize) {
    let bytes = line.as_bytes();
    let mut pos = start;
    let mut text = String::new();

    while pos < bytes.len() && pos < limit {
        let ch = bytes[pos] as char;
        if ch.is_whitespace() {
            break;
        }
        if ch == '\'' || ch == '"' {
            let quote = ch;
            pos += 1;
            match line[pos..].find(quote).map(|rel| pos + rel) {
                Some(close) if close < limit => {
                    text.push_str(&line[pos..close]);
                    pos = close + 1;
                }
                Some(close) => {
                    text.push_str(&line[pos..limit.min(close)]);
                    pos = limit;
                }
                None => {
                    let end = limit.min(bytes.len());
                    text.push_str(&line[pos..end]);
                    pos = end;
                }
            }
        } else {
            let rest = &line[pos..];
            let next_boundary = rest
                .char_indices()
                .find(|(_, c)| c.is_whitespace() || *c == '\'' || *c == '"')
                .map(|(i, _)| pos + i)
                .unwrap_or(bytes.len());
            let end = next_boundary.min(limit);
            text.push_str(&line[pos..end]);
            pos = end;
        }
    }

    (text, pos)
}

/// Locate the completion cursor at byte offset `pos` within a raw command line, per §4.2's
/// "completion cursor" extension: the token the cursor sits in (or a fresh word if the cursor is
/// past every token), and the quote-stripped prefix typed so far within it.
pub fn locate_line_cursor(line: &str, pos: usize) -> CompletionCursor {
    let tokens = split_command_line(line);
    for (index, token) in tokens.iter().enumerate() {
        if pos >= token.start && pos <= token.end {
            let (prefix, _) = scan_token(line, token.start, pos);
            return CompletionCursor {
                token_index: Some(index),
                prefix,
            };
        }
    }
    CompletionCursor {
        token_index: None,
        prefix: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_without_cursor() {
        let args = vec!["-v".to_owned(), "--out=x".to_owned()];
        let (tokens, cursor) = tokenize(&args, None);
        assert_eq!(tokens.len(), 2);
        assert!(cursor.is_none());
    }

    #[test]
    fn cursor_inside_second_token() {
        let args = vec!["-v".to_owned(), "--ou".to_owned()];
        // "-v --ou" -> cursor at position 7 (end of string, inside the second token)
        let (_tokens, cursor) = tokenize(&args, Some(7));
        let cursor = cursor.unwrap();
        assert_eq!(cursor.token_index, Some(1));
        assert_eq!(cursor.prefix, "--ou");
    }

    #[test]
    fn cursor_past_last_token_is_fresh_word() {
        let args = vec!["-v".to_owned()];
        let (_tokens, cursor) = tokenize(&args, Some(10));
        let cursor = cursor.unwrap();
        assert_eq!(cursor.token_index, None);
    }

    #[test]
    fn split_inline_value() {
        assert_eq!(split_inline("--out=file.txt"), Some(("--out", "file.txt")));
        assert_eq!(split_inline("--flag"), None);
    }

    #[test]
    fn split_command_line_groups_quoted_spaces() {
        let tokens = split_command_line("cmd -o 'a b' --name=\"c d\"");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["cmd", "-o", "a b", "--name=c d"]);
    }

    #[test]
    fn split_command_line_mismatched_quote_consumes_rest() {
        let tokens = split_command_line("cmd -o 'unterminated rest");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["cmd", "-o", "unterminated rest"]);
    }

    #[test]
    fn locate_line_cursor_inside_quoted_token() {
        let line = "cmd -o 'a b'";
        let cursor = locate_line_cursor(line, line.len() - 1);
        assert_eq!(cursor.token_index, Some(2));
        assert_eq!(cursor.prefix, "a b");
    }

    #[test]
    fn locate_line_cursor_past_end_is_fresh_word() {
        let line = "cmd --verbose ";
        let cursor = locate_line_cursor(line, line.len());
        assert_eq!(cursor.token_index, None);
        assert_eq!(cursor.prefix, "");
    }
}
