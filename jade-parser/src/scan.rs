//! Bracket- and string-aware scanning of embedded Rust fragments.

/// Scan `s`, calling `stop` for every character outside brackets, string
/// literals and char literals. Returns the byte index of the first character
/// for which `stop` returns true.
///
/// Closing brackets that would take the depth below zero are also offered
/// to `stop`.
pub(crate) fn scan_top_level(s: &str, mut stop: impl FnMut(usize, char) -> bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let mut escaped = false;
                for (_, c) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                if let Some(len) = char_literal_len(&s[i..]) {
                    while chars.peek().is_some_and(|(j, _)| *j < i + len) {
                        chars.next();
                    }
                } else if depth == 0 && stop(i, c) {
                    return Some(i);
                }
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    if stop(i, c) {
                        return Some(i);
                    }
                } else {
                    depth -= 1;
                }
            }
            _ => {
                if depth == 0 && stop(i, c) {
                    return Some(i);
                }
            }
        }
    }

    None
}

/// Byte length of a char literal at the start of `s` (`'a'`, `'\n'`),
/// or `None` when the quote does not start one.
fn char_literal_len(s: &str) -> Option<usize> {
    let first = s.get(1..)?.chars().next()?;
    if first == '\\' {
        let close = s.get(3..)?.find('\'')?;
        (close < 10).then_some(close + 4)
    } else {
        let after = 1 + first.len_utf8();
        s.get(after..)?.starts_with('\'').then_some(after + 1)
    }
}

/// Index of the bracket closing the one at the start of `s`.
pub(crate) fn find_closing(s: &str) -> Option<usize> {
    let closer = match s.chars().next()? {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    scan_top_level(&s[1..], |_, c| c == closer).map(|i| i + 1)
}

/// Split `s` at top-level occurrences of `sep`, trimming each piece.
/// An all-whitespace input yields no pieces.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut rest = s;
    while let Some(i) = scan_top_level(rest, |_, c| c == sep) {
        pieces.push(rest[..i].trim());
        rest = &rest[i + sep.len_utf8()..];
    }
    pieces.push(rest.trim());
    pieces
}

/// Read a quoted string at the start of `s`, returning its unescaped
/// content and the number of bytes consumed including both quotes.
pub(crate) fn read_quoted(s: &str) -> Option<(String, usize)> {
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut content = String::new();
    let mut escaped = false;

    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            content.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((content, i + 1));
        } else {
            content.push(c);
        }
    }

    None
}
