//! ANSI escape handling for console echo.

use std::borrow::Cow;

/// Strip ANSI escape sequences from text.
///
/// Handles CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL|ST`), charset
/// designation and two-byte escapes; anything else after `ESC` is dropped
/// together with the `ESC`.
#[must_use]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('[') => {
                chars.next();
                while let Some(param) = chars.next() {
                    if param.is_ascii_alphabetic() || param == '@' || param == '`' || param == '~' {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(osc) = chars.next() {
                    if osc == '\x07' {
                        break;
                    }
                    if osc == '\x1b' {
                        if chars.peek() == Some(&'\\') {
                            chars.next();
                        }
                        break;
                    }
                }
            }
            Some('(' | ')' | '*' | '+') => {
                chars.next();
                chars.next();
            }
            Some(next) if next.is_ascii_uppercase() || next == '=' || next == '>' => {
                chars.next();
            }
            _ => {}
        }
    }

    Cow::Owned(result)
}

/// Reduce a raw console line to something worth logging.
///
/// Escape sequences and control characters are removed and whitespace is
/// trimmed; `None` when nothing printable is left.
#[must_use]
pub fn printable_line(raw: &str) -> Option<String> {
    let stripped = strip_ansi(raw);
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
