//! Source cleanup and structural validation.
//!
//! [`sanitize`] turns raw program text into the bare instruction string the
//! interpreter scans. Passes run in a fixed order:
//!
//! 1. `//` line comments are removed up to (not including) the newline,
//! 2. whitespace (space, tab, `\n`, `\r`) is removed,
//! 3. `/* ... */` block comments are removed, each one ending at the nearest `*/`,
//! 4. any surviving `/*` or `*/` is reported as an unended comment,
//! 5. `[` and `]` counts must match.
//!
//! Line comments go first because they end at a newline, which step 2 erases.
//!
//! The bracket check compares counts only. `]+[` passes here and fails in the
//! interpreter when the stray `]` is reached.
//!
//! Characters outside the instruction set are left in place; the interpreter
//! reports them with their position.

use crate::error::{InterpreterError, SyntaxErrorKind};

/// Strip comments and whitespace from `source` and validate comment and loop structure.
pub fn sanitize(source: &str) -> Result<String, InterpreterError> {
    let code = strip_chars(source);

    if let Some(idx) = find_stray_comment_marker(&code) {
        return Err(InterpreterError::Syntax {
            position: idx + 1,
            kind: SyntaxErrorKind::UnendedComment,
        });
    }

    if let Some(idx) = find_unbalanced_bracket(&code) {
        return Err(InterpreterError::Syntax {
            position: idx + 1,
            kind: SyntaxErrorKind::UnterminatedLoops,
        });
    }

    Ok(code.into_iter().collect())
}

/// Steps 1 to 3 only: comments and whitespace removed, nothing validated.
///
/// Fault positions from [`sanitize`] and from the interpreter index into this
/// string, so diagnostics use it to show context.
pub fn strip(source: &str) -> String {
    strip_chars(source).into_iter().collect()
}

fn strip_chars(source: &str) -> Vec<char> {
    let without_line_comments = strip_line_comments(source);
    let compact: Vec<char> = without_line_comments
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect();
    strip_block_comments(&compact)
}

fn strip_line_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            // Drop everything up to the newline; the newline goes in the whitespace pass.
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }
        out.push(c);
    }

    out
}

fn strip_block_comments(chars: &[char]) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if is_marker(chars, i, '/', '*') {
            if let Some(close) = (i + 2..chars.len()).find(|&j| is_marker(chars, j, '*', '/')) {
                i = close + 2;
                continue;
            }
            // Unclosed: keep the rest verbatim so the stray-marker scan reports it.
            out.extend_from_slice(&chars[i..]);
            break;
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn find_stray_comment_marker(chars: &[char]) -> Option<usize> {
    (0..chars.len()).find(|&i| is_marker(chars, i, '/', '*') || is_marker(chars, i, '*', '/'))
}

/// Index of the first bracket left unpaired, but only when `[` and `]` counts differ.
fn find_unbalanced_bracket(chars: &[char]) -> Option<usize> {
    let mut open: Vec<usize> = Vec::new();
    let mut stray_close: Vec<usize> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '[' => open.push(i),
            ']' => {
                if open.pop().is_none() {
                    stray_close.push(i);
                }
            }
            _ => {}
        }
    }

    if open.len() == stray_close.len() {
        return None;
    }

    match (open.first(), stray_close.first()) {
        (Some(&o), Some(&c)) => Some(o.min(c)),
        (Some(&o), None) => Some(o),
        (None, Some(&c)) => Some(c),
        (None, None) => None,
    }
}

#[inline]
fn is_marker(chars: &[char], i: usize, first: char, second: char) -> bool {
    chars.get(i) == Some(&first) && chars.get(i + 1) == Some(&second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_kind(result: Result<String, InterpreterError>) -> (usize, SyntaxErrorKind) {
        match result {
            Err(InterpreterError::Syntax { position, kind }) => (position, kind),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn strips_line_comment_and_whitespace() {
        assert_eq!(sanitize("++ // comment\n--").unwrap(), "++--");
    }

    #[test]
    fn empty_line_comment_is_removed() {
        assert_eq!(sanitize("+//\n+").unwrap(), "++");
    }

    #[test]
    fn strips_block_comments_across_lines() {
        let src = "+ /* first\n line */ > /* second */ <";
        assert_eq!(sanitize(src).unwrap(), "+><");
    }

    #[test]
    fn block_comment_ends_at_nearest_close() {
        assert_eq!(sanitize("/* a */+/* b */").unwrap(), "+");
    }

    #[test]
    fn empty_block_comment_is_removed() {
        assert_eq!(sanitize("+/**/-").unwrap(), "+-");
    }

    #[test]
    fn unmatched_comment_open_reports_position() {
        let (position, kind) = syntax_kind(sanitize("++/* never closed"));
        assert_eq!(kind, SyntaxErrorKind::UnendedComment);
        assert_eq!(position, 3);
    }

    #[test]
    fn stray_comment_close_reports_position() {
        let (position, kind) = syntax_kind(sanitize("+*/"));
        assert_eq!(kind, SyntaxErrorKind::UnendedComment);
        assert_eq!(position, 2);
    }

    #[test]
    fn unbalanced_brackets_fail() {
        let (position, kind) = syntax_kind(sanitize("[+"));
        assert_eq!(kind, SyntaxErrorKind::UnterminatedLoops);
        assert_eq!(position, 1);
    }

    #[test]
    fn extra_close_bracket_fails_at_close() {
        let (position, _) = syntax_kind(sanitize("+[]]"));
        assert_eq!(position, 4);
    }

    #[test]
    fn misordered_but_counted_brackets_pass() {
        assert_eq!(sanitize("]+[").unwrap(), "]+[");
    }

    #[test]
    fn unknown_characters_survive() {
        assert_eq!(sanitize("+a+").unwrap(), "+a+");
    }

    #[test]
    fn sanitize_is_a_fixed_point() {
        let src = "++++ // set up\n[ > ++ /* body */ < - ]\r\n\t>.";
        let once = sanitize(src).unwrap();
        let twice = sanitize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_keeps_stray_markers_for_diagnostics() {
        assert_eq!(strip("+ /* open"), "+/*open");
    }

    #[test]
    fn comment_only_source_is_empty() {
        assert_eq!(sanitize("// nothing\n/* here */\n").unwrap(), "");
    }
}
