use std::io::{self, Write};
use nu_ansi_term::Style;
use crate::config::{colors, Colors};
use crate::error::{InterpreterError, SyntaxErrorKind};
use crate::interpreter::Interpreter;
use crate::loader::LoadError;
use crate::sanitize::strip;

const COMMENT_HINT: &str = "If this is meant to be a comment, precede the line with two forward slashes (//), \
or enclose text in /* and */ for a multi-line comment.";

/// Pretty-print an [`InterpreterError`] with a caret under the offending instruction.
/// If `program` is `Some("bf")`, prefix messages with "bf: ..." for CLI run mode.
pub fn print_interpreter_error(program: Option<&str>, code: &str, err: &InterpreterError) {
    let palette = colors();
    let header = format_header(program, err);
    eprintln!("{}", palette.error.paint(header));

    // Positions index into the comment- and whitespace-free code.
    let clean = strip(code);
    if let Some(pos) = err.position() {
        print_error_with_context(&clean, pos - 1);
    }

    if let InterpreterError::Syntax { kind, .. } = err {
        match kind {
            SyntaxErrorKind::InvalidCharacter(_) => {
                eprintln!("\n{}", palette.hint.paint(COMMENT_HINT));
            }
            SyntaxErrorKind::MissingTerminator { snippet } => {
                eprintln!("\nSnippet is shown below:\n\n{}", palette.snippet.paint(snippet));
            }
            _ => {}
        }
    }
    let _ = io::stderr().flush();
}

pub fn print_load_error(program: Option<&str>, code: Option<&str>, err: &LoadError) {
    match (err, code) {
        (LoadError::Interpreter(inner), Some(code)) => print_interpreter_error(program, code, inner),
        _ => {
            let msg = prefix_program(program, &err.to_string());
            eprintln!("{}", colors().error.paint(msg));
            let _ = io::stderr().flush();
        }
    }
}

/// Informational note for a run that finished without printing anything.
pub fn print_no_output_note() {
    eprintln!("{}", colors().info.paint("No output provided."));
    let _ = io::stderr().flush();
}

fn format_header(program: Option<&str>, err: &InterpreterError) -> String {
    let body = match err.position() {
        Some(pos) => format!("{}: at position {pos} - {}", err.kind(), err.detail()),
        None => err.to_string(),
    };
    prefix_program(program, &body)
}

fn prefix_program(program: Option<&str>, msg: &str) -> String {
    match program {
        Some(p) => format!("{p}: {msg}"),
        None => msg.to_string(),
    }
}

/// Print a short window of `code` around the 0-based char index `pos`,
/// with a caret underneath. Positions past the end point just after the code.
pub fn print_error_with_context(code: &str, pos: usize) {
    let (slice, caret) = context_window(code, pos);
    eprintln!("  {slice}");
    eprintln!("  {caret}");
}

fn context_window(code: &str, pos: usize) -> (String, String) {
    const WINDOW_CHARS: usize = 32;

    let chars: Vec<char> = code.chars().collect();
    let start = pos.saturating_sub(WINDOW_CHARS).min(chars.len());
    let end = (pos + WINDOW_CHARS + 1).min(chars.len());

    let slice: String = chars[start..end].iter().collect();
    let mut caret = " ".repeat(pos - start);
    caret.push('^');
    (slice, caret)
}

/// Render `width` cells starting at `offset` as `[v]` blocks, zero cells in
/// the "empty" color and others in the "nonzero" color. When the pointer is
/// inside the window a `v (N)` marker sits above its cell, `N` being 1-based.
pub fn render_memory(bf: &Interpreter, width: usize, offset: usize) -> String {
    render_memory_with(bf, width, offset, colors())
}

pub fn render_memory_with(bf: &Interpreter, width: usize, offset: usize, palette: &Colors) -> String {
    let memory = bf.memory();
    let start = offset.min(memory.len());
    let end = start.saturating_add(width).min(memory.len());

    let mut marker_col = None;
    let mut col = 0;
    let mut cells = String::new();
    for (idx, value) in memory[start..end].iter().enumerate() {
        let text = format!("[{value}]");
        if start + idx == bf.pointer() {
            // Put the marker over the value, one column in from the bracket.
            marker_col = Some(col + 1);
        }
        col += text.chars().count();
        let color = if *value == 0 { palette.cell_empty } else { palette.cell_nonzero };
        cells.push_str(&color.paint(text).to_string());
    }

    let marker = match marker_col {
        Some(c) => format!(
            "{}{} ({})",
            " ".repeat(c),
            Style::new().fg(palette.pointer).paint("v"),
            bf.pointer() + 1
        ),
        None => format!("pointer at {} (outside cells {}..={})", bf.pointer() + 1, start + 1, end),
    };

    format!("{marker}\n{cells}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::InterpreterConfig;

    fn plain() -> Colors {
        use nu_ansi_term::Color;
        let mut c = Colors::default();
        c.cell_empty = Color::Default;
        c.cell_nonzero = Color::Default;
        c.pointer = Color::Default;
        c
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut in_escape = false;
        for ch in s.chars() {
            match (in_escape, ch) {
                (false, '\u{1b}') => in_escape = true,
                (true, 'm') => in_escape = false,
                (true, _) => {}
                (false, c) => out.push(c),
            }
        }
        out
    }

    #[test]
    fn header_includes_kind_and_position() {
        let err = InterpreterError::SubZero { position: 3 };
        assert_eq!(
            format_header(Some("bf"), &err),
            "bf: SubZeroError: at position 3 - cannot decrement memory block past 0."
        );
    }

    #[test]
    fn context_window_places_caret() {
        let (slice, caret) = context_window("++a++", 2);
        assert_eq!(slice, "++a++");
        assert_eq!(caret, "  ^");
    }

    #[test]
    fn context_window_past_end() {
        let (slice, caret) = context_window("[+", 2);
        assert_eq!(slice, "[+");
        assert_eq!(caret, "  ^");
    }

    #[test]
    fn memory_view_marks_pointer() {
        let mut bf = Interpreter::with_config(InterpreterConfig { memory_capacity: 8, integer_limit: 256 }).unwrap();
        bf.execute("+>++>", false).unwrap();
        let view = strip_ansi(&render_memory_with(&bf, 4, 0, &plain()));
        let mut lines = view.lines();
        assert_eq!(lines.next(), Some("       v (3)"));
        assert_eq!(lines.next(), Some("[1][2][0][0]"));
    }

    #[test]
    fn memory_view_reports_pointer_outside_window() {
        let mut bf = Interpreter::with_config(InterpreterConfig { memory_capacity: 8, integer_limit: 256 }).unwrap();
        bf.execute(">>>>>>", false).unwrap();
        let view = strip_ansi(&render_memory_with(&bf, 3, 0, &plain()));
        assert!(view.starts_with("pointer at 7"));
        assert!(view.ends_with("[0][0][0]"));
    }

    #[test]
    fn memory_view_clamps_to_capacity() {
        let bf = Interpreter::with_config(InterpreterConfig { memory_capacity: 2, integer_limit: 256 }).unwrap();
        let view = strip_ansi(&render_memory_with(&bf, 10, 0, &plain()));
        assert!(view.ends_with("[0][0]"));
    }
}
