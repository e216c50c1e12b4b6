use std::env;
use std::io::{self, IsTerminal, Read, Write};
use reedline::{Signal, DefaultPrompt, DefaultPromptSegment, HistoryItem, Highlighter, StyledText};
use nu_ansi_term::Style;
use crate::cli_util::{self, render_memory};
use crate::config::Colors;
use crate::Interpreter;

const DEFAULT_DUMP_WIDTH: usize = 10;

/// One interpreter shared by every submission of a REPL session.
///
/// The tape is not cleared between submissions; `:reset` does that.
pub struct Session {
    bf: Interpreter,
    guard_rails: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Help,
    Reset,
    Dump { width: usize, offset: usize },
    Rails,
}

/// Parse a `:command` line. Returns `None` when the line is not a meta command.
pub fn parse_meta(line: &str) -> Option<Result<MetaCommand, String>> {
    let rest = line.trim().strip_prefix(':')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");

    let parsed = match name {
        "exit" | "quit" => Ok(MetaCommand::Exit),
        "help" => Ok(MetaCommand::Help),
        "reset" => Ok(MetaCommand::Reset),
        "rails" => Ok(MetaCommand::Rails),
        "dump" => {
            let mut number = |what: &str, default: usize| match parts.next() {
                None => Ok(default),
                Some(raw) => raw.parse::<usize>().map_err(|_| format!(":dump {what} must be a number, got '{raw}'")),
            };
            number("width", DEFAULT_DUMP_WIDTH)
                .and_then(|width| number("offset", 0).map(|offset| MetaCommand::Dump { width, offset }))
        }
        other => Err(format!("unknown meta command ':{other}' (try :help)")),
    };
    Some(parsed)
}

impl Session {
    pub fn new(bf: Interpreter, guard_rails: bool) -> Self {
        Self { bf, guard_rails }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.bf
    }

    pub fn guard_rails(&self) -> bool {
        self.guard_rails
    }

    /// Run one submission: either a meta command or a program.
    pub fn submit(&mut self, submission: &str) -> Flow {
        let trimmed = submission.trim();
        if trimmed.is_empty() {
            return Flow::Continue;
        }

        match parse_meta(trimmed) {
            Some(Ok(cmd)) => self.apply_meta(cmd),
            Some(Err(msg)) => {
                eprintln!("repl: {msg}");
                let _ = io::stderr().flush();
                Flow::Continue
            }
            None => {
                self.execute_buffer(submission);
                Flow::Continue
            }
        }
    }

    pub fn apply_meta(&mut self, cmd: MetaCommand) -> Flow {
        match cmd {
            MetaCommand::Exit => return Flow::Exit,
            MetaCommand::Help => print_meta_help(),
            MetaCommand::Reset => {
                self.bf.reset();
                eprintln!("tape cleared");
            }
            MetaCommand::Rails => {
                self.guard_rails = !self.guard_rails;
                eprintln!("guard rails {}", if self.guard_rails { "on" } else { "off" });
            }
            MetaCommand::Dump { width, offset } => {
                println!("{}", render_memory(&self.bf, width, offset));
                let _ = io::stdout().flush();
            }
        }
        let _ = io::stderr().flush();
        Flow::Continue
    }

    /// Executes a single program against the session tape.
    /// - Program output goes to stdout, followed by a newline when anything was printed.
    /// - Errors and the "no output" note go to stderr.
    fn execute_buffer(&mut self, buffer: &str) {
        match self.bf.execute(buffer, self.guard_rails) {
            Ok(summary) if summary.produced_output() => println!(),
            Ok(_) => cli_util::print_no_output_note(),
            Err(err) => {
                // A fault may land after some output; keep the prompt at column 0.
                println!();
                cli_util::print_interpreter_error(None, buffer, &err);
            }
        }
        let _ = io::stdout().flush();
    }
}

fn print_meta_help() {
    eprintln!(
        r#"Meta commands (line starts with ":")
  :exit                   Exit immediately (code 0)
  :help                   Show this help
  :reset                  Zero the tape and move the pointer to cell 1
  :dump [WIDTH] [OFFSET]  Show WIDTH cells starting at OFFSET (default 10, 0)
  :rails                  Toggle guard rails (clamp/wrap instead of failing)"#
    );
}

pub fn repl_loop(session: &mut Session, colors: &Colors) -> io::Result<()> {
    let mut editor = init_line_editor(colors)?;

    loop {
        let submission = read_submission_interactive(&mut editor)?;
        let Some(submission) = submission else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        if session.submit(&submission) == Flow::Exit {
            return Ok(());
        }

        // Test hook: if BF_REPL_ONCE=1, exit after one execution
        if env::var("BF_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

fn init_line_editor(colors: &Colors) -> io::Result<reedline::Reedline> {
    use reedline::{
        default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
    };

    // Start from default emacs-like bindings and adjust:
    // - Enter -> InsertNewLine (do not submit)
    // - Ctrl+D -> AcceptLine (submit)
    // - Ctrl+Z -> AcceptLine (submit, for Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);

    // Alt+Up/Alt+Down or Ctrl+Up/Ctrl+Down to navigate history items.
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(ProgramHighlighter::from_colors(colors)))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

/// Collect all of `stdin` until EOF. `None` when nothing was read.
pub fn read_submission<R: Read>(stdin: &mut R) -> Option<String> {
    let mut buffer = String::new();
    if stdin.read_to_string(&mut buffer).is_err() || buffer.is_empty() {
        return None;
    }
    Some(buffer)
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bf".to_string()), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // One history item per submitted buffer
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

/// Split a piped script into program chunks and meta command lines, in order.
///
/// Consecutive non-meta lines form one program; a meta line ends the current program.
pub fn split_script(script: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut program = String::new();

    for line in script.lines() {
        if line.trim_start().starts_with(':') {
            if !program.trim().is_empty() {
                chunks.push(std::mem::take(&mut program));
            }
            program.clear();
            chunks.push(line.trim().to_string());
        } else {
            program.push_str(line);
            program.push('\n');
        }
    }
    if !program.trim().is_empty() {
        chunks.push(program);
    }
    chunks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !io::stdin().is_terminal() {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BF_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Ok(val) = env::var("BF_REPL_MODE") {
        let v = val.trim().to_ascii_lowercase();
        return match v.as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !io::stdin().is_terminal() {
                    return Err("cannot start editor: stdin is not a TTY (use BF_REPL_MODE=bare)".to_string());
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!("invalid BF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if io::stdin().is_terminal() {
        Ok(ReplMode::Editor)
    } else {
        Ok(ReplMode::Bare)
    }
}

/// Read stdin to EOF and run it as a script of programs and meta commands.
pub fn execute_bare_once(session: &mut Session) -> io::Result<()> {
    let mut locked = io::stdin().lock();
    let Some(script) = read_submission(&mut locked) else {
        return Ok(());
    };
    drop(locked);

    for chunk in split_script(&script) {
        if session.submit(&chunk) == Flow::Exit {
            break;
        }
    }
    Ok(())
}

struct ProgramHighlighter {
    map_move: Style,
    map_plus: Style,
    map_minus: Style,
    map_dot: Style,
    map_comma: Style,
    map_bracket: Style,
    map_other: Style,
}

impl ProgramHighlighter {
    fn from_colors(c: &Colors) -> Self {
        Self {
            map_move: Style::new().fg(c.op_move).bold(),
            map_plus: Style::new().fg(c.op_inc).bold(),
            map_minus: Style::new().fg(c.op_dec).bold(),
            map_dot: Style::new().fg(c.op_output).bold(),
            map_comma: Style::new().fg(c.op_input).bold(),
            map_bracket: Style::new().fg(c.op_bracket).bold(),
            map_other: Style::new().fg(c.comment).italic(),
        }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        match ch {
            '>' | '<' => self.map_move,
            '+' => self.map_plus,
            '-' => self.map_minus,
            '.' => self.map_dot,
            ',' => self.map_comma,
            '[' | ']' => self.map_bracket,
            _ => self.map_other,
        }
    }
}

impl Highlighter for ProgramHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out: StyledText = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = self.style_for(ch);

            match current_style {
                Some(s) if s == style => buffer.push(ch),
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current_style = Some(style);
                    buffer.push(ch);
                }
                None => {
                    current_style = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}
