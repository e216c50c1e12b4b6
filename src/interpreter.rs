//! The execution engine.
//!
//! An [`Interpreter`] owns a tape of bounded integer cells and a data
//! pointer. Both persist across [`Interpreter::execute`] calls, so a program
//! run after another sees the tape exactly as the previous one left it. Build
//! a separate interpreter (or call [`Interpreter::reset`]) when runs must be
//! isolated.
//!
//! Execution is a single left-to-right scan. `[` pushes its position and
//! always enters the body; `]` jumps back to the most recent `[` while the
//! current cell is non-zero and pops it otherwise.
//!
//! With guard rails on, pointer moves clamp to the tape, increments wrap at
//! the integer limit and decrements stop at zero. Input and output checks are
//! strict either way.

use std::io::{self, BufRead, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{ConfigError, Direction, InputErrorKind, InterpreterError, SyntaxErrorKind};
use crate::sanitize::sanitize;

pub const DEFAULT_MEMORY_CAPACITY: usize = 32_768;
pub const DEFAULT_INTEGER_LIMIT: u32 = 256;

/// Lowest and highest cell values `.` will print.
pub const PRINTABLE_RANGE: std::ops::RangeInclusive<u32> = 32..=255;

/// Tape size and per-cell ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub memory_capacity: usize,
    /// Cells hold values in `0..integer_limit`.
    pub integer_limit: u32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            integer_limit: DEFAULT_INTEGER_LIMIT,
        }
    }
}

impl InterpreterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_capacity == 0 {
            return Err(ConfigError::ZeroCapacity(self.memory_capacity));
        }
        if self.integer_limit < 2 {
            return Err(ConfigError::IntegerLimitTooSmall(self.integer_limit));
        }
        Ok(())
    }
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Characters sent to the output sink.
    pub output_count: usize,
    /// Instructions executed, counting each loop iteration.
    pub steps: usize,
}

impl ExecutionSummary {
    pub fn produced_output(&self) -> bool {
        self.output_count > 0
    }
}

type OutputSink = Box<dyn FnMut(char) + Send>;
type InputProvider = Box<dyn FnMut() -> io::Result<String> + Send>;

pub struct Interpreter {
    memory: Vec<u32>,
    pointer: usize,
    integer_limit: u32,
    output_sink: Option<OutputSink>,
    input_provider: Option<InputProvider>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with 32,768 zeroed cells and an integer limit of 256.
    pub fn new() -> Self {
        Self::from_valid_config(InterpreterConfig::default())
    }

    /// Create an interpreter with a custom tape size and integer limit.
    pub fn with_config(config: InterpreterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: InterpreterConfig) -> Self {
        Self {
            memory: vec![0; config.memory_capacity],
            pointer: 0,
            integer_limit: config.integer_limit,
            output_sink: None,
            input_provider: None,
        }
    }

    /// Provide an output sink. When set, `.` sends characters here instead of stdout.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(char) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, `,` takes its token from here instead of stdin.
    ///
    /// Each call must yield one token; anything other than a single character
    /// is an input error.
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> io::Result<String> + Send + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    pub fn memory(&self) -> &[u32] {
        &self.memory
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    pub fn integer_limit(&self) -> u32 {
        self.integer_limit
    }

    /// Value under the data pointer.
    pub fn cell(&self) -> u32 {
        self.memory[self.pointer]
    }

    /// Zero the tape and move the pointer back to cell 0.
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.pointer = 0;
    }

    /// Sanitize and run `code` against the current tape.
    ///
    /// Returns an [`ExecutionSummary`] on success or the first fault hit.
    pub fn execute(&mut self, code: &str, guard_rails: bool) -> Result<ExecutionSummary, InterpreterError> {
        self.run(code, guard_rails, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn execute_with_control(
        &mut self,
        code: &str,
        guard_rails: bool,
        step_control: StepControl,
    ) -> Result<ExecutionSummary, InterpreterError> {
        self.run(code, guard_rails, Some(&step_control))
    }

    fn run(
        &mut self,
        code: &str,
        guard_rails: bool,
        step_control: Option<&StepControl>,
    ) -> Result<ExecutionSummary, InterpreterError> {
        let code = sanitize(code)?;
        let chars: Vec<char> = code.chars().collect();
        let code_len = chars.len();

        let mut code_ptr = 0;
        let mut loop_starts: Vec<usize> = Vec::new();
        let mut summary = ExecutionSummary::default();

        while code_ptr < code_len {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(InterpreterError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if summary.steps >= max {
                        return Err(InterpreterError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let position = code_ptr + 1;

            match chars[code_ptr] {
                '>' => {
                    if self.pointer + 1 >= self.memory.len() {
                        if !guard_rails {
                            return Err(InterpreterError::OutOfBounds {
                                position,
                                pointer: self.pointer,
                                direction: Direction::Right,
                            });
                        }
                        self.pointer = self.memory.len() - 1;
                    } else {
                        self.pointer += 1;
                    }
                }
                '<' => {
                    if self.pointer == 0 {
                        if !guard_rails {
                            return Err(InterpreterError::OutOfBounds {
                                position,
                                pointer: self.pointer,
                                direction: Direction::Left,
                            });
                        }
                    } else {
                        self.pointer -= 1;
                    }
                }
                '+' => {
                    let after = self.memory[self.pointer] + 1;
                    if after >= self.integer_limit {
                        if !guard_rails {
                            return Err(InterpreterError::Overflow { position, limit: self.integer_limit });
                        }
                        self.memory[self.pointer] = after % self.integer_limit;
                    } else {
                        self.memory[self.pointer] = after;
                    }
                }
                '-' => {
                    if self.memory[self.pointer] == 0 {
                        if !guard_rails {
                            return Err(InterpreterError::SubZero { position });
                        }
                    } else {
                        self.memory[self.pointer] -= 1;
                    }
                }
                '[' => {
                    loop_starts.push(code_ptr);
                }
                ']' => {
                    let Some(&open_index) = loop_starts.last() else {
                        return Err(InterpreterError::Syntax {
                            position,
                            kind: SyntaxErrorKind::UnexpectedTerminator,
                        });
                    };
                    if self.memory[self.pointer] != 0 {
                        // The advance below lands on the first instruction of the body.
                        code_ptr = open_index;
                    } else {
                        loop_starts.pop();
                    }
                }
                ',' => {
                    let value = self.read_input(position)?;
                    self.memory[self.pointer] = value;
                }
                '.' => {
                    let value = self.memory[self.pointer];
                    if !PRINTABLE_RANGE.contains(&value) {
                        return Err(InterpreterError::Input {
                            position,
                            kind: InputErrorKind::Unprintable { value },
                        });
                    }
                    self.emit(char::from(value as u8));
                    summary.output_count += 1;
                }
                other => {
                    return Err(InterpreterError::Syntax {
                        position,
                        kind: SyntaxErrorKind::InvalidCharacter(other),
                    });
                }
            }

            summary.steps += 1;
            code_ptr += 1;
        }

        if let Some(&open_index) = loop_starts.last() {
            return Err(InterpreterError::Syntax {
                position: open_index + 1,
                kind: SyntaxErrorKind::MissingTerminator {
                    snippet: chars[open_index..].iter().collect(),
                },
            });
        }

        Ok(summary)
    }

    /// Fetch one token and validate it as a cell value.
    fn read_input(&mut self, position: usize) -> Result<u32, InterpreterError> {
        let token = match self.input_provider.as_mut() {
            Some(provider) => provider(),
            None => read_stdin_token(),
        }
        .map_err(|source| InterpreterError::Io { position, source })?;

        let mut chars = token.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(InterpreterError::Input {
                position,
                kind: InputErrorKind::WrongLength { received: token },
            });
        };

        let value = u32::from(ch);
        if value > 255 {
            return Err(InterpreterError::Input { position, kind: InputErrorKind::OutOfRange { ch } });
        }
        if value >= self.integer_limit {
            return Err(InterpreterError::Input {
                position,
                kind: InputErrorKind::ExceedsLimit { ch, limit: self.integer_limit },
            });
        }

        Ok(value)
    }

    fn emit(&mut self, ch: char) {
        if let Some(sink) = self.output_sink.as_mut() {
            sink(ch);
        } else {
            let mut stdout = io::stdout().lock();
            let _ = write!(stdout, "{ch}");
            let _ = stdout.flush();
        }
    }
}

/// Read one line from stdin without its line ending. EOF yields an empty token.
fn read_stdin_token() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
