//! A guard-railed Brainfuck interpreter library.
//!
//! Programs run against a persistent tape of bounded integer cells
//! (32,768 cells under a limit of 256 by default) with a single data pointer.
//!
//! Features and behaviors:
//! - `//` line comments and `/* */` block comments are stripped before running.
//! - Pointer moves off the tape, increments past the integer limit and
//!   decrements below zero are errors, unless guard rails are on, in which
//!   case they clamp or wrap.
//! - Input `,` reads exactly one character (code point up to 255).
//! - Output `.` prints the current cell, which must be in 32..=255.
//! - `[` always enters its body; `]` repeats while the cell is non-zero.
//! - Tape and pointer survive across [`Interpreter::execute`] calls.
//!
//! Quick start:
//!
//! ```no_run
//! use railbf::Interpreter;
//!
//! let code = "++++++++[>+++++++++<-]>. // prints 'H'";
//! let mut bf = Interpreter::new();
//! bf.execute(code, false).expect("program should run");
//! println!();
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod loader;
pub mod repl;
pub mod sanitize;

pub use error::{ConfigError, Direction, FaultKind, InputErrorKind, InterpreterError, SyntaxErrorKind};
pub use interpreter::{ExecutionSummary, Interpreter, InterpreterConfig, StepControl};
pub use loader::{execute_from_path, LoadError};
pub use sanitize::sanitize;
