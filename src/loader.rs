//! Running programs stored in `.bf` files.

use std::fs;
use std::path::Path;

use crate::error::InterpreterError;
use crate::interpreter::{ExecutionSummary, Interpreter};
use crate::sanitize::sanitize;

pub const SOURCE_EXTENSION: &str = "bf";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("FilePathError: cannot run code from a file that does not have the extension .bf")]
    WrongExtension,

    #[error("FilePathError: brainfuck file does not contain any code to execute.")]
    Empty,

    #[error("failed to read code file as UTF-8: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),
}

/// Check the extension and read the file, rejecting files with no code after sanitization.
pub fn load_source(path: &Path) -> Result<String, LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(LoadError::WrongExtension);
    }

    let source = fs::read_to_string(path)?;
    if sanitize(&source)?.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(source)
}

/// Load a `.bf` file and execute it on `bf`.
pub fn execute_from_path(
    bf: &mut Interpreter,
    path: &Path,
    guard_rails: bool,
) -> Result<ExecutionSummary, LoadError> {
    let source = load_source(path)?;
    Ok(bf.execute(&source, guard_rails)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxErrorKind;
    use crate::interpreter::InterpreterConfig;
    use std::io::Write;

    fn source_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut tf = tempfile::Builder::new().suffix(suffix).tempfile().expect("tempfile");
        write!(tf, "{}", content).unwrap();
        tf
    }

    fn small() -> Interpreter {
        Interpreter::with_config(InterpreterConfig { memory_capacity: 16, integer_limit: 256 }).unwrap()
    }

    #[test]
    fn rejects_other_extensions() {
        let tf = source_file(".txt", "+");
        let result = execute_from_path(&mut small(), tf.path(), false);
        assert!(matches!(result, Err(LoadError::WrongExtension)));
    }

    #[test]
    fn rejects_comment_only_files() {
        let tf = source_file(".bf", "// just a note\n/* and another */\n");
        let result = execute_from_path(&mut small(), tf.path(), false);
        assert!(matches!(result, Err(LoadError::Empty)));
    }

    #[test]
    fn syntax_errors_surface_before_running() {
        let tf = source_file(".bf", "+ /* open");
        let result = execute_from_path(&mut small(), tf.path(), false);
        assert!(matches!(
            result,
            Err(LoadError::Interpreter(InterpreterError::Syntax { kind: SyntaxErrorKind::UnendedComment, .. }))
        ));
    }

    #[test]
    fn runs_file_contents() {
        let tf = source_file(".bf", "+++ // three\n> ++ /* two */\n");
        let mut bf = small();
        let summary = execute_from_path(&mut bf, tf.path(), false).unwrap();
        assert!(!summary.produced_output());
        assert_eq!(&bf.memory()[..2], &[3, 2]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_source(Path::new("/definitely/not/here.bf"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
