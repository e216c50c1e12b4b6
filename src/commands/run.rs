use clap::Args;
use std::path::Path;
use std::thread;
use std::io::{self, Write};
use std::sync::{mpsc, Arc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use crate::{ExecutionSummary, Interpreter, InterpreterConfig, InterpreterError, StepControl};
use crate::cli_util::{print_interpreter_error, print_load_error, print_no_output_note, render_memory};
use crate::config::{env_flag, settings};
use crate::loader::load_source;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Clamp pointer moves, wrap increments, and stop decrements at zero instead of failing
    #[arg(short = 'g', long = "guard-rails")]
    pub guard_rails: bool,

    /// Run the `.bf` file at PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Number of tape cells (default from config, else 32768)
    #[arg(long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Exclusive ceiling for cell values (default from config, else 256)
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<u32>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Print WIDTH tape cells after the run (default 10)
    #[arg(long = "dump", value_name = "WIDTH", num_args = 0..=1, default_missing_value = "10")]
    pub dump: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

type RunOutcome = (Result<ExecutionSummary, InterpreterError>, Interpreter);

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        guard_rails,
        file,
        code,
        capacity,
        limit,
        timeout_ms,
        max_steps,
        dump,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    // Resolve settings: flags -> env -> config file -> defaults
    let defaults = settings();
    let config = InterpreterConfig {
        memory_capacity: capacity.unwrap_or(defaults.interpreter.memory_capacity),
        integer_limit: limit.unwrap_or(defaults.interpreter.integer_limit),
    };
    let guard_rails = guard_rails || env_flag("BF_GUARD_RAILS").unwrap_or(defaults.guard_rails);
    let timeout_ms = timeout_ms
        .or_else(|| std::env::var("BF_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()));
    let max_steps = max_steps
        .or_else(|| std::env::var("BF_MAX_STEPS").ok().and_then(|s| s.parse::<u64>().ok()));

    let bf = match Interpreter::with_config(config) {
        Ok(bf) => bf,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let code_str = match file {
        Some(path) => match load_source(Path::new(&path)) {
            Ok(s) => s,
            Err(e) => {
                print_load_error(Some(program), None, &e);
                return 1;
            }
        },
        None => code.join(""),
    };

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<RunOutcome>();
    let program_owned = code_str.clone();
    let cancel_clone = cancel.clone();

    thread::spawn(move || {
        let mut bf = bf;
        let max_steps = max_steps.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
        let ctrl = StepControl::new(max_steps, cancel_clone);
        let res = bf.execute_with_control(&program_owned, guard_rails, ctrl);
        let _ = tx.send((res, bf));
    });

    let received = match timeout_ms {
        Some(ms) => rx.recv_timeout(Duration::from_millis(ms)),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    let (exit_code, finished) = match received {
        Ok((Ok(summary), bf)) => {
            if summary.produced_output() {
                // For readability, ensure output ends with a newline
                println!();
            } else {
                print_no_output_note();
            }
            (0, Some(bf))
        }
        Ok((Err(InterpreterError::Canceled), bf)) => {
            eprintln!("Execution aborted: wall-clock timeout exceeded ({} ms)", timeout_ms.unwrap_or(0));
            let _ = io::stderr().flush();
            (1, Some(bf))
        }
        Ok((Err(err @ InterpreterError::StepLimitExceeded { .. }), bf)) => {
            println!();
            eprintln!("{err}");
            let _ = io::stderr().flush();
            (1, Some(bf))
        }
        Ok((Err(err), bf)) => {
            println!();
            print_interpreter_error(Some(program), &code_str, &err);
            (1, Some(bf))
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({} ms)", timeout_ms.unwrap_or(0));
            let _ = io::stderr().flush();
            (1, None)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => (1, None),
    };

    if let (Some(width), Some(bf)) = (dump, finished.as_ref()) {
        println!("{}", render_memory(bf, width, 0));
    }

    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH.bf>

Options:
  --file,  -f <PATH>    Run the .bf file at PATH instead of positional "<code>"
  --guard-rails, -g     Clamp/wrap instead of failing on bounds, overflow and sub-zero faults
  --capacity <N>        Number of tape cells (default 32768)
  --limit <N>           Exclusive ceiling for cell values (default 256)
  --timeout <MS>        Abort after MS milliseconds (fallback BF_TIMEOUT_MS)
  --max-steps <N>       Abort after N instructions (fallback BF_MAX_STEPS)
  --dump[=WIDTH]        Print the first WIDTH tape cells after the run (default 10)
  --help,  -h           Show this help

Notes:
- `//` starts a line comment; `/* ... */` encloses a block comment. Whitespace is ignored.
- Input (`,`) reads one line from stdin that must hold exactly one character.
- Output (`.`) only prints cells in the range 32 to 255.
- Any other character outside ><+-.,[] is a syntax error.

Examples:
- Run a program from a file:
    {0} run --file ./program.bf
- Keep going past tape edges and wrap cell values:
    {0} run -g "-<+++."
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
