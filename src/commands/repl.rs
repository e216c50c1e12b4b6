use std::io::{self, IsTerminal, Write};
use clap::Args;

use crate::config::{colors, env_flag, settings};
use crate::repl::{execute_bare_once, repl_loop, select_mode, ModeFlagOverride, ReplMode, Session};
use crate::Interpreter;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Start with guard rails on (toggle with :rails)
    #[arg(short = 'g', long = "guard-rails")]
    pub guard_rails: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        if self.bare {
            ModeFlagOverride::Bare
        } else if self.editor {
            ModeFlagOverride::Editor
        } else {
            ModeFlagOverride::None
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let defaults = settings();
    let guard_rails = args.guard_rails || env_flag("BF_GUARD_RAILS").unwrap_or(defaults.guard_rails);
    let bf = match Interpreter::with_config(defaults.interpreter) {
        Ok(bf) => bf,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };
    let mut session = Session::new(bf, guard_rails);

    match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("Brainfuck REPL (interactive editor mode)");
                eprintln!("The tape persists between runs; :reset clears it, :help lists meta commands.");
                eprintln!("Ctrl+d/Ctrl+z Enter (Windows) executes the current buffer. Press ctrl+c to exit");
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(&mut session, colors()) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }

            0
        }
        ReplMode::Bare => {
            // Bare mode: read stdin until EOF, run it as one script, exit 0
            match execute_bare_once(&mut session) {
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("{program}: REPL error: {e}");
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a Brainfuck REPL (read-eval-print loop)

Options:
  --help,   -h          Show this help
  --bare                Force non-interactive bare mode
  --editor              Force interactive editor mode (errors if stdin is not a TTY)
  --guard-rails, -g     Start with guard rails on

Description:
  Starts a REPL where you can enter Brainfuck code and execute it live.
  One tape is shared by every submission until :reset.

Meta commands (line starts with ":")
  :exit                   Exit immediately (code 0)
  :help                   Show meta command help
  :reset                  Zero the tape and move the pointer to cell 1
  :dump [WIDTH] [OFFSET]  Print WIDTH cells starting at OFFSET to stdout
  :rails                  Toggle guard rails

Notes:
    - Comments (// and /* */) and whitespace are ignored.
    - Ctrl+D executes the current buffer on *nix/macOS.
    - Ctrl+Z and Enter will execute the current buffer on Windows.
    - Ctrl+C exits the REPL immediately.
    - The REPL will exit after a single execution if the environment variable `BF_REPL_ONCE` is set to `1`.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BF_REPL_MODE=bare|editor overrides auto-detection.
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * In bare mode stdin is read to EOF and run as a script; lines starting with ":" are meta commands.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
