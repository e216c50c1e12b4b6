use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

use crate::interpreter::InterpreterConfig;

/// Colors used by diagnostics, the memory dump, and the REPL highlighter.
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub error: Color,
    pub hint: Color,
    pub snippet: Color,
    pub info: Color,

    pub cell_empty: Color,
    pub cell_nonzero: Color,
    pub pointer: Color,

    pub op_move: Color,     // '>' and '<'
    pub op_inc: Color,      // '+'
    pub op_dec: Color,      // '-'
    pub op_output: Color,   // '.'
    pub op_input: Color,    // ','
    pub op_bracket: Color,  // '[' and ']'
    pub comment: Color,
}

impl Default for Colors {
    fn default() -> Self {
        // Catppuccin Mocha
        Self {
            error: Color::Rgb(243, 139, 168),
            hint: Color::Rgb(137, 220, 235),
            snippet: Color::Rgb(137, 220, 235),
            info: Color::Rgb(249, 226, 175),

            cell_empty: Color::Rgb(166, 227, 161),
            cell_nonzero: Color::Rgb(243, 139, 168),
            pointer: Color::Rgb(137, 220, 235),

            op_move: Color::Rgb(148, 226, 213),
            op_inc: Color::Rgb(166, 227, 161),
            op_dec: Color::Rgb(243, 139, 168),
            op_output: Color::Rgb(249, 226, 175),
            op_input: Color::Rgb(250, 179, 135),
            op_bracket: Color::Rgb(203, 166, 247),
            comment: Color::Rgb(108, 112, 134),
        }
    }
}

/// Everything read from `railbf.toml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub interpreter: InterpreterConfig,
    pub guard_rails: bool,
    pub colors: Colors,
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Settings from the user's config file, or defaults when it is missing.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| load_from_toml().unwrap_or_default())
}

pub fn colors() -> &'static Colors {
    &settings().colors
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
    } else {
        let name = s.to_ascii_lowercase();
        return Some(match name.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "purple" | "magenta" => Color::Purple,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
            "lightred" | "light_red" => Color::LightRed,
            "lightgreen" | "light_green" => Color::LightGreen,
            "lightblue" | "light_blue" => Color::LightBlue,
            "lightcyan" | "light_cyan" => Color::LightCyan,
            "lightgray" | "light_gray" | "gray" | "grey" => Color::LightGray,
            _ => return None,
        });
    }
    None
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn load_from_toml() -> Option<Settings> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("railbf.toml");

    let content = fs::read_to_string(path).ok()?;
    Some(parse_settings(&content))
}

/// Read `[interpreter]` and `[colors]` sections. Values are `key = value`,
/// optionally quoted; unknown keys and unparsable values are skipped.
pub fn parse_settings(content: &str) -> Settings {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len()-1].trim().to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq+1..].trim();
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len()-1].to_string()
            } else { val_raw.to_string() };
            sections.entry(current.clone()).or_default().insert(key, val);
        }
    }

    let mut cfg = Settings::default();

    if let Some(map) = sections.get("interpreter") {
        if let Some(n) = map.get("memory_capacity").and_then(|s| s.replace('_', "").parse::<usize>().ok()) {
            cfg.interpreter.memory_capacity = n;
        }
        if let Some(n) = map.get("integer_limit").and_then(|s| s.replace('_', "").parse::<u32>().ok()) {
            cfg.interpreter.integer_limit = n;
        }
        if let Some(b) = map.get("guard_rails").and_then(|s| parse_bool(s)) {
            cfg.guard_rails = b;
        }
        // Keep the file from producing an interpreter that cannot be built.
        if cfg.interpreter.validate().is_err() {
            cfg.interpreter = InterpreterConfig::default();
        }
    }

    if let Some(map) = sections.get("colors") {
        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = map.get(stringify!($field)).and_then(|s| parse_color(s)) {
                    cfg.colors.$field = v;
                }
            };
        }

        set!(error);
        set!(hint);
        set!(snippet);
        set!(info);
        set!(cell_empty);
        set!(cell_nonzero);
        set!(pointer);
        set!(op_move);
        set!(op_inc);
        set!(op_dec);
        set!(op_output);
        set!(op_input);
        set!(op_bracket);
        set!(comment);
    }

    cfg
}

/// Resolve a boolean environment toggle such as `BF_GUARD_RAILS=1`.
pub fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_bool(&v))
}
