//! Terminal output: status lines on stderr, JSON results on stdout.

use serde::Serialize;
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() || std::env::var_os("PORTAL_NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

/// Check if quiet mode is requested through the environment.
pub fn is_quiet() -> bool {
    std::env::var_os("PORTAL_QUIET").is_some()
}

/// Colored symbols and text.
pub struct Styled {
    use_color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    pub fn info_sym(&self) -> &str {
        if self.use_color {
            "\x1b[34m\u{25cb}\x1b[0m"
        } else {
            "--"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// Status reporter honouring `--quiet`.
pub struct Reporter {
    styled: Styled,
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            styled: Styled::new(),
            quiet: quiet || is_quiet(),
        }
    }

    pub fn ok(&self, msg: &str) {
        self.line(self.styled.ok_sym(), msg);
    }

    pub fn info(&self, msg: &str) {
        self.line(self.styled.info_sym(), msg);
    }

    pub fn warn(&self, msg: &str) {
        self.line(self.styled.warn_sym(), msg);
    }

    /// Failures are shown even in quiet mode.
    pub fn fail(&self, msg: &str) {
        eprintln!("  {} {msg}", self.styled.fail_sym());
    }

    fn line(&self, symbol: &str, msg: &str) {
        if !self.quiet {
            eprintln!("  {symbol} {msg}");
        }
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}
