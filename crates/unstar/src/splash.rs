//! Splash screen display for the unstar CLI
//!
//! Shows a compact startup banner with an ASCII star logo and version info.

use std::io::{IsTerminal, Write};

/// ASCII art star logo
const STAR: &[&str] = &["  ╲ │ ╱", "  ─ ✱ ─", "  ╱ │ ╲"];

/// Display the splash screen
pub fn show_splash() {
    let mut stdout = std::io::stdout();
    let version = env!("CARGO_PKG_VERSION");

    if !stdout.is_terminal() {
        // Non-TTY: just show version
        writeln!(stdout, "unstar v{}", version).ok();
        return;
    }

    writeln!(stdout, "{}", STAR[0]).ok();
    writeln!(stdout, "{}   unstar v{}", STAR[1], version).ok();
    writeln!(stdout, "{}   explicit imports for Python", STAR[2]).ok();
    writeln!(stdout).ok();

    stdout.flush().ok();
}
