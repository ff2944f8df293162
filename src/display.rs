use crate::app::Mode;
use console::{Alignment, pad_str, style};
use std::fmt::Display;
use std::io::{self, Write};

/// Width used whenever the terminal size cannot be read.
pub const FALLBACK_WIDTH: usize = 100;

const TITLE_RULE: &str = "---------------🝔---------------";
const TITLE: &str = "Gemini-AI on Terminal";

pub fn terminal_width() -> usize {
    width_or_fallback(console::Term::stdout().size_checked())
}

/// Column count from a `(rows, cols)` pair, or `FALLBACK_WIDTH`.
pub fn width_or_fallback(size: Option<(u16, u16)>) -> usize {
    match size {
        Some((_, cols)) if cols > 0 => cols as usize,
        _ => FALLBACK_WIDTH,
    }
}

pub fn separator(width: usize) -> String {
    "─".repeat(width.saturating_sub(3).max(1))
}

/// Centered startup title
pub fn write_banner(out: &mut dyn Write, width: usize) -> io::Result<()> {
    let rule = pad_str(TITLE_RULE, width, Alignment::Center, None);
    let title = pad_str(TITLE, width, Alignment::Center, None);

    writeln!(out, "{}", style(rule.trim_end()).bold().color256(178))?;
    writeln!(out, "{}", style(title.trim_end()).bold().color256(38))?;
    writeln!(out, "{}", style(rule.trim_end()).bold().color256(178))?;
    Ok(())
}

/// Tells the user which mode is active and how to leave it.
pub fn write_mode_banner(
    out: &mut dyn Write,
    mode: Mode,
    model: &str,
    width: usize,
) -> io::Result<()> {
    let (current, hint) = match mode {
        Mode::Text => (
            "You are currently using Text-to-Text Model",
            "Enter `Image Mode` to switch to multi mode model",
        ),
        Mode::Image => (
            "You are currently using Multi Mode Model",
            "Enter `Text Mode` instead of image path, To switch to text-to-text model",
        ),
    };

    writeln!(out, "{} ({})", style(current).bold().yellow(), model)?;
    writeln!(out, "{}", style(hint).dim().yellow())?;
    writeln!(out, "{}", style(separator(width)).dim().magenta())?;
    Ok(())
}

pub fn write_notice(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", style(message).yellow())
}

/// Recoverable error line, e.g. `Error sending message: <cause>`
pub fn write_error(out: &mut dyn Write, context: &str, error: &dyn Display) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        style(format!("{}:", context)).bold().red(),
        error
    )
}
