//! Terminal styles.
//!
//! Styles are plain `console` styles registered once. `console` drops the
//! escape codes when stdout is not a terminal, so piped output stays clean.

use console::Style;
use once_cell::sync::Lazy;

pub static HEADER: Lazy<Style> = Lazy::new(|| Style::new().bold().underlined());
pub static KEY: Lazy<Style> = Lazy::new(|| Style::new().cyan());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().color256(245));
pub static COUNT: Lazy<Style> = Lazy::new(|| Style::new().green().bold());
pub static SECTION: Lazy<Style> = Lazy::new(|| Style::new().yellow().bold());
