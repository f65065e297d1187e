//! # Output Formatting
//!
//! Provides formatted output functions with colors, emojis, and consistent
//! styling for user-facing messages and the run summary.

use owo_colors::{OwoColorize, Stream, Style};
use {clap, emojis};

/// Enum representing different color modes for output
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
  /// Enable colored output
  Yes,
  /// Enable colored output (alias for Yes)
  Always,
  /// Automatically detect if colors should be used based on terminal
  /// capabilities
  Auto,
  /// Disable colored output
  No,
  /// Disable colored output (alias for No)
  Never,
}

impl ColorMode {
  /// Set the global color override for this mode
  pub fn apply(self) {
    match self {
      ColorMode::Always | ColorMode::Yes => owo_colors::set_override(true),
      ColorMode::Never | ColorMode::No => owo_colors::set_override(false),
      // Let owo_colors use its default auto-detection
      ColorMode::Auto => {}
    }
  }
}

/// Helper function to safely get an emoji or fallback to a default character
pub fn get_emoji_or_default(name: &str, default: &str) -> String {
  match emojis::get_by_shortcode(name) {
    Some(emoji) => emoji.to_string(),
    None => default.to_string(),
  }
}

fn paint(text: &str, stream: Stream, style: Style) -> String {
  text
    .if_supports_color(stream, |text| text.style(style))
    .to_string()
}

/// Print a success message
pub fn print_success(message: &str) {
  let check = get_emoji_or_default("check_mark", "✓");
  println!("{} {}", paint(&check, Stream::Stdout, Style::new().green().bold()), message);
}

/// Print an error message
pub fn print_error(message: &str) {
  let cross = get_emoji_or_default("cross_mark", "✗");
  eprintln!("{} {}", paint(&cross, Stream::Stderr, Style::new().red().bold()), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
  let warning = get_emoji_or_default("warning", "⚠");
  println!("{} {}", paint(&warning, Stream::Stdout, Style::new().yellow().bold()), message);
}

/// Print a section header
pub fn print_header(header: &str) {
  println!("\n{}", paint(header, Stream::Stdout, Style::new().blue().bold()));
}

/// Format a Jira issue key
pub fn format_issue_key(key: &str) -> String {
  paint(key, Stream::Stdout, Style::new().bright_cyan().bold())
}

/// Format a Jira issue type
pub fn format_issue_type(issue_type: &str) -> String {
  let style = match issue_type {
    "Epic" => Style::new().purple(),
    "Story" => Style::new().green(),
    "Task" => Style::new().blue(),
    "Sub-task" => Style::new().bright_black(),
    _ => Style::new(),
  };
  paint(issue_type, Stream::Stdout, style)
}

/// Format a URL
pub fn format_url(url: &str) -> String {
  paint(url, Stream::Stdout, Style::new().underline())
}
