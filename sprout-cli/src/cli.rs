//! # Command Line Interface
//!
//! Defines the arguments of the sprout tool.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use sprout_core::output::ColorMode;

/// Top-level CLI command for the sprout tool
#[derive(Parser, Debug)]
#[command(name = "sprout")]
#[command(display_name = "🌱 Sprout")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Create a tree of Jira issues from a YAML file")]
#[command(
  long_about = "Sprout creates epics, stories, tasks and sub-tasks in Jira from a YAML issues file.\n\n\
        Each issue is created after its parent, and the keys of already created issues can be\n\
        referenced from field values with placeholders such as {epic_key} or {parent_key}."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// YAML file describing the issues to create
  #[arg(long = "issues_list_file", value_name = "FILE")]
  pub issues_list_file: PathBuf,

  /// Jira configuration file
  #[arg(
    long = "jira_config_file",
    value_name = "FILE",
    long_help = "Jira configuration file.\n\n\
             Defaults to ./jira_config.yaml when it exists, otherwise to\n\
             jira_config.yaml in the sprout configuration directory."
  )]
  pub jira_config_file: Option<PathBuf>,

  /// Project key for issues that do not name their own project
  #[arg(long, value_name = "KEY")]
  pub project: Option<String>,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  /// Log debug messages, including request and response bodies
  #[arg(long)]
  pub debug: bool,
}
