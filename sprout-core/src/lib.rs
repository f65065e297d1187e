//! # Sprout Core Library
//!
//! Core library for sprout: the issue tree model, loading of the Jira
//! configuration and issues files, field templating, and the walker that
//! creates an issue tree through an [`IssueService`].

pub mod config;
pub mod consts;
pub mod model;
pub mod output;
pub mod service;
pub mod template;
pub mod url;
pub mod walker;

// Re-export main types
pub use config::{ConfigError, JiraConfig, SpecialFields, load, load_issues, load_jira_config};
pub use model::{FieldValue, Fields, IssueNode, IssueType};
pub use output::{ColorMode, print_error, print_success, print_warning};
pub use service::{ApiError, IssueService, ParentRef};
pub use template::{TemplateContext, TemplateError, render};
pub use walker::{CreationResult, CreationStatus, IssueTreeWalker, WalkReport};
