//! # Field Templating
//!
//! Expands `{name}` placeholders in field values using keys of issues that
//! were created earlier in the run (for example `{parent_key}` or
//! `{epic_key}`).
//!
//! Substitution is a single pass: a substituted value is never scanned for
//! further placeholders. Braces that do not enclose an identifier are left
//! alone, so JSON snippets or wiki markup in descriptions pass through.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{FieldValue, Fields};

/// Values available to placeholders, keyed by placeholder name
pub type TemplateContext = BTreeMap<String, String>;

/// Errors that can occur while rendering a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("Unresolved placeholder '{{{0}}}': no value for '{0}' in the current context")]
  MissingKey(String),
}

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Failed to compile placeholder regex"));

/// Substitute every placeholder in `template` with its value from `context`
pub fn render(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
  let mut rendered = String::with_capacity(template.len());
  let mut last_end = 0;

  for captures in PLACEHOLDER_PATTERN.captures_iter(template) {
    let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
      continue;
    };
    let value = context
      .get(name.as_str())
      .ok_or_else(|| TemplateError::MissingKey(name.as_str().to_string()))?;

    rendered.push_str(&template[last_end..token.start()]);
    rendered.push_str(value);
    last_end = token.end();
  }

  rendered.push_str(&template[last_end..]);
  Ok(rendered)
}

/// Render every string inside a field value, descending into lists and maps
///
/// Map keys are not templated.
pub fn render_value(value: &FieldValue, context: &TemplateContext) -> Result<FieldValue, TemplateError> {
  Ok(match value {
    FieldValue::String(text) => FieldValue::String(render(text, context)?),
    FieldValue::List(items) => FieldValue::List(
      items
        .iter()
        .map(|item| render_value(item, context))
        .collect::<Result<_, _>>()?,
    ),
    FieldValue::Map(map) => FieldValue::Map(render_fields(map, context)?),
    other => other.clone(),
  })
}

/// Render all values of a field map
pub fn render_fields(fields: &Fields, context: &TemplateContext) -> Result<Fields, TemplateError> {
  fields
    .iter()
    .map(|(name, value)| render_value(value, context).map(|rendered| (name.clone(), rendered)))
    .collect()
}
