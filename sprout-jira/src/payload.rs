//! # Request Payloads
//!
//! Translates the readable field names of the issues file into the JSON Jira
//! expects: custom fields are renamed to their IDs and fields that Jira
//! models as objects are wrapped as `{"key": ...}` or `{"name": ...}`.

use serde_json::{Map, Value, json};
use sprout_core::config::SpecialFields;
use sprout_core::model::{FieldValue, Fields, IssueType};
use sprout_core::service::ParentRef;

/// Convert a field value to JSON
pub fn to_json(value: &FieldValue) -> Value {
  match value {
    FieldValue::Null => Value::Null,
    FieldValue::Bool(flag) => Value::Bool(*flag),
    FieldValue::Integer(number) => Value::from(*number),
    FieldValue::Float(number) => Value::from(*number),
    FieldValue::String(text) => Value::String(text.clone()),
    FieldValue::List(items) => Value::Array(items.iter().map(to_json).collect()),
    FieldValue::Map(map) => Value::Object(map.iter().map(|(key, item)| (key.clone(), to_json(item))).collect()),
  }
}

/// Wrap scalar values as `{attribute: value}`; lists are wrapped element-wise
/// and mappings are assumed to be in Jira's shape already
fn wrap(value: &FieldValue, attribute: &str) -> Value {
  match value {
    FieldValue::List(items) => Value::Array(items.iter().map(|item| wrap(item, attribute)).collect()),
    FieldValue::Map(_) => to_json(value),
    scalar => json!({ attribute: to_json(scalar) }),
  }
}

/// Builds `fields` objects for create and update requests
pub struct PayloadBuilder<'a> {
  special: &'a SpecialFields,
  default_project: Option<&'a str>,
}

impl<'a> PayloadBuilder<'a> {
  pub const fn new(special: &'a SpecialFields, default_project: Option<&'a str>) -> Self {
    Self {
      special,
      default_project,
    }
  }

  /// The Jira field name and JSON value for one readable field
  pub fn translate(&self, name: &str, value: &FieldValue) -> (String, Value) {
    let special = self.special;

    if special.is_key_format(name) {
      (name.to_string(), wrap(value, "key"))
    } else if special.is_name_format(name) {
      (name.to_string(), wrap(value, "name"))
    } else if let Some(id) = special.custom_field_id(name) {
      (id.to_string(), to_json(value))
    } else if let Some(id) = special.key_format_custom_field(name) {
      (id.to_string(), wrap(value, "key"))
    } else if let Some(id) = special.name_format_custom_field(name) {
      (id.to_string(), wrap(value, "name"))
    } else {
      (name.to_string(), to_json(value))
    }
  }

  fn translate_all(&self, fields: &Fields) -> Map<String, Value> {
    fields
      .iter()
      .filter(|(name, _)| name.as_str() != "project")
      .map(|(name, value)| self.translate(name, value))
      .collect()
  }

  /// Project key of an issue: its own `project` field or the default
  pub fn project_key<'f>(&self, fields: &'f Fields) -> Option<&'f str>
  where
    'a: 'f,
  {
    fields
      .get("project")
      .and_then(|project| match project {
        FieldValue::String(key) => Some(key.as_str()),
        FieldValue::Map(map) => map.get("key").and_then(FieldValue::as_str),
        _ => None,
      })
      .or(self.default_project)
  }

  /// Body of an issue creation request
  pub fn create_payload(&self, issue_type: &IssueType, fields: &Fields, parent: Option<&ParentRef>) -> Value {
    let mut payload = self.translate_all(fields);

    if let Some(project) = fields.get("project") {
      payload.insert("project".to_string(), wrap(project, "key"));
    } else if let Some(project) = self.default_project {
      payload.insert("project".to_string(), json!({ "key": project }));
    }
    payload.insert("issuetype".to_string(), json!({ "name": issue_type.jira_name() }));

    match parent {
      Some(ParentRef::Epic(epic_key)) => match self.special.epic_link_field() {
        Some(field_id) => {
          payload.insert(field_id.to_string(), Value::String(epic_key.clone()));
        }
        None => {
          payload.insert("parent".to_string(), json!({ "key": epic_key }));
        }
      },
      Some(ParentRef::Parent(parent_key)) => {
        payload.insert("parent".to_string(), json!({ "key": parent_key }));
      }
      None => {}
    }

    json!({ "fields": payload })
  }

  /// Body of a field update request
  pub fn update_payload(&self, fields: &Fields) -> Value {
    json!({ "fields": self.translate_all(fields) })
  }
}
