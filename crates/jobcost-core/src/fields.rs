//! # Custom Fields
//!
//! Every machine type carries a JSON list of field descriptors. The UI
//! renders one input per descriptor, and each machine entry stores the
//! answers as a JSON object keyed by field name.
//!
//! ```text
//! machine_types.custom_fields_schema          job_machine_entries.machine_custom_data
//! ┌──────────────────────────────────────┐    ┌────────────────────────────────────┐
//! │ [{"name":"rollNo","label":"Roll No.",│    │ {"rollNo": "R-301",                │
//! │   "type":"text","required":true},    │──► │  "noOfColours": 4}                 │
//! │  {"name":"noOfColours",              │    └────────────────────────────────────┘
//! │   "type":"number","required":true}] │
//! └──────────────────────────────────────┘
//! ```
//!
//! The schema is data, not code: this module only parses it, checks it,
//! and checks entry data against it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Input widget kind for a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FieldType {
    Text,
    Number,
    Select,
}

/// One field in a machine type's custom fields schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, field_type: FieldType, required: bool) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            required,
            options: None,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }
}

/// Parses and checks a stored schema. Blank text reads as an empty schema.
///
/// ## Example
/// ```rust
/// use jobcost_core::fields::{parse_schema, FieldType};
///
/// let fields = parse_schema(r#"[{"name":"size","label":"Size","type":"text","required":true}]"#).unwrap();
/// assert_eq!(fields[0].field_type, FieldType::Text);
/// ```
pub fn parse_schema(json: &str) -> CoreResult<Vec<FieldDescriptor>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let fields: Vec<FieldDescriptor> =
        serde_json::from_str(json).map_err(|e| CoreError::InvalidFieldSchema {
            reason: e.to_string(),
        })?;

    check_schema(&fields)?;
    Ok(fields)
}

/// Checks descriptor invariants: non-empty unique names, options on selects.
pub fn check_schema(fields: &[FieldDescriptor]) -> CoreResult<()> {
    let mut seen = HashSet::new();

    for field in fields {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidFieldSchema {
                reason: "field name is empty".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(CoreError::InvalidFieldSchema {
                reason: format!("duplicate field '{}'", name),
            });
        }
        if field.field_type == FieldType::Select
            && field.options.as_ref().map_or(true, |o| o.is_empty())
        {
            return Err(CoreError::InvalidFieldSchema {
                reason: format!("select field '{}' has no options", name),
            });
        }
    }

    Ok(())
}

/// Serializes a schema for storage.
pub fn schema_to_json(fields: &[FieldDescriptor]) -> CoreResult<String> {
    serde_json::to_string(fields).map_err(|e| CoreError::InvalidFieldSchema {
        reason: e.to_string(),
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parses a number the way the entry form does: JSON numbers and numeric
/// strings count, anything else does not.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Checks a machine entry's custom data against its machine type's schema.
///
/// Keys that the schema does not mention are kept as-is; schemas change
/// over time and older entries must still load.
pub fn validate_custom_data(fields: &[FieldDescriptor], data: &Map<String, Value>) -> CoreResult<()> {
    for field in fields {
        let value = data.get(&field.name);

        let Some(value) = value.filter(|v| !is_blank(v)) else {
            if field.required {
                return Err(CoreError::InvalidCustomData {
                    field: field.label.clone(),
                    reason: "is required".to_string(),
                });
            }
            continue;
        };

        match field.field_type {
            FieldType::Text => {}
            FieldType::Number => {
                if numeric_value(value).is_none() {
                    return Err(CoreError::InvalidCustomData {
                        field: field.label.clone(),
                        reason: "must be a number".to_string(),
                    });
                }
            }
            FieldType::Select => {
                let chosen = match value {
                    Value::String(s) => s.as_str(),
                    _ => "",
                };
                let allowed = field.options.as_deref().unwrap_or(&[]);
                if !allowed.iter().any(|o| o == chosen) {
                    return Err(CoreError::InvalidCustomData {
                        field: field.label.clone(),
                        reason: format!("must be one of: {}", allowed.join(", ")),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Renders stored custom data as `key: value, key: value` for reports.
///
/// Text that is not a JSON object is returned unchanged; empty objects
/// render as an empty string.
pub fn describe_custom_data(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => raw.to_string(),
    }
}
