use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coercion::DataType;
use crate::model::SourceKind;

/// A reusable mapping template describing how to pull fields out of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    /// Assigned by the template store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical ISO-8601 UTC timestamp, assigned by the template store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub source_kind: SourceKind,
    /// Leading data rows to ignore (tabular documents only).
    #[serde(default)]
    pub skip_rows: usize,
    pub field_mappings: Vec<FieldMapping>,
    /// Field name -> regex whose first capture group is the value (free text only).
    #[serde(default)]
    pub text_patterns: BTreeMap<String, String>,
}

/// Where one destination field comes from and what type it must have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub field_name: String,
    /// Column letters (spreadsheet) or header name (delimited text). Unused for free text.
    #[serde(default)]
    pub source_locator: String,
    #[serde(default)]
    pub required: bool,
    pub data_type: DataType,
}

impl FieldMapping {
    pub fn new(
        field_name: impl Into<String>,
        source_locator: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        FieldMapping {
            field_name: field_name.into(),
            source_locator: source_locator.into(),
            required: false,
            data_type,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl MappingTemplate {
    pub fn new(source_kind: SourceKind, field_mappings: Vec<FieldMapping>) -> Self {
        MappingTemplate {
            id: None,
            name: None,
            description: None,
            created_at: None,
            source_kind,
            skip_rows: 0,
            field_mappings,
            text_patterns: BTreeMap::new(),
        }
    }

    /// Destination field names in mapping order.
    pub fn field_names(&self) -> Vec<String> {
        self.field_mappings
            .iter()
            .map(|m| m.field_name.clone())
            .collect()
    }

    /// Display label: the name if set, else the id, else "unnamed".
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unnamed")
    }
}
