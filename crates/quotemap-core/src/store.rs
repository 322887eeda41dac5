use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::coercion::date::format_iso;
use crate::error::QuoteMapError;
use crate::mapping::outcome::Record;
use crate::template::schema::MappingTemplate;
use crate::template::validate_template;

/// A mapped record after it has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: u64,
    pub version: u32,
    /// Name of the upload the record came from.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub created_at: String,
    pub fields: Record,
}

/// Persistence for mapping templates.
pub trait TemplateStore: Send + Sync {
    /// Validate and store a template, assigning `id` and `createdAt` when absent.
    /// Saving under an existing id replaces that template.
    fn save_template(&self, template: MappingTemplate) -> Result<MappingTemplate, QuoteMapError>;

    fn get_template(&self, id: &str) -> Result<Option<MappingTemplate>, QuoteMapError>;

    /// All templates, sorted by id.
    fn list_templates(&self) -> Result<Vec<MappingTemplate>, QuoteMapError>;

    /// Returns whether a template was removed.
    fn delete_template(&self, id: &str) -> Result<bool, QuoteMapError>;
}

/// Persistence for mapped records.
pub trait RecordStore: Send + Sync {
    /// Store a whole batch at once; either every record is stored or none is.
    fn insert_batch(
        &self,
        source: &str,
        template_id: Option<&str>,
        records: Vec<Record>,
    ) -> Result<Vec<StoredRecord>, QuoteMapError>;

    /// All records in insertion order.
    fn list_records(&self) -> Result<Vec<StoredRecord>, QuoteMapError>;

    fn record_count(&self) -> Result<usize, QuoteMapError>;
}

#[derive(Debug, Default)]
struct TemplateTable {
    next_id: u64,
    by_id: BTreeMap<String, MappingTemplate>,
}

#[derive(Debug, Default)]
struct RecordTable {
    next_id: u64,
    rows: Vec<StoredRecord>,
}

/// In-process store backed by `RwLock`s.
#[derive(Debug, Default)]
pub struct MemoryStore {
    templates: RwLock<TemplateTable>,
    records: RwLock<RecordTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn templates_read(&self) -> Result<RwLockReadGuard<'_, TemplateTable>, QuoteMapError> {
        self.templates.read().map_err(|_| poisoned("template"))
    }

    fn templates_write(&self) -> Result<RwLockWriteGuard<'_, TemplateTable>, QuoteMapError> {
        self.templates.write().map_err(|_| poisoned("template"))
    }

    fn records_read(&self) -> Result<RwLockReadGuard<'_, RecordTable>, QuoteMapError> {
        self.records.read().map_err(|_| poisoned("record"))
    }

    fn records_write(&self) -> Result<RwLockWriteGuard<'_, RecordTable>, QuoteMapError> {
        self.records.write().map_err(|_| poisoned("record"))
    }
}

fn poisoned(what: &str) -> QuoteMapError {
    QuoteMapError::Store(format!("{what} store lock poisoned"))
}

impl TemplateStore for MemoryStore {
    fn save_template(
        &self,
        mut template: MappingTemplate,
    ) -> Result<MappingTemplate, QuoteMapError> {
        validate_template(&template)?;

        let mut table = self.templates_write()?;
        let id = match template.id.take() {
            Some(id) if !id.trim().is_empty() => id,
            _ => loop {
                table.next_id += 1;
                let candidate = format!("tpl-{}", table.next_id);
                if !table.by_id.contains_key(&candidate) {
                    break candidate;
                }
            },
        };
        template.id = Some(id.clone());
        if template.created_at.is_none() {
            template.created_at = Some(format_iso(&Utc::now()));
        }

        tracing::debug!(id = %id, "saved template");
        table.by_id.insert(id, template.clone());
        Ok(template)
    }

    fn get_template(&self, id: &str) -> Result<Option<MappingTemplate>, QuoteMapError> {
        Ok(self.templates_read()?.by_id.get(id).cloned())
    }

    fn list_templates(&self) -> Result<Vec<MappingTemplate>, QuoteMapError> {
        Ok(self.templates_read()?.by_id.values().cloned().collect())
    }

    fn delete_template(&self, id: &str) -> Result<bool, QuoteMapError> {
        Ok(self.templates_write()?.by_id.remove(id).is_some())
    }
}

impl RecordStore for MemoryStore {
    fn insert_batch(
        &self,
        source: &str,
        template_id: Option<&str>,
        records: Vec<Record>,
    ) -> Result<Vec<StoredRecord>, QuoteMapError> {
        let created_at = format_iso(&Utc::now());
        let mut table = self.records_write()?;

        let first_id = table.next_id + 1;
        let stored: Vec<StoredRecord> = records
            .into_iter()
            .zip(first_id..)
            .map(|(fields, id)| StoredRecord {
                id,
                version: 1,
                source: source.to_string(),
                template_id: template_id.map(str::to_string),
                created_at: created_at.clone(),
                fields,
            })
            .collect();

        table.next_id += stored.len() as u64;
        table.rows.extend(stored.iter().cloned());
        tracing::debug!(source, count = stored.len(), "stored record batch");
        Ok(stored)
    }

    fn list_records(&self) -> Result<Vec<StoredRecord>, QuoteMapError> {
        Ok(self.records_read()?.rows.clone())
    }

    fn record_count(&self) -> Result<usize, QuoteMapError> {
        Ok(self.records_read()?.rows.len())
    }
}
