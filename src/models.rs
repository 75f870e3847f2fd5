use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of an account record, used to address updates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for records created locally
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the account grid as returned by the record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: RecordId,
    pub name: String,
    pub account_type: Option<String>,
}

impl RecordRow {
    pub fn new(id: impl Into<String>, name: &str, account_type: Option<&str>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.to_string(),
            account_type: account_type.map(str::to_string),
        }
    }

    /// Current value of a grid field
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Type => self.account_type.as_deref().unwrap_or(""),
        }
    }
}

/// Fields of an account that the grid knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Type,
}

impl Field {
    pub fn as_str(&self) -> &str {
        match self {
            Field::Name => "Name",
            Field::Type => "Type",
        }
    }

    /// Backing column in the account store
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Type => "account_type",
        }
    }
}

/// Grid column definition
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: &'static str,
    pub field: Field,
    pub editable: bool,
}

pub const COLUMNS: [Column; 2] = [
    Column { label: "Name", field: Field::Name, editable: true },
    Column { label: "Type", field: Field::Type, editable: false },
];

/// Unsaved field changes for one row, captured by the grid before commit
#[derive(Debug, Clone, PartialEq)]
pub struct DraftEdit {
    pub id: RecordId,
    pub fields: BTreeMap<Field, String>,
}

impl DraftEdit {
    pub fn new(id: RecordId) -> Self {
        Self { id, fields: BTreeMap::new() }
    }

    pub fn with_field(mut self, field: Field, value: &str) -> Self {
        self.fields.insert(field, value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Partial update request: identity plus exactly the changed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub id: RecordId,
    pub fields: BTreeMap<Field, String>,
}

impl From<DraftEdit> for RecordUpdate {
    fn from(draft: DraftEdit) -> Self {
        Self {
            id: draft.id,
            fields: draft.fields,
        }
    }
}

/// Records as last fetched, with the filter that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSnapshot {
    pub filter: String,
    pub rows: Vec<RecordRow>,
    pub fetched_at: DateTime<Utc>,
}

impl RecordSnapshot {
    pub fn new(filter: String, rows: Vec<RecordRow>) -> Self {
        Self {
            filter,
            rows,
            fetched_at: Utc::now(),
        }
    }
}
