//! The closed set of business entities and their compiled-in field schemas.
//!
//! Static fields are a compile-time schema rather than DB-stored rules;
//! administrator-defined dynamic fields extend each entity's field set at
//! runtime (see [`crate::dynamic`]).

use serde::{Deserialize, Serialize};

use crate::dynamic::FieldType;
use crate::error::CoreError;

/// A business entity that can carry field permissions and dynamic fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    User,
    Project,
    Team,
    Payment,
}

impl Entity {
    /// Machine-readable name, also used as the storage discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Team => "team",
            Self::Payment => "payment",
        }
    }

    /// Physical table backing this entity.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Project => "projects",
            Self::Team => "teams",
            Self::Payment => "payments",
        }
    }

    /// Parse a path/storage discriminator.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "user" => Ok(Self::User),
            "project" => Ok(Self::Project),
            "team" => Ok(Self::Team),
            "payment" => Ok(Self::Payment),
            other => Err(CoreError::Validation(format!(
                "Unknown entity '{other}'. Must be one of: user, project, team, payment"
            ))),
        }
    }

    /// Static (compiled-in) field schema for this entity.
    pub fn static_fields(self) -> Vec<FieldDef> {
        match self {
            Self::User => user_fields(),
            Self::Project => project_fields(),
            Self::Team => team_fields(),
            Self::Payment => payment_fields(),
        }
    }
}

/// Internal bookkeeping columns, never exposed through permission maps or
/// table views.
pub const BOOKKEEPING_FIELDS: &[&str] = &["id", "created_at", "updated_at", "deleted"];

/// Returns true for columns that must stay invisible to callers.
pub fn is_bookkeeping_field(name: &str) -> bool {
    BOOKKEEPING_FIELDS.contains(&name)
}

/// Column key for a dynamic field, stable across renames.
pub fn dynamic_field_key(field_id: i64) -> String {
    format!("dyn_{field_id}")
}

/// Parse a dynamic-field column key back to the field id.
pub fn parse_dynamic_field_key(key: &str) -> Option<i64> {
    key.strip_prefix("dyn_")?.parse().ok()
}

/// Static per-entity field metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Machine-readable column name.
    pub name: String,
    /// Human-readable display title.
    pub title: String,
    /// Data type.
    pub field_type: FieldType,
    /// When true, visibility is governed by stored grants; when false the
    /// field is readable by everyone.
    pub requires_permission: bool,
    /// Whether the field participates in table listings by default.
    pub show_in_table: bool,
}

impl FieldDef {
    fn new(
        name: &str,
        title: &str,
        field_type: FieldType,
        requires_permission: bool,
        show_in_table: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            field_type,
            requires_permission,
            show_in_table,
        }
    }
}

fn user_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "Name", FieldType::String, false, true),
        FieldDef::new("email", "Email", FieldType::String, false, true),
        FieldDef::new("phone", "Phone", FieldType::String, true, true),
        FieldDef::new("position", "Position", FieldType::String, false, true),
        FieldDef::new("salary", "Salary", FieldType::Float, true, true),
        FieldDef::new("hire_date", "Hire Date", FieldType::Date, true, true),
        FieldDef::new("birthday", "Birthday", FieldType::Date, true, false),
        FieldDef::new("notes", "Notes", FieldType::Text, true, false),
    ]
}

fn project_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "Name", FieldType::String, false, true),
        FieldDef::new("code", "Code", FieldType::String, false, true),
        FieldDef::new("description", "Description", FieldType::Text, false, false),
        FieldDef::new("budget", "Budget", FieldType::Float, true, true),
        FieldDef::new("salary", "Salary", FieldType::Float, true, true),
        FieldDef::new("hourly_rate", "Hourly Rate", FieldType::Float, true, true),
        FieldDef::new("start_date", "Start Date", FieldType::Date, false, true),
        FieldDef::new("end_date", "End Date", FieldType::Date, false, true),
        FieldDef::new("is_active", "Active", FieldType::Bool, false, true),
    ]
}

fn team_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "Name", FieldType::String, false, true),
        FieldDef::new("description", "Description", FieldType::Text, false, false),
        FieldDef::new("head_user_id", "Team Head", FieldType::Int, false, true),
    ]
}

fn payment_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("user_id", "Employee", FieldType::Int, false, true),
        FieldDef::new("amount", "Amount", FieldType::Float, true, true),
        FieldDef::new("paid_at", "Paid At", FieldType::DateTime, false, true),
        FieldDef::new("comment", "Comment", FieldType::Text, true, false),
    ]
}
