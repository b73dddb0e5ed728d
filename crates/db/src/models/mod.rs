//! Row structs mapped with `sqlx::FromRow`.

pub mod action_right;
pub mod dropdown;
pub mod dynamic_field;
pub mod dynamic_field_value;
pub mod field_permission;
pub mod fields_ordering;
pub mod table_setting;
