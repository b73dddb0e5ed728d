//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row mutations run
//! inside explicit transactions.

pub mod action_right_repo;
pub mod dropdown_option_repo;
pub mod dropdown_selection_repo;
pub mod dynamic_field_repo;
pub mod dynamic_value_repo;
pub mod field_permission_repo;
pub mod fields_ordering_repo;
pub mod record_repo;
pub mod table_setting_repo;
pub mod user_role_repo;

pub use action_right_repo::ActionRightRepo;
pub use dropdown_option_repo::DropdownOptionRepo;
pub use dropdown_selection_repo::DropdownSelectionRepo;
pub use dynamic_field_repo::DynamicFieldRepo;
pub use dynamic_value_repo::DynamicValueRepo;
pub use field_permission_repo::FieldPermissionRepo;
pub use fields_ordering_repo::FieldsOrderingRepo;
pub use record_repo::{RecordRepo, RecordStoreError};
pub use table_setting_repo::TableSettingRepo;
pub use user_role_repo::UserRoleRepo;
