pub mod fields;
pub mod profile_forms;
pub mod query_error;
pub mod router;
