pub mod build;
pub mod create_db;
pub mod create_db_from_json;
pub mod inventory;
pub mod metadata_to_json;
pub mod status;
