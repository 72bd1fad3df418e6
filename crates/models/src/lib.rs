//! SeaORM entities for Horizon plus the small model-level helpers that sit
//! next to them (validation, inserts with generated ids and timestamps).
//!
//! Naming conventions shared by every table: singular snake_case table
//! names, `changed_at` / `changed_by_user_id` on user-editable rows,
//! `fk_<table>_<column>` foreign keys and `idx_` / `uniq_` indexes.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod namespace;
pub mod hwm;
pub mod hwm_history;

#[cfg(test)]
mod tests;
