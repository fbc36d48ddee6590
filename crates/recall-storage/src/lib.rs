//! Recall Storage crate - SQLite persistence for named vector collections.
//!
//! Provides a WAL-mode SQLite database with migrations and a repository
//! that stores `{id, text, vector}` records per collection in insertion order.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{decode_vector, encode_vector, CollectionInfo, CollectionRepository};
