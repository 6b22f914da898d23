//! Folders
//!
//! Owner-scoped folders for organising snippets.

pub mod db;
pub mod handlers;

pub use handlers::{create_folder, delete_folder, list_folders, rename_folder};
