//! Snippets
//!
//! Snippet CRUD, favorites, the soft-delete archive and per-user stats.
//!
//! ```text
//! snippets/
//! ├── mod.rs        - Module exports
//! ├── db.rs         - Queries (owner scoping, visibility, filters)
//! ├── handlers.rs   - HTTP handlers
//! └── retention.rs  - Background purge of old archived snippets
//! ```

pub mod db;
pub mod handlers;
pub mod retention;

pub use handlers::{
    create_snippet, delete_snippet, delete_snippet_permanently, empty_archive, get_snippet, get_stats,
    list_archive, list_snippets, restore_snippet, toggle_favorite, update_snippet,
};
