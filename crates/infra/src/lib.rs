//! Infrastructure layer: catalog and user persistence.
//!
//! Two interchangeable backends implement the same traits:
//! - [`InMemoryStore`]: a single `RwLock`-guarded set of tables, for tests and
//!   local development;
//! - [`PostgresStore`]: `sqlx` over PostgreSQL, with the schema in
//!   `migrations/` applied at startup.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{CatalogStore, Repository};
