//! The persistence gateway: row-level CRUD against the hosted PostgREST API.
//!
//! Everything above this crate talks to the `PersistenceGateway` trait and
//! exchanges plain JSON rows. `SupabaseClient` is the live implementation;
//! `InMemoryGateway` stands in for it in tests and offline runs.

use async_trait::async_trait;
use core_types::UserId;
use serde_json::Value;
use uuid::Uuid;

mod auth;
pub mod error;
pub mod memory;
pub mod responses;
pub mod supabase;
pub mod table;

// --- Public API ---
pub use error::{ErrorClass, GatewayError};
pub use memory::InMemoryGateway;
pub use responses::PostgrestErrorResponse;
pub use supabase::SupabaseClient;
pub use table::{Order, Table};

/// The column every table is scoped by.
pub const OWNER_COLUMN: &str = "user_id";

/// The abstract interface for the row store.
///
/// All reads are filtered by owner. Writes return the row as stored, including
/// any server-assigned columns (`id`, `created_at`, `timestamp`).
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Every row of `table` owned by `owner`, in `order` when given.
    async fn select_by_owner(
        &self,
        table: Table,
        owner: &UserId,
        order: Option<Order>,
    ) -> Result<Vec<Value>, GatewayError>;

    /// The single row owned by `owner`. `GatewayError::NoRows` when absent.
    async fn select_one_by_owner(&self, table: Table, owner: &UserId) -> Result<Value, GatewayError>;

    /// Inserts one row and returns the stored representation.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, GatewayError>;

    /// Patches the row with `id` (scoped to `owner`). `GatewayError::NoRows` if nothing matched.
    async fn update_by_id(
        &self,
        table: Table,
        owner: &UserId,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError>;

    /// Deletes the row with `id` (scoped to `owner`). `GatewayError::NoRows` if nothing matched.
    async fn delete_by_id(&self, table: Table, owner: &UserId, id: Uuid) -> Result<(), GatewayError>;

    /// Insert-or-merge keyed on `on_conflict`.
    async fn upsert(&self, table: Table, row: Value, on_conflict: &str) -> Result<Value, GatewayError>;
}
