//! `tello-store`: typed access to the external data store.
//!
//! The store itself (Supabase / PostgREST) owns the schema. This crate only
//! exposes the handful of filters the backend needs, one narrow trait per
//! collection:
//!
//! | Trait                     | Table            |
//! |---------------------------|------------------|
//! | [`ReservaRepository`]     | `reservas`       |
//! | [`CanchaRepository`]      | `canchas`        |
//! | [`ReservaFijaRepository`] | `reservas_fijas` |
//! | [`PagoRepository`]        | `pagos`          |
//!
//! [`SupabaseStore`] talks HTTP; [`MemoryStore`] keeps rows in process for
//! tests and for running the gateway without credentials.

pub mod error;
pub mod memory;
pub mod query;
pub mod repo;
pub mod supabase;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use repo::{
    CanchaRepository, PagoRepository, Repositories, ReservaFijaRepository, ReservaRepository,
};
pub use supabase::SupabaseStore;
