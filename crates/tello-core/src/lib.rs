//! `tello-core`: shared records, configuration and formatting for the
//! Futbol Tello backend.
//!
//! Every other crate in the workspace depends on this one; it has no I/O of
//! its own beyond reading the config file.

pub mod config;
pub mod display;
pub mod error;
pub mod timefmt;
pub mod types;

pub use config::TelloConfig;
pub use error::{Result, TelloError};
pub use types::{Cancha, Capacity, NewReserva, Pago, Reserva, ReservaFija, Site};
