//! `tello-agenda`: the daily schedule document.
//!
//! [`build_agenda`] groups one day's bookings by site and field;
//! [`render_pdf`] lays the result out on A4 pages. [`load_agenda`] fetches
//! what `build_agenda` needs from the store.

pub mod agenda;
pub mod error;
pub mod pdf;

pub use agenda::{build_agenda, load_agenda, Agenda, AgendaRow, CanchaAgenda, SiteAgenda};
pub use error::{AgendaError, Result};
pub use pdf::{file_name, render_pdf};
