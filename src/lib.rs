//! Station dashboard for a volunteer fire and rescue centre.
//!
//! Pulls vehicle crews from the scheduling portal, river levels from the
//! national gauge network and the local weather, and combines them with the
//! station's own flat-file calendar, to-do list and logbook.
//!
//! Layout:
//! - `ingest`   - HTTP clients for the three upstream APIs.
//! - `analysis` - roster normalization and event aggregation.
//! - `alert`    - status severity table and water level thresholds.
//! - `store`    - flat JSON documents (events, to-do, journal).
//! - `dashboard` / `display` - page assembly and text rendering.

pub mod alert;
pub mod analysis;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod registry;
pub mod session;
pub mod store;
pub mod verify;

pub use error::Error;
