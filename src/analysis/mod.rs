//! Data organization for the dashboard pages.
//!
//! Pure functions only: no I/O, and the current instant is always passed in.
//!
//! Submodules:
//! - `roster` - orders a vehicle's crew and extracts its status.
//! - `events` - upcoming-event filtering and text search.

pub mod events;
pub mod roster;

pub use events::{Searchable, filter_by_types, search, upcoming_events};
pub use roster::{NormalizedRoster, normalize_roster};
