//! Toolkit independent application core.
//!
//! The core follows a unidirectional data flow:
//!
//! ```text
//! UI input → Event → handle_event → AppState mutation → Actions → map and search controllers
//!                        ↑                                                  ↓
//!                        └──────────── search results (Event) ──────────────┘
//! ```
//!
//! [`handle_event`] never talks to the engines directly, which makes it testable without a map or
//! a network. [`PlaceFinder`](crate::PlaceFinder) executes the returned actions.

mod actions;
mod handler;
mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use state::{AppState, MapStatus, StatusMessage};
