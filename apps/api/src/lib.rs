//! AccessBoard accessibility engine and preference service.
//!
//! `accessibility` holds the hover overlay engine (locator, speech,
//! fingerspelling, placement, session controller, page mount) that runs
//! against the `dom` document model. `preferences` is the persisted
//! preference store. `routes` exposes both over HTTP for the `api` binary.

pub mod accessibility;
pub mod config;
pub mod dom;
pub mod errors;
pub mod preferences;
pub mod routes;
pub mod state;
