//! Client-side state layer for a dog-adoption search service.
//!
//! The crate is organized as follows:
//! - `service`: the search service boundary and its HTTP implementation
//! - `store`: slices, reducer, middleware and selectors
//! - `events`: asynchronous operations feeding service results into the store
//! - `app`, `cli`, `config`, `logger`: wiring for the `dog-search` binary

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod service;
pub mod store;
