//! Event handling module.
//!
//! Network events run the asynchronous operations against the search
//! service and feed their outcome back into the store.

pub mod network;
