//! Core types and trait definitions for the credential issuance system.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend and both services depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod error;
pub mod store;
pub mod worker;

pub use error::{Error, Result};
