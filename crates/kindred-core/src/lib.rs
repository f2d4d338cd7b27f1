//! Core types and the staged discovery engine for Kindred.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! profile store and the presence provider are abstracted behind traits; the
//! SQLite backend lives in `kindred-store-sqlite`, the HTTP surface in
//! `kindred-api`.

pub mod age;
pub mod clock;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod predicate;
pub mod presence;
pub mod profile;
pub mod result;
pub mod store;

pub use error::{Error, Result};
