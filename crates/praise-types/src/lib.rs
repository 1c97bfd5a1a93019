//! Wire types shared by the praise client crates.
//!
//! `models` mirrors the records the backend returns; `api` holds request
//! bodies and the small envelope types around them.

pub mod api;
pub mod models;
pub mod timestamp;
