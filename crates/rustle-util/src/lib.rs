#![forbid(unsafe_code)]
//! Hashing, path derivation, and filesystem helpers for Rustle.

pub mod error;
pub mod fs;
pub mod hash;
pub mod path;
