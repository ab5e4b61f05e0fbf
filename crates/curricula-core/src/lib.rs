//! Curricula Core: shared error type and configuration trait.
//!
//! This crate provides the foundational types used across all Curricula crates.
//! It has no internal Curricula dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`traits`]: Configuration abstraction

#![doc = include_str!("../README.md")]

pub mod error;
pub mod traits;

pub use error::{Error, Result};
pub use traits::{ConfigProvider, DataFile};
