//! Data layer of the simulated file system.
//!
//! This crate owns everything that touches raw bytes: the typed on-disk
//! model, the bit-exact image codec and the file-backed disk controller.
//! It knows nothing about directories, allocation policy or the command
//! language; those live in the `minifs` crate on top of this one.

#![deny(missing_docs)]

pub mod codec;
pub mod controller;
pub mod error;
pub mod types;
