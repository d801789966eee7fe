//! Influence validation for the Influx simulation kernel.
//!
//! A [`Law`] is a pure predicate deciding whether an influence is legal
//! against the current [`World`](influx_world::World). Laws never mutate
//! state. The [`LawRegistry`] maps every influence kind to exactly one
//! law; [`LawRegistry::standard`] provides the built-in library.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod law;
pub mod laws;
pub mod registry;

pub use error::LawError;
pub use law::{FnLaw, Law};
pub use registry::LawRegistry;
