//! Foundation types for the folio style engine.
//!
//! This crate contains the types shared between the style resolver core
//! and its embedders: error types, the document tree access trait, the
//! parsed-rule records and collaborator interfaces the resolver consumes,
//! and output device profiles.

pub mod error;
pub mod profile;
pub mod source;
pub mod tree;
