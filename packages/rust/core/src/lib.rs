//! Core domain logic for routeman.
//!
//! This crate ties together the route source, the collection builder, and
//! the collection writer into the end-to-end `generate` workflow.

pub mod builder;
pub mod document;
pub mod pipeline;
pub mod source;
pub mod writer;
