//! Core domain types
//!
//! The job graph is an arena: a [`job::Job`] owns its layers in declaration
//! order and everything else refers to a layer by [`layer::LayerId`]. Parent
//! links and dependency edges are two independent relations over that arena.

pub mod context;
pub mod depend;
pub mod handle;
pub mod job;
pub mod layer;
pub mod options;
