//! Spool Core
//!
//! Core types shared by the Spool launcher crates.
//!
//! This crate contains:
//! - Domain types: the job graph (jobs, layers, dependencies), launch options,
//!   the ambient environment context and remote job handles
//! - Frame sets: parsing and intersecting frame range expressions
//! - DTOs: JSON job descriptions and their conversion into the job graph

pub mod domain;
pub mod dto;
pub mod frames;

pub use frames::{FrameRangeError, FrameSet};
