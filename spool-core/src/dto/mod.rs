//! Data Transfer Objects
//!
//! Serializable shapes used at the edges of the system. Job descriptions
//! reference layers by name and are resolved into the job arena on
//! conversion.

pub mod job;
