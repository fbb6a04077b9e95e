//! Logic modules: turns cluster snapshots into file content.
//!
//! Everything here is pure: no I/O, no cluster access, no logging side
//! effects beyond diagnostics. The writer feeds snapshots in and hands the
//! returned text to the emitter.
//!
//! # Modules
//!
//! - `rack`: rack id from node labels
//! - `address`: default and per-type node address exports
//! - `jaas`: JAAS login module block from credential secrets

pub mod address;
pub mod jaas;
pub mod rack;
