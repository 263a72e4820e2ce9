//! Filesystem primitives used by module procedures.
pub mod fs;
pub mod link;

pub use link::{LinkState, detect};
