//! Hardware abstraction seams.
//!
//! The engine never touches registers directly; it drives a
//! [`DmacBackend`], which models the register-level effects of the
//! controller without committing to a register layout. Production code
//! implements the trait over the memory-mapped block; host tests and the
//! behavioral model in [`crate::sim`] implement it in plain Rust.

pub mod backend;
pub mod power;

pub use backend::DmacBackend;
pub use power::{PowerControl, PowerDomain};
