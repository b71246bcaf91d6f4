//! Libris book catalog service.
//!
//! Feature modules live under [`modules`]; [`bootstrap`] wires them to a
//! store and the HTTP layer.

pub mod bootstrap;
pub mod modules;
pub mod utils;
