//! Libris kernel: the module contract, its lifecycle registry, and layered settings.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{IndexDefinition, InitCtx, Module, SortKey};
pub use registry::ModuleRegistry;
