pub mod books;
pub mod stats;

use std::sync::Arc;

use libris_kernel::ModuleRegistry;

use books::repository::BookRepository;

/// Register every feature module over one shared store client
pub fn register_all(
    registry: &mut ModuleRegistry,
    repo: Arc<dyn BookRepository>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(repo.clone()))?;
    registry.register(stats::create_module(repo))?;
    Ok(())
}
