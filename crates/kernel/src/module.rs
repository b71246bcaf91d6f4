use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Direction of a single key inside an index definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Ascending,
    Descending,
}

impl SortKey {
    /// Numeric form used by document stores (`1` / `-1`).
    pub fn as_i32(self) -> i32 {
        match self {
            SortKey::Ascending => 1,
            SortKey::Descending => -1,
        }
    }
}

/// Secondary index a module wants on one of its collections.
#[derive(Debug, Clone)]
pub struct IndexDefinition {
    pub collection: &'static str,
    pub name: &'static str,
    pub keys: &'static [(&'static str, SortKey)],
    pub unique: bool,
}

/// Core module trait that all Libris modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup before indexes are applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under `/api/{module_name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON
    /// Will be merged with other modules' specs
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Return the indexes this module needs on its collections
    fn indexes(&self) -> Vec<IndexDefinition> {
        vec![]
    }

    /// Called after indexes are in place, before the server accepts traffic
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
