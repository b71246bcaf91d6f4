//! MongoDB client factory and index tooling.

use anyhow::Context;
use bson::{doc, Document};
use libris_kernel::{settings::DatabaseSettings, IndexDefinition};
use mongodb::{
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};

/// Build a client for `settings.uri` and select the database.
///
/// The URI's default database wins over `settings.name`. The driver connects
/// lazily, so an unreachable server is reported by [`ping`] rather than here.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .with_context(|| "failed to parse MongoDB connection string")?;
    options.app_name = Some(settings.app_name.clone());

    let client = Client::with_options(options).context("failed to create MongoDB client")?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&settings.name));

    tracing::info!(target: "libris-db", database = database.name(), "MongoDB client ready");
    Ok(database)
}

/// Round-trip a `ping` command to check the server is reachable.
pub async fn ping(database: &Database) -> anyhow::Result<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("MongoDB ping failed")?;
    Ok(())
}

/// Create every index; existing indexes with the same spec are left alone by the server.
pub async fn apply_indexes(
    database: &Database,
    indexes: &[(String, IndexDefinition)],
) -> anyhow::Result<()> {
    for (module, definition) in indexes {
        tracing::info!(
            target: "libris-db",
            module = %module,
            collection = definition.collection,
            index = definition.name,
            "ensuring index"
        );

        database
            .collection::<Document>(definition.collection)
            .create_index(index_model(definition))
            .await
            .with_context(|| {
                format!(
                    "failed to create index '{}' on '{}' for module '{}'",
                    definition.name, definition.collection, module
                )
            })?;
    }

    Ok(())
}

fn index_keys(definition: &IndexDefinition) -> Document {
    let mut keys = Document::new();
    for (field, direction) in definition.keys {
        keys.insert(*field, direction.as_i32());
    }
    keys
}

fn index_model(definition: &IndexDefinition) -> IndexModel {
    IndexModel::builder()
        .keys(index_keys(definition))
        .options(
            IndexOptions::builder()
                .name(definition.name.to_string())
                .unique(definition.unique)
                .build(),
        )
        .build()
}
