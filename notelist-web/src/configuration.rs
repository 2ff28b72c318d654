use notelist::docstore::util::populate_test_data;
use notelist::errors::DocumentStoreError;
use notelist::{InMemoryDocumentStore, NoteStore, NoteStoreConfig};
use std::sync::Arc;

#[derive(serde::Deserialize, Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    activelimit: usize,
    /// Unset to mirror the whole trash.
    trashlimit: Option<usize>,
    populateinmemorystore: bool,
}

impl Settings {
    pub fn note_store_config(&self) -> NoteStoreConfig {
        NoteStoreConfig {
            active_limit: self.activelimit,
            trash_limit: self.trashlimit,
        }
    }

    /// Build a note store backed by a fresh in-memory document store.
    pub async fn get_note_store(&self) -> Result<NoteStore, DocumentStoreError> {
        let db = Arc::new(InMemoryDocumentStore::new());
        if self.populateinmemorystore {
            populate_test_data(&*db).await?;
        }
        NoteStore::with_config(db, self.note_store_config())
    }
}

lazy_static! {
    pub static ref CONFIGURATION: Settings =
        get_configuration().expect("Failed to read configuration.yml.");
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let defaults = NoteStoreConfig::default();
    let mut builder = config::Config::builder()
        .set_default("debug", false)?
        .set_default("host", "localhost")?
        .set_default("port", 8000)?
        .set_default("activelimit", defaults.active_limit as u64)?
        .set_default("populateinmemorystore", true)?;
    if let Some(limit) = defaults.trash_limit {
        builder = builder.set_default("trashlimit", limit as u64)?;
    }
    let config = builder
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::default()
                .prefix("notelist")
                .separator("_"),
        )
        .build()?;
    config.try_deserialize()
}
