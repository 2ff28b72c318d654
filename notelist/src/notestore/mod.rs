//! Live mirrors of the note collections.
//!
//! A [`NoteStore`] keeps two local sequences of notes, one for the active
//! collection and one for the trash, and keeps them in sync with the document
//! store through live queries. Writes go to the document store only; the local
//! sequences change when the store echoes the write back through a query.
use crate::docstore::{
    BoxedDocumentStore, DocumentRef, DocumentSnapshot, DocumentStore, Query, SnapshotHandler,
    Subscription,
};
use crate::errors::{CollectionParseError, DocumentStoreError};
use crate::note::{Note, NoteID, NoteKind};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};


/// How many active notes are mirrored.
pub const ACTIVE_LIMIT: usize = 20;
/// How many trashed notes are mirrored.
pub const TRASH_LIMIT: usize = 20;

/// The two collections notes live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Notes,
    Trash,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Notes => "notes",
            Collection::Trash => "trash",
        }
    }

    /// The collection a note is written to, according to its `type` tag.
    pub fn for_note(note: &Note) -> Self {
        if note.note_type == NoteKind::Trash {
            Collection::Trash
        } else {
            Collection::Notes
        }
    }

    pub fn doc_ref(&self, id: &NoteID) -> DocumentRef {
        DocumentRef::new(self.as_str(), id.as_ref())
    }
}

impl FromStr for Collection {
    type Err = CollectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(Collection::Notes),
            "trash" => Ok(Collection::Trash),
            _ => Err(CollectionParseError::UnknownCollection(s.to_owned())),
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStoreConfig {
    pub active_limit: usize,
    /// `None` mirrors the whole trash.
    pub trash_limit: Option<usize>,
}

impl Default for NoteStoreConfig {
    fn default() -> Self {
        NoteStoreConfig {
            active_limit: ACTIVE_LIMIT,
            trash_limit: Some(TRASH_LIMIT),
        }
    }
}

type Mirror = Arc<RwLock<Vec<Note>>>;

/// Build a handler that replaces the mirror with each snapshot it receives.
fn mirror_handler(collection: Collection, mirror: Mirror) -> SnapshotHandler {
    Box::new(move |snapshot: &[DocumentSnapshot]| {
        let notes: Vec<Note> = snapshot
            .iter()
            .map(|doc| Note::from_document(&doc.data, &doc.key))
            .collect();
        debug!(%collection, count = notes.len(), "Snapshot received");
        *mirror.write() = notes;
    })
}

/// Mirrors the active and trashed notes, and mediates writes to them.
pub struct NoteStore {
    db: BoxedDocumentStore,
    config: NoteStoreConfig,
    normal_notes: Mirror,
    trash_notes: Mirror,
    unsubscribe_notes: Mutex<Option<Subscription>>,
    unsubscribe_trash: Mutex<Option<Subscription>>,
}

impl NoteStore {
    /// Create a note store and subscribe to both collections.
    pub fn new(db: BoxedDocumentStore) -> Result<Self, DocumentStoreError> {
        Self::with_config(db, NoteStoreConfig::default())
    }

    pub fn with_config(
        db: BoxedDocumentStore,
        config: NoteStoreConfig,
    ) -> Result<Self, DocumentStoreError> {
        let store = NoteStore {
            db,
            config,
            normal_notes: Default::default(),
            trash_notes: Default::default(),
            unsubscribe_notes: Mutex::new(None),
            unsubscribe_trash: Mutex::new(None),
        };
        *store.unsubscribe_notes.lock() = Some(store.subscribe_active()?);
        *store.unsubscribe_trash.lock() = Some(store.subscribe_trash()?);
        Ok(store)
    }

    /// Keep [`NoteStore::normal_notes`] in sync with the active collection.
    ///
    /// Only notes whose type is `"note"` are mirrored, up to the active limit.
    pub fn subscribe_active(&self) -> Result<Subscription, DocumentStoreError> {
        let query = Query::collection(Collection::Notes.as_str())
            .where_eq("type", NoteKind::Note.as_str())
            .limit(self.config.active_limit);
        self.db.subscribe(
            query,
            mirror_handler(Collection::Notes, self.normal_notes.clone()),
        )
    }

    /// Keep [`NoteStore::trash_notes`] in sync with the trash collection.
    pub fn subscribe_trash(&self) -> Result<Subscription, DocumentStoreError> {
        let query =
            Query::collection(Collection::Trash.as_str()).with_limit(self.config.trash_limit);
        self.db.subscribe(
            query,
            mirror_handler(Collection::Trash, self.trash_notes.clone()),
        )
    }

    /// Current active notes, in key order.
    pub fn normal_notes(&self) -> Vec<Note> {
        self.normal_notes.read().clone()
    }

    /// Current trashed notes, in key order.
    pub fn trash_notes(&self) -> Vec<Note> {
        self.trash_notes.read().clone()
    }

    /// Find a mirrored note by ID.
    pub fn find_note(&self, collection: Collection, id: &NoteID) -> Option<Note> {
        let mirror = match collection {
            Collection::Notes => &self.normal_notes,
            Collection::Trash => &self.trash_notes,
        };
        mirror.read().iter().find(|n| &n.id == id).cloned()
    }

    /// Write a new note to a collection.
    ///
    /// Failures are logged, never returned.
    pub async fn add_note(&self, note: &Note, collection: Collection) {
        match self
            .db
            .add_document(collection.as_str(), note.to_document())
            .await
        {
            Ok(key) => debug!(%collection, %key, "Document added"),
            Err(e) => error!(%collection, "Error adding document: {}", e),
        }
    }

    /// Write a new note to the active collection.
    pub async fn add_note_to_notes(&self, note: &Note) {
        self.add_note(note, Collection::Notes).await
    }

    /// Rewrite the title, content, marked flag and type of a persisted note.
    ///
    /// The note is looked up in the collection its type points to.
    /// A note without an ID is ignored.
    pub async fn update_note(&self, note: &Note) {
        if note.id.is_empty() {
            return;
        }
        let doc_ref = Collection::for_note(note).doc_ref(&note.id);
        if let Err(e) = self.db.update_document(&doc_ref, note.to_document()).await {
            error!(%doc_ref, "Error updating document: {}", e);
        }
    }

    /// Delete a note for good.
    pub async fn delete_note(&self, collection: Collection, id: &NoteID) {
        let doc_ref = collection.doc_ref(id);
        if let Err(e) = self.db.delete_document(&doc_ref).await {
            error!(%doc_ref, "Error deleting document: {}", e);
        }
    }

    /// Release both live queries.
    ///
    /// The mirrors keep their last contents.
    pub fn close(&self) {
        for sub in [&self.unsubscribe_notes, &self.unsubscribe_trash] {
            if let Some(sub) = sub.lock().take() {
                sub.unsubscribe();
            }
        }
    }
}
