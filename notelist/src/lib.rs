//! notelist: personal notes mirrored live from a document store.
pub mod docstore;
pub mod errors;
pub mod note;
pub mod notestore;
pub mod view;

pub use docstore::{DocumentStore, InMemoryDocumentStore};
pub use note::{Note, NoteID, NoteKind};
pub use notestore::{Collection, NoteStore, NoteStoreConfig};
