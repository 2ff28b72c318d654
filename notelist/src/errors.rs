use thiserror::Error;

use crate::docstore::DocumentRef;

#[derive(Error, Debug)]
pub enum DocumentStoreError {
    #[error("document `{0}` doesn't exist")]
    DocumentNotExist(DocumentRef),
    #[error("collection name `{0}` is not valid")]
    InvalidCollection(String),
    #[error("the document store is unavailable: `{0}`")]
    Unavailable(String),
}

/// Error type for resolving a collection name.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectionParseError {
    #[error("collection `{0}` is not one of `notes` or `trash`")]
    UnknownCollection(String),
}
