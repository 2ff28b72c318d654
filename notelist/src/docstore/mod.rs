//! Document store backends.
//!
//! A document store holds named collections of schemaless documents, each
//! identified by a key the store assigns on creation. Besides single-document
//! reads and writes, a store can serve live queries: a subscriber is handed the
//! full result set once when subscribing, and again every time the result set
//! changes.
use crate::errors::DocumentStoreError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

mod in_memory;
pub mod util;

pub use in_memory::InMemoryDocumentStore;

/// Raw fields of a document.
pub type Document = serde_json::Map<String, Value>;

/// Reference to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub collection: String,
    pub key: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        DocumentRef {
            collection: collection.into(),
            key: key.into(),
        }
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// A document as delivered to a live query.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub key: String,
    pub data: Document,
}

/// Callback of a live query.
///
/// It receives the complete result set, in key order, every time it fires.
pub type SnapshotHandler = Box<dyn Fn(&[DocumentSnapshot]) + Send + Sync>;

/// A query against one collection.
///
/// Only equality filters and a result limit are supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filters: Vec<(String, Value)>,
    limit: Option<usize>,
}

impl Query {
    /// All documents of a collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Query {
            collection: name.into(),
            filters: vec![],
            limit: None,
        }
    }

    /// Only keep documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Return at most `n` documents.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set or clear the limit.
    pub fn with_limit(mut self, n: Option<usize>) -> Self {
        self.limit = n;
        self
    }

    pub fn get_collection(&self) -> &str {
        &self.collection
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether a document passes all filters.
    ///
    /// A missing field never equals anything.
    pub fn matches(&self, data: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| data.get(field) == Some(value))
    }

    /// Run the query over documents that are already in key order.
    pub fn apply<'a, I>(&self, docs: I) -> Vec<DocumentSnapshot>
    where
        I: IntoIterator<Item = (&'a String, &'a Document)>,
    {
        docs.into_iter()
            .filter(|(_, data)| self.matches(data))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|(key, data)| DocumentSnapshot {
                key: key.clone(),
                data: data.clone(),
            })
            .collect()
    }
}

/// Handle of a live query.
///
/// The listener stays registered until [`Subscription::unsubscribe`] is called
/// or the handle is dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Release the listener.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// An abstraction for document databases.
pub trait DocumentStore: Send + Sync {
    /// Create a document in a collection.
    ///
    /// The store assigns and returns the key of the new document.
    fn add_document<'a>(
        &'a self,
        collection: &'a str,
        data: Document,
    ) -> BoxFuture<'a, Result<String, DocumentStoreError>>;
    /// Get a single document, or `None` if there is no such document.
    fn get_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
    ) -> BoxFuture<'a, Result<Option<Document>, DocumentStoreError>>;
    /// Overwrite the given fields of an existing document.
    ///
    /// Fields not present in `data` are left untouched.
    /// Updating a document that doesn't exist is an error.
    fn update_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
        data: Document,
    ) -> BoxFuture<'a, Result<(), DocumentStoreError>>;
    /// Delete a document.
    ///
    /// Deleting a document that doesn't exist succeeds.
    fn delete_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
    ) -> BoxFuture<'a, Result<(), DocumentStoreError>>;
    /// Open a live query.
    ///
    /// The handler is called with the initial result set before this function
    /// returns, and again whenever the result set changes.
    fn subscribe(
        &self,
        query: Query,
        handler: SnapshotHandler,
    ) -> Result<Subscription, DocumentStoreError>;
}

pub type BoxedDocumentStore = Arc<dyn DocumentStore>;

/// Collection names must be non-empty and cannot contain a path separator.
pub(crate) fn check_collection(name: &str) -> Result<(), DocumentStoreError> {
    if name.is_empty() || name.contains('/') {
        Err(DocumentStoreError::InvalidCollection(name.to_owned()))
    } else {
        Ok(())
    }
}
