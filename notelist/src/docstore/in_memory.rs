//! In-memory document store with live queries
use crate::docstore::{
    check_collection, Document, DocumentRef, DocumentSnapshot, DocumentStore, Query,
    SnapshotHandler, Subscription,
};
use crate::errors::DocumentStoreError;
use futures::future::BoxFuture;
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use uuid::Uuid;

type ListenerID = u64;

struct Listener {
    query: Query,
    handler: Arc<SnapshotHandler>,
    /// The result set the handler saw last.
    last: Vec<DocumentSnapshot>,
}

/// Pending calls to listeners, collected while the store is locked.
type Deliveries = Vec<(Arc<SnapshotHandler>, Vec<DocumentSnapshot>)>;

#[derive(Default)]
struct InMemoryDocumentStoreInner {
    collections: HashMap<String, BTreeMap<String, Document>>,
    listeners: HashMap<ListenerID, Listener>,
    next_listener: ListenerID,
}

impl InMemoryDocumentStoreInner {
    /// Generate a new document key.
    ///
    /// We use the UUID V4 scheme.
    fn get_new_key(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn run_query(&self, query: &Query) -> Vec<DocumentSnapshot> {
        match self.collections.get(query.get_collection()) {
            Some(docs) => query.apply(docs),
            None => vec![],
        }
    }

    fn add_document(
        &mut self,
        collection: &str,
        data: Document,
    ) -> Result<String, DocumentStoreError> {
        check_collection(collection)?;
        let key = self.get_new_key();
        let docs = self.collections.entry(collection.to_owned()).or_default();
        // sanity check
        assert!(!docs.contains_key(&key));
        docs.insert(key.clone(), data);
        Ok(key)
    }

    fn get_document(&self, doc_ref: &DocumentRef) -> Result<Option<Document>, DocumentStoreError> {
        check_collection(&doc_ref.collection)?;
        Ok(self
            .collections
            .get(&doc_ref.collection)
            .and_then(|docs| docs.get(&doc_ref.key))
            .cloned())
    }

    fn update_document(
        &mut self,
        doc_ref: &DocumentRef,
        data: Document,
    ) -> Result<(), DocumentStoreError> {
        check_collection(&doc_ref.collection)?;
        let doc = self
            .collections
            .get_mut(&doc_ref.collection)
            .and_then(|docs| docs.get_mut(&doc_ref.key))
            .ok_or_else(|| DocumentStoreError::DocumentNotExist(doc_ref.clone()))?;
        doc.extend(data);
        Ok(())
    }

    fn delete_document(&mut self, doc_ref: &DocumentRef) -> Result<(), DocumentStoreError> {
        check_collection(&doc_ref.collection)?;
        if let Some(docs) = self.collections.get_mut(&doc_ref.collection) {
            docs.remove(&doc_ref.key);
        }
        Ok(())
    }

    fn add_listener(&mut self, query: Query, handler: SnapshotHandler) -> (ListenerID, Deliveries) {
        let id = self.next_listener;
        self.next_listener += 1;
        let initial = self.run_query(&query);
        let handler = Arc::new(handler);
        self.listeners.insert(
            id,
            Listener {
                query,
                handler: handler.clone(),
                last: initial.clone(),
            },
        );
        (id, vec![(handler, initial)])
    }

    /// Refresh the listeners on a collection whose result set changed.
    fn changed_listeners(&mut self, collection: &str) -> Deliveries {
        let mut deliveries = vec![];
        let collections = &self.collections;
        for listener in self.listeners.values_mut() {
            if listener.query.get_collection() != collection {
                continue;
            }
            let result = match collections.get(collection) {
                Some(docs) => listener.query.apply(docs),
                None => vec![],
            };
            if result != listener.last {
                listener.last = result.clone();
                deliveries.push((listener.handler.clone(), result));
            }
        }
        deliveries
    }
}

/// In-memory document store.
///
/// This is mostly designed for development and testing use, because there is
/// no persistence layer.
/// Listeners are notified synchronously, after the mutation that changed their
/// result set and before the mutating call completes.
pub struct InMemoryDocumentStore {
    ims: Arc<RwLock<InMemoryDocumentStoreInner>>,
    /// Serializes a mutation together with the deliveries it causes, so that
    /// every listener sees snapshots in the order the mutations happened.
    /// Reentrant because a handler may itself subscribe.
    delivery: ReentrantMutex<()>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        InMemoryDocumentStore {
            ims: Arc::new(RwLock::new(Default::default())),
            delivery: ReentrantMutex::new(()),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.ims.read().listeners.len()
    }

    /// Apply a mutation and notify the listeners of `collection`.
    ///
    /// Handlers are called after the store lock is released.
    fn mutate<R, F>(&self, collection: &str, op: F) -> Result<R, DocumentStoreError>
    where
        F: FnOnce(&mut InMemoryDocumentStoreInner) -> Result<R, DocumentStoreError>,
    {
        let _delivery = self.delivery.lock();
        let (result, deliveries) = {
            let mut ims = self.ims.write();
            let result = op(&mut *ims)?;
            (result, ims.changed_listeners(collection))
        };
        deliver(deliveries);
        Ok(result)
    }
}

fn deliver(deliveries: Deliveries) {
    for (handler, snapshot) in deliveries {
        handler(&snapshot);
    }
}

fn remove_listener(ims: &Weak<RwLock<InMemoryDocumentStoreInner>>, id: ListenerID) {
    if let Some(ims) = ims.upgrade() {
        ims.write().listeners.remove(&id);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn add_document<'a>(
        &'a self,
        collection: &'a str,
        data: Document,
    ) -> BoxFuture<'a, Result<String, DocumentStoreError>> {
        Box::pin(async move { self.mutate(collection, |ims| ims.add_document(collection, data)) })
    }

    fn get_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
    ) -> BoxFuture<'a, Result<Option<Document>, DocumentStoreError>> {
        Box::pin(async move { self.ims.read().get_document(doc_ref) })
    }

    fn update_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
        data: Document,
    ) -> BoxFuture<'a, Result<(), DocumentStoreError>> {
        Box::pin(async move {
            self.mutate(&doc_ref.collection, |ims| ims.update_document(doc_ref, data))
        })
    }

    fn delete_document<'a>(
        &'a self,
        doc_ref: &'a DocumentRef,
    ) -> BoxFuture<'a, Result<(), DocumentStoreError>> {
        Box::pin(async move { self.mutate(&doc_ref.collection, |ims| ims.delete_document(doc_ref)) })
    }

    fn subscribe(
        &self,
        query: Query,
        handler: SnapshotHandler,
    ) -> Result<Subscription, DocumentStoreError> {
        check_collection(query.get_collection())?;
        let _delivery = self.delivery.lock();
        let (id, deliveries) = self.ims.write().add_listener(query, handler);
        deliver(deliveries);
        let ims = Arc::downgrade(&self.ims);
        Ok(Subscription::new(move || remove_listener(&ims, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    /// Subscribe and record every snapshot as a list of keys.
    fn record(store: &InMemoryDocumentStore, query: Query) -> (Subscription, Arc<Mutex<Vec<Vec<String>>>>) {
        let seen = Arc::new(Mutex::new(vec![]));
        let s = seen.clone();
        let sub = store
            .subscribe(
                query,
                Box::new(move |snapshot: &[DocumentSnapshot]| {
                    s.lock()
                        .push(snapshot.iter().map(|d| d.key.clone()).collect());
                }),
            )
            .unwrap();
        (sub, seen)
    }

    #[tokio::test]
    async fn unique_key() {
        let store = InMemoryDocumentStore::new();
        let k1 = store.add_document("notes", Document::new()).await.unwrap();
        let k2 = store.add_document("notes", Document::new()).await.unwrap();
        assert_ne!(k1, k2);
    }

    #[tokio::test]
    async fn add_and_get() {
        let store = InMemoryDocumentStore::new();
        let data = doc(json!({"title": "Foo"}));
        let key = store.add_document("notes", data.clone()).await.unwrap();
        let fetched = store
            .get_document(&DocumentRef::new("notes", key.clone()))
            .await
            .unwrap();
        assert_eq!(fetched, Some(data));
        assert_eq!(
            store
                .get_document(&DocumentRef::new("trash", key))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = InMemoryDocumentStore::new();
        let key = store
            .add_document("notes", doc(json!({"title": "Foo", "extra": 1})))
            .await
            .unwrap();
        let doc_ref = DocumentRef::new("notes", key);
        store
            .update_document(&doc_ref, doc(json!({"title": "Bar"})))
            .await
            .unwrap();
        assert_eq!(
            store.get_document(&doc_ref).await.unwrap(),
            Some(doc(json!({"title": "Bar", "extra": 1})))
        );
    }

    #[tokio::test]
    async fn update_missing_document() {
        let store = InMemoryDocumentStore::new();
        let res = store
            .update_document(&DocumentRef::new("notes", "nope"), Document::new())
            .await;
        assert!(matches!(res, Err(DocumentStoreError::DocumentNotExist(_))));
    }

    #[tokio::test]
    async fn delete_missing_document_succeeds() {
        let store = InMemoryDocumentStore::new();
        store
            .delete_document(&DocumentRef::new("trash", "nope"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_collection() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            store.add_document("", Document::new()).await,
            Err(DocumentStoreError::InvalidCollection(_))
        ));
        assert!(store
            .subscribe(Query::collection("a/b"), Box::new(|_: &[DocumentSnapshot]| {}))
            .is_err());
    }

    #[tokio::test]
    async fn initial_snapshot_then_changes() {
        let store = InMemoryDocumentStore::new();
        let k1 = store.add_document("notes", Document::new()).await.unwrap();
        let (_sub, seen) = record(&store, Query::collection("notes"));
        assert_eq!(*seen.lock(), vec![vec![k1.clone()]]);

        let k2 = store.add_document("notes", Document::new()).await.unwrap();
        let mut both = vec![k1.clone(), k2.clone()];
        both.sort();
        assert_eq!(seen.lock().last().unwrap(), &both);

        store
            .delete_document(&DocumentRef::new("notes", k1))
            .await
            .unwrap();
        assert_eq!(seen.lock().last().unwrap(), &vec![k2]);
        assert_eq!(seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn other_collections_do_not_notify() {
        let store = InMemoryDocumentStore::new();
        let (_sub, seen) = record(&store, Query::collection("notes"));
        store.add_document("trash", Document::new()).await.unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn invisible_changes_do_not_notify() {
        let store = InMemoryDocumentStore::new();
        let (_sub, seen) = record(
            &store,
            Query::collection("notes").where_eq("type", "note"),
        );
        store
            .add_document("notes", doc(json!({"type": "trash"})))
            .await
            .unwrap();
        assert_eq!(seen.lock().len(), 1);
        store
            .add_document("notes", doc(json!({"type": "note"})))
            .await
            .unwrap();
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[1].len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let store = InMemoryDocumentStore::new();
        let (sub, seen) = record(&store, Query::collection("notes"));
        assert_eq!(store.listener_count(), 1);
        sub.unsubscribe();
        assert_eq!(store.listener_count(), 0);
        store.add_document("notes", Document::new()).await.unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn subscription_outlives_store() {
        let store = InMemoryDocumentStore::new();
        let (sub, _seen) = record(&store, Query::collection("notes"));
        drop(store);
        sub.unsubscribe();
    }
}
