//! View models of the note list, a single note, and the add-note dialog.
//!
//! These hold the little state the views own themselves and turn user actions
//! into calls on the [`NoteStore`].
use crate::note::{Note, NoteKind};
use crate::notestore::{Collection, NoteStore};
use serde::{Deserialize, Serialize};

/// Which notes of the selected list are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FavFilter {
    #[default]
    All,
    Fav,
}

impl FavFilter {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            FavFilter::All => true,
            FavFilter::Fav => note.marked,
        }
    }
}

/// Which list is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    #[default]
    Notes,
    Trash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListView {
    pub fav_filter: FavFilter,
    pub status: ListStatus,
}

impl NoteListView {
    pub fn new() -> Self {
        Default::default()
    }

    /// The notes to render, after the favorite filter.
    pub fn notes(&self, store: &NoteStore) -> Vec<Note> {
        let notes = match self.status {
            ListStatus::Notes => store.normal_notes(),
            ListStatus::Trash => store.trash_notes(),
        };
        notes
            .into_iter()
            .filter(|n| self.fav_filter.matches(n))
            .collect()
    }

    pub fn change_fav_filter(&mut self, filter: FavFilter) {
        self.fav_filter = filter;
    }

    /// Switch between the notes and the trash.
    ///
    /// The trash has no favorites, so entering it resets the filter.
    pub fn change_trash_status(&mut self) {
        if self.status == ListStatus::Trash {
            self.status = ListStatus::Notes;
        } else {
            self.status = ListStatus::Trash;
            self.fav_filter = FavFilter::All;
        }
    }
}

/// Actions on a single rendered note.
pub struct NoteItem<'a> {
    store: &'a NoteStore,
    pub note: Note,
}

impl<'a> NoteItem<'a> {
    pub fn new(store: &'a NoteStore, note: Note) -> Self {
        NoteItem { store, note }
    }

    pub async fn toggle_favorite(&mut self) {
        self.note.marked = !self.note.marked;
        self.store.update_note(&self.note).await;
    }

    /// Move an active note to the trash.
    ///
    /// The note is written to the trash first and then removed from the active
    /// collection. A note without an ID is ignored.
    pub async fn move_to_trash(&mut self) {
        if self.note.id.is_empty() {
            return;
        }
        let id = self.note.id.clone();
        self.note.note_type = NoteKind::Trash;
        self.store.add_note(&self.note, Collection::Trash).await;
        self.store.delete_note(Collection::Notes, &id).await;
    }

    /// Move a trashed note back to the active collection.
    pub async fn restore(&mut self) {
        if self.note.id.is_empty() {
            return;
        }
        let id = self.note.id.clone();
        self.note.note_type = NoteKind::Note;
        self.store.add_note(&self.note, Collection::Notes).await;
        self.store.delete_note(Collection::Trash, &id).await;
    }

    pub async fn delete_permanently(&self) {
        if self.note.id.is_empty() {
            return;
        }
        self.store
            .delete_note(Collection::Trash, &self.note.id)
            .await;
    }

    pub async fn save_edit(&mut self, title: String, content: String) {
        self.note.title = title;
        self.note.content = content;
        self.store.update_note(&self.note).await;
    }
}

type CloseListener = Box<dyn Fn(bool) + Send + Sync>;

/// The dialog that creates a note.
#[derive(Default)]
pub struct AddNoteDialog {
    pub title: String,
    pub description: String,
    on_closed: Option<CloseListener>,
}

impl AddNoteDialog {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register the listener told about closing.
    ///
    /// It always receives `false`: the dialog is no longer open.
    pub fn on_closed(mut self, listener: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_closed = Some(Box::new(listener));
        self
    }

    /// Create the note and close.
    pub async fn submit(&mut self, store: &NoteStore) {
        let note = Note {
            title: self.title.clone(),
            content: self.description.clone(),
            marked: false,
            note_type: NoteKind::Note,
            ..Default::default()
        };
        store.add_note(&note, Collection::Notes).await;
        self.close();
    }

    /// Discard the input and close.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.title.clear();
        self.description.clear();
        if let Some(listener) = &self.on_closed {
            listener(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::InMemoryDocumentStore;
    use crate::NoteID;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn store() -> NoteStore {
        NoteStore::new(Arc::new(InMemoryDocumentStore::new())).unwrap()
    }

    async fn add(store: &NoteStore, title: &str, marked: bool) -> Note {
        let mut note = Note::new(title.to_owned(), "".to_owned());
        note.marked = marked;
        store.add_note(&note, Collection::Notes).await;
        store
            .normal_notes()
            .into_iter()
            .find(|n| n.title == title)
            .unwrap()
    }

    #[test]
    fn fav_filter_predicate() {
        let mut note = Note::new("t".to_owned(), "".to_owned());
        assert!(FavFilter::All.matches(&note));
        assert!(!FavFilter::Fav.matches(&note));
        note.marked = true;
        assert!(FavFilter::Fav.matches(&note));
    }

    #[test]
    fn trash_resets_filter() {
        let mut view = NoteListView::new();
        view.change_fav_filter(FavFilter::Fav);
        view.change_trash_status();
        assert_eq!(view.status, ListStatus::Trash);
        assert_eq!(view.fav_filter, FavFilter::All);
        view.change_fav_filter(FavFilter::Fav);
        view.change_trash_status();
        assert_eq!(view.status, ListStatus::Notes);
        assert_eq!(view.fav_filter, FavFilter::Fav);
    }

    #[tokio::test]
    async fn list_applies_filter_and_status() {
        let store = store();
        add(&store, "plain", false).await;
        add(&store, "fav", true).await;
        let mut view = NoteListView::new();
        assert_eq!(view.notes(&store).len(), 2);
        view.change_fav_filter(FavFilter::Fav);
        let favs = view.notes(&store);
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].title, "fav");
        view.change_trash_status();
        assert!(view.notes(&store).is_empty());
    }

    #[tokio::test]
    async fn toggle_favorite() {
        let store = store();
        let note = add(&store, "a", false).await;
        let mut item = NoteItem::new(&store, note);
        item.toggle_favorite().await;
        assert!(store.normal_notes()[0].marked);
        item.toggle_favorite().await;
        assert!(!store.normal_notes()[0].marked);
    }

    #[tokio::test]
    async fn trash_and_restore() {
        let store = store();
        let note = add(&store, "a", true).await;
        let mut item = NoteItem::new(&store, note);
        item.move_to_trash().await;
        assert!(store.normal_notes().is_empty());
        let trashed = store.trash_notes();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].note_type, NoteKind::Trash);
        assert_eq!(trashed[0].title, "a");
        assert!(trashed[0].marked);

        let mut item = NoteItem::new(&store, trashed[0].clone());
        item.restore().await;
        assert!(store.trash_notes().is_empty());
        let restored = store.normal_notes();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].note_type, NoteKind::Note);
        assert!(restored[0].marked);
        assert_ne!(restored[0].id, trashed[0].id);
    }

    #[tokio::test]
    async fn unsaved_note_actions_are_ignored() {
        let store = store();
        let kept = add(&store, "kept", false).await;
        let mut item = NoteItem::new(&store, Note::new("draft".to_owned(), "".to_owned()));
        item.move_to_trash().await;
        assert!(store.trash_notes().is_empty());
        assert_eq!(store.normal_notes(), vec![kept.clone()]);

        let mut draft = Note::new("draft".to_owned(), "".to_owned());
        draft.note_type = NoteKind::Trash;
        let mut item = NoteItem::new(&store, draft);
        item.restore().await;
        item.delete_permanently().await;
        assert!(store.trash_notes().is_empty());
        assert_eq!(store.normal_notes(), vec![kept]);
    }

    #[tokio::test]
    async fn delete_permanently() {
        let store = store();
        let note = add(&store, "a", false).await;
        let mut item = NoteItem::new(&store, note);
        item.move_to_trash().await;
        let item = NoteItem::new(&store, store.trash_notes().remove(0));
        item.delete_permanently().await;
        assert!(store.trash_notes().is_empty());
        assert!(store.normal_notes().is_empty());
    }

    #[tokio::test]
    async fn edit_note() {
        let store = store();
        let note = add(&store, "a", false).await;
        let mut item = NoteItem::new(&store, note);
        item.save_edit("b".to_owned(), "body".to_owned()).await;
        let notes = store.normal_notes();
        assert_eq!(notes[0].title, "b");
        assert_eq!(notes[0].content, "body");
    }

    #[tokio::test]
    async fn dialog_submit() {
        let store = store();
        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        let mut dialog = AddNoteDialog::new().on_closed(move |open| {
            assert!(!open);
            c.fetch_add(1, Ordering::SeqCst);
        });
        dialog.title = "Buy milk".to_owned();
        dialog.submit(&store).await;
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(dialog.title.is_empty());
        let notes = store.normal_notes();
        assert_eq!(notes.len(), 1);
        assert_ne!(notes[0].id, NoteID::default());
        assert_eq!(notes[0].title, "Buy milk");
        assert_eq!(notes[0].content, "");
        assert!(!notes[0].marked);
    }

    #[tokio::test]
    async fn dialog_cancel() {
        let store = store();
        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        let mut dialog = AddNoteDialog::new().on_closed(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        dialog.title = "draft".to_owned();
        dialog.description = "text".to_owned();
        dialog.cancel();
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(dialog.title.is_empty());
        assert!(dialog.description.is_empty());
        assert!(store.normal_notes().is_empty());
    }
}
