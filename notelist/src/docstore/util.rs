use crate::docstore::DocumentStore;
use crate::errors::DocumentStoreError;
use crate::note::{Note, NoteKind};
use crate::notestore::Collection;

/// Fill a store with a few notes, so that a development instance has something to show.
pub async fn populate_test_data(store: &dyn DocumentStore) -> Result<(), DocumentStoreError> {
    let mut welcome = Note::new(
        "Welcome".to_owned(),
        "Mark a note as favorite, or move it to the trash.".to_owned(),
    );
    welcome.marked = true;
    let groceries = Note::new("Buy milk".to_owned(), "".to_owned());
    let mut old = Note::new("Old idea".to_owned(), "Not that good after all".to_owned());
    old.note_type = NoteKind::Trash;

    for note in [&welcome, &groceries] {
        store
            .add_document(Collection::Notes.as_str(), note.to_document())
            .await?;
    }
    store
        .add_document(Collection::Trash.as_str(), old.to_document())
        .await?;
    Ok(())
}
