use actix_web::{delete, get, post, web, HttpResponse, Responder};
use notelist::errors::CollectionParseError;
use notelist::view::{AddNoteDialog, FavFilter, ListStatus, NoteItem, NoteListView};
use notelist::{Collection, NoteID, NoteKind, NoteStore};
use serde::Deserialize;

fn collection_error_handler(e: &CollectionParseError) -> HttpResponse {
    match e {
        CollectionParseError::UnknownCollection(_) => HttpResponse::NotFound().body(e.to_string()),
    }
}

fn note_not_found(collection: Collection, note_id: &NoteID) -> HttpResponse {
    HttpResponse::NotFound().body(format!("note `{}` is not in `{}`", note_id, collection))
}

#[derive(Deserialize, Debug)]
struct ListQuery {
    filter: Option<FavFilter>,
}

fn list(store: &NoteStore, status: ListStatus, fav_filter: FavFilter) -> HttpResponse {
    let view = NoteListView { fav_filter, status };
    HttpResponse::Ok().json(view.notes(store))
}

#[get("/notes")]
#[instrument(skip(store))]
async fn get_notes(store: web::Data<NoteStore>, query: web::Query<ListQuery>) -> impl Responder {
    let filter = query.into_inner().filter.unwrap_or_default();
    list(store.get_ref(), ListStatus::Notes, filter)
}

#[get("/trash")]
#[instrument(skip(store))]
async fn get_trash(store: web::Data<NoteStore>) -> impl Responder {
    list(store.get_ref(), ListStatus::Trash, FavFilter::All)
}

#[derive(Deserialize)]
struct NotePostData {
    title: String,
    #[serde(default)]
    content: String,
}

/// Writes are answered with `202 Accepted`: the lists reflect them once the
/// document store echoes them back.
#[post("/note")]
#[instrument(skip(store, note))]
async fn new_note(store: web::Data<NoteStore>, note: web::Json<NotePostData>) -> impl Responder {
    let note = note.into_inner();
    let mut dialog = AddNoteDialog::new();
    dialog.title = note.title;
    dialog.description = note.content;
    dialog.submit(store.get_ref()).await;
    HttpResponse::Accepted().finish()
}

#[derive(Deserialize)]
struct NoteUpdateData {
    title: Option<String>,
    content: Option<String>,
    marked: Option<bool>,
    #[serde(rename = "type")]
    note_type: Option<NoteKind>,
}

#[post("/note/{note_id}")]
#[instrument(
    skip(store, params, update),
    fields(
        note_id = %params.0
    )
)]
async fn update_note(
    store: web::Data<NoteStore>,
    params: web::Path<(String,)>,
    update: web::Json<NoteUpdateData>,
) -> impl Responder {
    let note_id: NoteID = params.into_inner().0.into();
    let found = store
        .find_note(Collection::Notes, &note_id)
        .or_else(|| store.find_note(Collection::Trash, &note_id));
    let mut note = match found {
        Some(note) => note,
        None => return note_not_found(Collection::Notes, &note_id),
    };
    let update = update.into_inner();
    if let Some(title) = update.title {
        note.title = title;
    }
    if let Some(content) = update.content {
        note.content = content;
    }
    if let Some(marked) = update.marked {
        note.marked = marked;
    }
    if let Some(note_type) = update.note_type {
        note.note_type = note_type;
    }
    store.update_note(&note).await;
    HttpResponse::Accepted().finish()
}

#[post("/note/{note_id}/favorite")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn toggle_favorite(
    store: web::Data<NoteStore>,
    params: web::Path<(String,)>,
) -> impl Responder {
    let note_id: NoteID = params.into_inner().0.into();
    match store.find_note(Collection::Notes, &note_id) {
        Some(note) => {
            NoteItem::new(store.get_ref(), note).toggle_favorite().await;
            HttpResponse::Accepted().finish()
        }
        None => note_not_found(Collection::Notes, &note_id),
    }
}

#[post("/note/{note_id}/trash")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn move_to_trash(
    store: web::Data<NoteStore>,
    params: web::Path<(String,)>,
) -> impl Responder {
    let note_id: NoteID = params.into_inner().0.into();
    match store.find_note(Collection::Notes, &note_id) {
        Some(note) => {
            NoteItem::new(store.get_ref(), note).move_to_trash().await;
            HttpResponse::Accepted().finish()
        }
        None => note_not_found(Collection::Notes, &note_id),
    }
}

#[post("/trash/{note_id}/restore")]
#[instrument(
    skip(store, params),
    fields(
        note_id = %params.0
    )
)]
async fn restore(store: web::Data<NoteStore>, params: web::Path<(String,)>) -> impl Responder {
    let note_id: NoteID = params.into_inner().0.into();
    match store.find_note(Collection::Trash, &note_id) {
        Some(note) => {
            NoteItem::new(store.get_ref(), note).restore().await;
            HttpResponse::Accepted().finish()
        }
        None => note_not_found(Collection::Trash, &note_id),
    }
}

#[delete("/{collection}/{note_id}")]
#[instrument(
    skip(store, params),
    fields(
        collection = %params.0,
        note_id = %params.1
    )
)]
async fn delete_note(
    store: web::Data<NoteStore>,
    params: web::Path<(String, String)>,
) -> impl Responder {
    let (collection, note_id) = params.into_inner();
    let collection: Collection = match collection.parse() {
        Ok(c) => c,
        Err(e) => return collection_error_handler(&e),
    };
    store.delete_note(collection, &note_id.into()).await;
    HttpResponse::Accepted().finish()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_notes)
        .service(get_trash)
        .service(new_note)
        .service(update_note)
        .service(toggle_favorite)
        .service(move_to_trash)
        .service(restore)
        .service(delete_note);
}
