use actix_web::{get, web, HttpResponse};
use notelist::NoteStore;
use serde_json::json;

#[get("/health_check")]
#[instrument(skip(store))]
async fn health_check(store: web::Data<NoteStore>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "notes": store.normal_notes().len(),
        "trash": store.trash_notes().len(),
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
}
