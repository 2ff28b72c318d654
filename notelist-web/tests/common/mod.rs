use lazy_static::lazy_static;
use notelist::{InMemoryDocumentStore, NoteStore};
use notelist_web::configuration::CONFIGURATION;
use notelist_web::startup::run;
use notelist_web::telemetry::{get_subscriber, init_tracing};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;

lazy_static! {
    static ref TRACING: () = {
        let subscriber = get_subscriber(&*CONFIGURATION)
            .with(tracing_subscriber::fmt::Layer::default().with_test_writer());
        init_tracing(subscriber);
    };
}

pub struct TestApp {
    pub address: String,
}

/// Start a server on a random port, backed by an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // We retrieve the port assigned to us by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);
    lazy_static::initialize(&TRACING);

    let note_store = NoteStore::with_config(
        Arc::new(InMemoryDocumentStore::new()),
        CONFIGURATION.note_store_config(),
    )
    .expect("Failed to subscribe to the document store");
    let server = run(listener, note_store, true).expect("Failed to bind address");
    let _ = tokio::spawn(server);
    TestApp { address }
}
