use notelist_web::configuration::CONFIGURATION;
use notelist_web::startup::run;
use notelist_web::telemetry::{get_subscriber, init_tracing};
use std::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(&CONFIGURATION).with(tracing_subscriber::fmt::layer());
    init_tracing(subscriber);

    let address = format!("{}:{}", CONFIGURATION.host, CONFIGURATION.port);
    let listener = TcpListener::bind(&address)?;
    let note_store = CONFIGURATION
        .get_note_store()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    tracing::info!(%address, "Serving notelist");
    run(listener, note_store, CONFIGURATION.debug)?.await
}
