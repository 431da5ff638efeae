//! The folio binary: an in-memory author/book catalogue served over HTTP.
//!
//! Reads `folio.toml` from the current directory when present (host and
//! port, defaulting to 127.0.0.1:8080), then serves until interrupted.
//! The catalogue lives in memory only; stopping the process discards it.

use std::path::Path;
use std::process;
use std::sync::Arc;

use folio_base::http::{HttpServer, HttpServerConfig};
use folio_base::tracing::init_tracing;
use folio_engine::{Catalogue, CatalogueService, load_config};

fn main() {
    init_tracing().unwrap();

    let config = match load_config(Path::new("folio.toml")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config from folio.toml: {}", e);
            process::exit(1);
        }
    };

    let catalogue = Catalogue::new();
    let service = CatalogueService::new(catalogue);

    let server_config = HttpServerConfig::new(config.host.clone()).with_port(config.port);
    let server = match HttpServer::bind(server_config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: Failed to start HTTP server: {}", e);
            process::exit(1);
        }
    };

    println!(
        "folio catalogue listening on http://{}:{}",
        config.host,
        server.port()
    );

    if let Err(e) = server.serve(Arc::new(service)) {
        eprintln!("Error: HTTP server failed: {}", e);
        process::exit(1);
    }
}
