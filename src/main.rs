use tracing::info;

use vehicledb::{Config, Database, WebServer};

#[tokio::main]
async fn main() {
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config.toml: {e}");
            eprintln!("using default configuration");
            Config::default()
        }
    };

    vehicledb::logging::init(&config.logging.level);

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("failed to open database: {e}");
            std::process::exit(1);
        }
    };

    info!("starting vehicledb");
    let server = WebServer::new(&config, db);
    if let Err(e) = server.run().await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
