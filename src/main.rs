use std::sync::Arc;

use poem::{listener::TcpListener, Server};
use pulsestream::config::{
    cache::init_cache, database::init_database, setup_tracing, ApplicationSettings,
    SystemEnvironment,
};
use pulsestream::AppData;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    setup_tracing().expect("Failed to initialize tracing");

    let settings = ApplicationSettings::from_env(&SystemEnvironment)
        .map_err(|e| std::io::Error::other(format!("Invalid configuration: {}", e)))?;

    let db = init_database(&settings.database_url).await?;
    let cache = init_cache(&settings.redis_url).await?;

    let bind_address = settings.bind_address();
    let app_data = Arc::new(AppData::init(db, cache, settings));

    let routes = pulsestream::get_routes(app_data);

    let listener = TcpListener::bind(&bind_address);
    tracing::info!("Starting server on http://{}", bind_address);
    tracing::info!("Swagger UI available at http://{}/swagger", bind_address);

    Server::new(listener).run(routes).await
}
