use redis::aio::ConnectionManager;
use redis::Client;

/// Open the shared cache connection
///
/// `ConnectionManager` multiplexes one reconnecting connection across tasks;
/// callers clone it freely. Failure here is not fatal to startup when the
/// rate limiter is configured fail-open, so the caller decides what to do
/// with the error.
pub async fn init_cache(redis_url: &str) -> Result<ConnectionManager, std::io::Error> {
    let client = Client::open(redis_url)
        .map_err(|e| std::io::Error::other(format!("Invalid redis URL: {}", e)))?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to redis: {}", e)))?;

    tracing::info!("Connected to cache");

    Ok(manager)
}
