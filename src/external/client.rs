use std::sync::LazyLock;
use std::time::Duration;

/// Global HTTP client shared by the webhook client and the SMS gateway
///
/// This client is initialized lazily on first access and reused across the application.
///
/// # Benefits
/// - **Connection pooling**: Reuses TCP connections for better performance
/// - **Memory efficiency**: Single client instance for the entire application
///
/// # Features
/// - **Compression**: Supports gzip compression
/// - **HTTP/2**: HTTP/2 support with keep-alive
/// - **Timeouts**: 30s request timeout, 10s connect timeout; callers may
///   override the request timeout per request
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// async fn ping(url: &str) -> Result<bool, reqwest::Error> {
///     let response = HTTP_CLIENT.post(url).json(&serde_json::json!({"text": "ping"})).send().await?;
///     Ok(response.status().is_success())
/// }
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(concat!("message-notify/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
});
