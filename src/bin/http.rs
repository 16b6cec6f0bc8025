#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use chrono::{Datelike, Local};
    use school_calendar::{CalendarConfig, config::DEFAULT_LOG_FILTER, http_api, seed};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("SCHOOL_CALENDAR_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = CalendarConfig::from_env()?;
    let calendar = seed::demo_calendar_with_config(Local::now().year(), config);
    http_api::serve(addr, calendar).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
