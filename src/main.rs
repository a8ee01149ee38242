use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use varscore::config::Settings;
use varscore::core::{ClassificationParams, VariantAnalyzer, WindowFetcher};
use varscore::routes::{self, handle_json_payload_error, AppState};
use varscore::services::{RemoteOracle, RetryPolicy, UcscClient, WindowCache};

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        startup_error("Configuration error", e)
    })?;

    init_logging(&settings);

    info!("Starting varscore variant analysis service...");

    let retry = RetryPolicy::from(&settings.retry);

    let ucsc = UcscClient::new(
        settings.ucsc.base_url.clone(),
        settings.ucsc_timeout(),
        retry.idle_timeout,
    )
    .map_err(|e| {
        error!("Failed to create sequence client: {}", e);
        startup_error("Sequence client error", e)
    })?;

    info!("Sequence client initialized ({})", ucsc.base_url());

    let mut fetcher = WindowFetcher::new(ucsc, settings.window.size)
        .with_strict_length(settings.window.strict_length);

    if settings.cache.window_cache_size > 0 {
        fetcher = fetcher.with_cache(WindowCache::new(
            settings.cache.window_cache_size,
            settings.cache.ttl_secs,
        ));
        info!(
            "Window cache enabled ({} entries, TTL: {}s)",
            settings.cache.window_cache_size, settings.cache.ttl_secs
        );
    }

    // The oracle is created here once and never replaced
    let oracle = RemoteOracle::new(
        settings.oracle.endpoint.clone(),
        settings.oracle.model.clone(),
        settings.oracle_timeout(),
        retry.idle_timeout,
        settings.oracle.max_concurrent_requests,
    )
    .map_err(|e| {
        error!("Failed to create oracle client: {}", e);
        startup_error("Oracle client error", e)
    })?;

    info!(
        "Oracle client initialized (model: {}, max in-flight: {})",
        oracle.model(),
        settings.oracle.max_concurrent_requests
    );

    let params = ClassificationParams::from(&settings.classification);
    info!("Classification parameters: {:?}", params);

    let app_state = AppState {
        analyzer: Arc::new(VariantAnalyzer::new(fetcher, oracle, params)),
        retry,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let keep_alive = Duration::from_secs(settings.retry.idle_timeout_secs);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .keep_alive(keep_alive)
    .bind((host, port))?
    .run()
    .await
}
