use std::{process, sync::Arc};

use folio::{
    application::{
        content::{ContentService, Producers},
        error::AppError,
        import::import_content,
        page::PageDataService,
        repos::{DocumentsRepo, DocumentsWriteRepo},
    },
    cache::{CacheAside, CacheBackend, CacheConfig, CacheStore, MemoryStore},
    config,
    infra::{
        cache_warmer::CacheWarmer,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        redis::RedisStore,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Warm(_) => run_warm(settings).await,
        config::Command::Import(args) => run_import(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let page = build_page_service(repositories.clone(), &settings).await?;

    if settings.cache.warm_on_startup && page.content().is_cached() {
        // A cold cache only costs latency; failures here are not fatal.
        if let Err(err) = CacheWarmer::new(page.clone()).warm().await {
            warn!(
                target = "folio::serve",
                error = %err,
                "Startup cache warmup failed"
            );
        }
    }

    let documents: Arc<dyn DocumentsRepo> = repositories;
    let state = ApiState::new(page, documents, settings.page.revalidate);
    serve_http(&settings, state).await
}

async fn run_warm(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let page = build_page_service(repositories, &settings).await?;

    if !page.content().is_cached() {
        warn!(
            target = "folio::warm",
            "Cache is disabled; warming only verifies that content loads"
        );
    }

    CacheWarmer::new(page)
        .warm()
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    Ok(())
}

async fn run_import(settings: config::Settings, args: config::ImportArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let path = args.file;

    info!(
        target = "folio::import",
        path = %path.display(),
        "Starting import"
    );

    let writer: Arc<dyn DocumentsWriteRepo> = repositories;
    let summary = import_content(writer.as_ref(), &path).await?;

    info!(
        target = "folio::import",
        documents = summary.documents,
        "Import completed. Cached entries expire on their own TTL."
    );
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

/// Pick the cache store for the configured backend. An unreachable Redis
/// leaves the cache disabled rather than failing startup.
async fn init_cache_store(
    cache_config: &CacheConfig,
    settings: &config::CacheSettings,
) -> Option<Arc<dyn CacheStore>> {
    match cache_config.backend {
        CacheBackend::Memory => Some(Arc::new(MemoryStore::new(cache_config))),
        CacheBackend::Disabled => None,
        CacheBackend::Redis => {
            let url = settings.url.as_deref()?;
            match RedisStore::connect(url).await {
                Ok(store) => Some(Arc::new(store)),
                Err(err) => {
                    warn!(
                        target = "folio::cache",
                        error = %err,
                        "Redis is unreachable; running without a cache"
                    );
                    None
                }
            }
        }
    }
}

async fn build_page_service(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<Arc<PageDataService>, AppError> {
    let cache_config = CacheConfig::from(&settings.cache);
    let store = init_cache_store(&cache_config, &settings.cache).await;
    let cache = CacheAside::from_config(&cache_config, store);

    info!(
        target = "folio::cache",
        backend = %cache_config.backend,
        enabled = cache.is_enabled(),
        default_ttl_secs = cache_config.default_ttl.as_secs(),
        "Cache configured"
    );

    let documents: Arc<dyn DocumentsRepo> = repositories;
    let content = ContentService::new(
        Producers::new(documents),
        cache,
        &cache_config.key_prefix,
        settings.page.producer_timeout,
    )
    .map_err(|err| AppError::validation(err.to_string()))?;

    Ok(Arc::new(PageDataService::new(content)))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "folio::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "folio::serve", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "folio::serve",
            error = %err,
            "Failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
}
