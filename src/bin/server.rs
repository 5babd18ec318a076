use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sutekh::config::{get_config, get_data_dir_path, CliArgs};
use sutekh::{create_app_with_filters, db, run_migrations, FilterSettings};

/// Sets up logging to stdout and, when a data directory exists, to a daily
/// rolling file inside it
///
/// The returned guard flushes the file writer and must live as long as the
/// server.
fn init_tracing(debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "sutekh=debug,tower_http=debug" } else { "sutekh=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let (file_layer, guard) = match get_data_dir_path() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), "sutekh.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = CliArgs::parse();
    let _guard = init_tracing(args.debug);

    let config = get_config(args);

    let pool = Arc::new(db::init_pool(&config.database_url));
    {
        let conn = &mut pool.get()?;
        run_migrations(conn);
    }
    info!("Database ready at {}", config.database_url);

    let app = create_app_with_filters(pool, FilterSettings::from_config(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
