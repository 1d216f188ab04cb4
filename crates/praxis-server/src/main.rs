use crate::opt::{Commands, Db, Run};
use anyhow::Result;
use axum::serve;
use clap::Parser;
use praxis_db::sea_orm::{ConnectOptions, Database};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use std::net::{IpAddr, Ipv4Addr};

mod app;
mod auth;
mod cache;
mod net;
mod opt;
mod permissions;
mod routes;
mod seed;
#[cfg(test)]
mod tests;
mod user;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3030;

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

async fn run(opt: Run) -> Result<()> {
    setup_tracing();

    let pool_options = build_connect_options(&opt.db, opt.database_url.clone());
    let pool = Database::connect(pool_options).await?;

    praxis_db::migration::migrate(&pool)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn std::error::Error, "failed to run migrations"))?;

    let Run { host, port, auth, .. } = opt;

    let app = app::create_app(auth, pool).await?;

    let listener = net::create_listener((host, port), (DEFAULT_HOST, DEFAULT_PORT)).await?;

    let service = app.into_make_service();
    tracing::info!(local_addr = %listener.local_addr()?, "starting app");
    serve::serve(listener, service).await?;
    Ok(())
}

fn build_connect_options(db_options: &Db, db_url: Url) -> ConnectOptions {
    let mut pool_options = ConnectOptions::new(db_url);
    if let Some(min_connections) = db_options.db_min_connections {
        pool_options.min_connections(min_connections);
    }
    if let Some(max_connections) = db_options.db_max_connections {
        pool_options.max_connections(max_connections);
    }
    pool_options.sqlx_logging_level(log::LevelFilter::Debug);
    pool_options
}

fn main() -> Result<()> {
    let main = async {
        let opt = opt::Cli::parse();

        match opt.command {
            Commands::Run(o) => run(o).await?,
            Commands::Seed(o) => seed::run(o).await?,
        }
        Ok(())
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
