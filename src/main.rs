pub mod auth;
pub mod config;
pub mod err;
pub mod models;
pub mod registry;
pub mod store;

use std::sync::Arc;

use axum::Json;
use clap::Parser;
use serde::Serialize;

use crate::config::Config;
use crate::err::Error;
use crate::store::{PgStudentStore, SharedStore};

pub type Payload<T> = Result<Json<T>, Error>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Json(value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();

    let store: SharedStore = Arc::new(PgStudentStore::connect_lazy(
        &config.database_url,
        config.max_connections,
        config.acquire_timeout(),
    )?);
    let app = registry::router(&config.path, store);

    log::info!(
        "Starting Student Registry HTTP Server on http://{}{}",
        config.bind,
        config.path
    );
    axum::Server::bind(&config.bind)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
