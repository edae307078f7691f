pub mod address;
pub mod config;
pub mod err;
pub mod models;
pub mod pg;
pub mod routes;
pub mod store;
pub mod student;
pub mod validation;

use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::{Extension, Router};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;

use crate::config::Config;
use crate::err::{Error, Fine, Maybe, Nothing};
use crate::pg::PgStudentStore;
use crate::store::{MemoryStudentStore, SharedStore};

pub type Payload<T> = Result<Maybe<T>, Error>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Fine(value))
}

pub fn breaks<V>(err: Error) -> Payload<V>
where
    V: Serialize,
{
    Ok(Nothing(err))
}

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/students",
            get(routes::list_students).post(routes::create_student),
        )
        .route(
            "/students/:id",
            get(routes::read_student)
                .put(routes::update_student)
                .delete(routes::delete_student),
        )
        .fallback(err::handler404.into_service())
        .layer(ServiceBuilder::new().layer(Extension(store)))
}

async fn connect(config: &Config) -> anyhow::Result<SharedStore> {
    let url = if let Some(url) = &config.database_url {
        url
    } else {
        log::warn!("DATABASE_URL is not set, students are kept in memory only");
        return Ok(Arc::new(MemoryStudentStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;
    let store = PgStudentStore::new(pool);
    store.migrate().await?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::from_env()?;
    let store = connect(&config).await?;

    log::info!("Starting student registry on http://{}", config.bind_addr);
    axum::Server::bind(&config.bind_addr)
        .serve(app(store).into_make_service())
        .await?;
    Ok(())
}
