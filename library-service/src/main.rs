//! Library gRPC Service
//!
//! Serves the `library.Library` gRPC service for managing books and their
//! authors, backed by `PostgreSQL` or an in-memory store.

use std::sync::Arc;

use tonic::transport::Server;
use tracing::info;

use library_api::v1::library_server::LibraryServer;
use library_service::{
    adapter::LibraryAdapter,
    catalog::Catalog,
    config::{AppConfig, DatabaseConfig},
    error::AppResult,
    repository::{
        AuthorRepositoryArc, BookRepositoryArc, memory::MemoryRepository,
        postgres::PostgresRepository,
    },
    tracing::tracer::Tracer,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::load()?;

    Tracer::install(&config)?;

    info!(
        "Starting {} v{}",
        config.distribution.name,
        config.distribution.version.as_deref().unwrap_or("unknown"),
    );

    start(&config).await?;

    Ok(())
}

async fn start(config: &AppConfig) -> AppResult<()> {
    let (author_repository, book_repository): (AuthorRepositoryArc, BookRepositoryArc) =
        match &config.database {
            DatabaseConfig::Memory => {
                let repository = Arc::new(MemoryRepository::new());
                (
                    Arc::clone(&repository) as AuthorRepositoryArc,
                    repository as BookRepositoryArc,
                )
            }
            DatabaseConfig::Postgres(postgres_config) => {
                let repository = Arc::new(PostgresRepository::connect(postgres_config)?);
                (
                    Arc::clone(&repository) as AuthorRepositoryArc,
                    repository as BookRepositoryArc,
                )
            }
        };

    let catalog = Catalog::new(author_repository, book_repository);
    let library_adapter = LibraryAdapter::new(catalog);

    let grpc_server = Server::builder().add_service(LibraryServer::new(library_adapter));

    info!("gRPC server started at {}", config.server.grpc_address);

    grpc_server
        .serve_with_shutdown(config.server.grpc_address, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;

    Ok(())
}
