//! Process lifecycle: connect, wire, serve, drain.

use std::{future::Future, net::SocketAddr, time::Duration};

use sea_orm::{Database, DatabaseConnection};
use tonic::transport::Server;
use tracing::info;

use crate::{
    config::Config, error::ServerError, repository::SeaOrmUserRepository, schema,
    service::DirectoryService,
};

/// Connect to the database described by `config` and serve until Ctrl-C or
/// SIGTERM.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config.listen_addr()?;
    let db = Database::connect(config.connect_options()).await?;
    if config.create_schema {
        schema::create_tables(&db).await?;
    }

    serve(db, addr, config.request_timeout(), shutdown_signal()).await
}

/// Serve on `addr` until `shutdown` resolves. In-flight requests are allowed
/// to finish; new connections are refused once shutdown has begun.
pub async fn serve<F>(
    db: DatabaseConnection,
    addr: SocketAddr,
    request_timeout: Duration,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let service = DirectoryService::new(SeaOrmUserRepository::new(db.clone()));

    info!(%addr, "grpc server listening");
    Server::builder()
        .timeout(request_timeout)
        .add_service(service.into_server())
        .serve_with_shutdown(addr, shutdown)
        .await?;
    info!("grpc server stopped");

    db.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
