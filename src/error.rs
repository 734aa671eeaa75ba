use sea_orm::DbErr;
use thiserror::Error;

/// An error from the user repository.
///
/// A missing row is not an error: lookups return `None` and mutations report
/// whether a row was touched.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The patch carried no field to change; nothing was sent to the database.
    #[error("nothing to update")]
    NothingToUpdate,
    /// The database call itself failed.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// An error raised while bringing the server up or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid listen address `{0}`")]
    ListenAddr(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}
