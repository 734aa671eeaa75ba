//! Table bootstrap for fresh databases and tests.
//!
//! Statements are derived from the entity definitions and guarded with
//! `IF NOT EXISTS`, so running this against an initialised database is a
//! no-op. Schema evolution is out of scope.

use entity::prelude::{Follow, User};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::info;

/// Create the `user` and `follow` tables if they are missing.
pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    create_table(db, User).await?;
    create_table(db, Follow).await?;
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let schema = Schema::new(db.get_database_backend());
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(&stmt).await?;
    info!(table = entity.table_name(), "table ready");
    Ok(())
}
