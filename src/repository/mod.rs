//! Reads and writes against the `user` and `follow` tables.

pub mod hydrate;

use async_trait::async_trait;
use entity::{
    follow,
    prelude::{Follow, User as Users},
    user,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TryInsertResult, sea_query::OnConflict,
};
use tracing::{debug, instrument};

use crate::{domain::User, error::RepositoryError, patch::UserPatch};

/// Storage operations the directory service is built on.
///
/// Lookups return `None` when no row matches; only a failing database call is
/// an error.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a user. Duplicate usernames or emails fail with the database's
    /// unique-constraint error.
    async fn create(
        &self,
        name: &str,
        password_hash: &str,
        username: &str,
        email: &str,
    ) -> Result<User, RepositoryError>;

    async fn user_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// The users among `ids` that exist, ordered by id. Missing ids are
    /// skipped.
    async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepositoryError>;

    /// Apply `patch`. Returns `false` when no row has the patch's id.
    async fn update_by_id(&self, patch: &UserPatch) -> Result<bool, RepositoryError>;

    async fn fetch_password_hash_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, RepositoryError>;

    /// Add the edge `follower_id -> followed_id`. Returns `false` when the
    /// edge already existed.
    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool, RepositoryError>;

    /// Remove the edge `follower_id -> followed_id`. Returns `false` when
    /// there was no such edge.
    async fn unfollow(
        &self,
        follower_id: i32,
        followed_id: i32,
    ) -> Result<bool, RepositoryError>;

    /// The `limit` most recently created users, newest first.
    async fn new_users(&self, limit: u64) -> Result<Vec<User>, RepositoryError>;
}

/// [`UserRepository`] over a SeaORM connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_connection(self) -> DatabaseConnection {
        self.db
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    #[instrument(skip(self, password_hash))]
    async fn create(
        &self,
        name: &str,
        password_hash: &str,
        username: &str,
        email: &str,
    ) -> Result<User, RepositoryError> {
        let model = user::ActiveModel {
            name: Set(name.to_owned()),
            password_hash: Set(password_hash.to_owned()),
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        debug!(id = model.id, "user created");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn user_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let model = Users::find_by_id(id).one(&self.db).await?;
        Ok(hydrate::hydrate_one(&self.db, model).await?)
    }

    #[instrument(skip(self))]
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let model = Users::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(hydrate::hydrate_one(&self.db, model).await?)
    }

    #[instrument(skip(self))]
    async fn users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = Users::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(hydrate::hydrate_all(&self.db, models).await?)
    }

    #[instrument(skip(self, patch), fields(id = patch.id))]
    async fn update_by_id(&self, patch: &UserPatch) -> Result<bool, RepositoryError> {
        let columns = patch.columns();
        if columns.is_empty() {
            return Err(RepositoryError::NothingToUpdate);
        }
        debug!(?columns, "updating user");

        let result = Users::update_many()
            .set(patch.to_active_model())
            .filter(user::Column::Id.eq(patch.id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self))]
    async fn fetch_password_hash_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let hash = Users::find()
            .select_only()
            .column(user::Column::PasswordHash)
            .filter(user::Column::Email.eq(email))
            .into_tuple::<String>()
            .one(&self.db)
            .await?;
        Ok(hash)
    }

    #[instrument(skip(self))]
    async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool, RepositoryError> {
        let edge = follow::ActiveModel {
            user_id: Set(follower_id),
            following_user_id: Set(followed_id),
            created_at: Set(chrono::Utc::now()),
        };

        let result = Follow::insert(edge)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::FollowingUserId])
                    .do_nothing()
                    .to_owned(),
            )
            .try_insert()
            .exec(&self.db)
            .await?;

        Ok(matches!(result, TryInsertResult::Inserted(_)))
    }

    #[instrument(skip(self))]
    async fn unfollow(
        &self,
        follower_id: i32,
        followed_id: i32,
    ) -> Result<bool, RepositoryError> {
        let result = Follow::delete_many()
            .filter(follow::Column::UserId.eq(follower_id))
            .filter(follow::Column::FollowingUserId.eq(followed_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self))]
    async fn new_users(&self, limit: u64) -> Result<Vec<User>, RepositoryError> {
        let models = Users::find()
            .order_by_desc(user::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(hydrate::hydrate_all(&self.db, models).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sea_orm::{DbBackend, DbErr, MockDatabase, MockExecResult, Transaction};

    #[tokio::test]
    async fn empty_patch_issues_no_statement() {
        let db = MockDatabase::new(DbBackend::Postgres).into_connection();
        let repository = SeaOrmUserRepository::new(db);

        let result = repository.update_by_id(&UserPatch::new(1)).await;

        assert!(matches!(result, Err(RepositoryError::NothingToUpdate)));
        assert!(repository.into_connection().into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn patch_writes_only_present_columns() -> Result<(), RepositoryError> {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repository = SeaOrmUserRepository::new(db);

        let patch = UserPatch::new(3).with_username("neo").with_bio("");
        assert!(repository.update_by_id(&patch).await?);

        let patch = UserPatch::new(42).with_name("Nobody");
        assert!(!repository.update_by_id(&patch).await?);

        assert_eq!(
            repository.into_connection().into_transaction_log(),
            [
                Transaction::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"UPDATE "user" SET "username" = $1, "bio" = $2 WHERE "user"."id" = $3"#,
                    ["neo".into(), "".into(), 3i32.into()]
                ),
                Transaction::from_sql_and_values(
                    DbBackend::Postgres,
                    r#"UPDATE "user" SET "name" = $1 WHERE "user"."id" = $2"#,
                    ["Nobody".into(), 42i32.into()]
                ),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_user_is_none() -> Result<(), RepositoryError> {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let repository = SeaOrmUserRepository::new(db);

        assert_eq!(repository.user_by_id(10).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn database_failure_propagates() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_owned())])
            .into_connection();
        let repository = SeaOrmUserRepository::new(db);

        let result = repository.user_by_email("a@x").await;

        assert!(matches!(result, Err(RepositoryError::Db(_))));
    }
}
