//! The gRPC façade: request validation, dispatch to the repository and the
//! mapping of repository outcomes to RPC statuses.
//!
//! | repository outcome                     | status             |
//! |----------------------------------------|--------------------|
//! | no matching row / update touched none  | `NOT_FOUND`        |
//! | [`RepositoryError::NothingToUpdate`]   | `INVALID_ARGUMENT` |
//! | duplicate username or email            | `ALREADY_EXISTS`   |
//! | any other database failure             | `INTERNAL`         |

use sea_orm::SqlErr;
use tonic::{Request, Response, Status};
use tracing::{error, warn};

use crate::{
    domain::{FollowOperation, User},
    error::RepositoryError,
    patch::UserPatch,
    proto::{self, OperationType, Users, UsersServer},
    repository::UserRepository,
};

/// Upper bound on the page size of `NewUsers`.
pub const MAX_NEW_USERS: i32 = 100;

/// Serves the `users.Users` RPC service from a [`UserRepository`].
#[derive(Debug)]
pub struct DirectoryService<R> {
    repository: R,
}

impl<R> DirectoryService<R>
where
    R: UserRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Wrap the service for registration with a tonic router.
    pub fn into_server(self) -> UsersServer<Self> {
        UsersServer::new(self)
    }
}

#[tonic::async_trait]
impl<R> Users for DirectoryService<R>
where
    R: UserRepository,
{
    async fn create_user(
        &self,
        request: Request<proto::CreateUserRequest>,
    ) -> Result<Response<proto::CreateUserResponse>, Status> {
        let request = request.into_inner();
        required(&request.name, "name")?;
        required(&request.password_hash, "password_hash")?;
        required(&request.username, "username")?;
        required(&request.email, "email")?;

        let user = self
            .repository
            .create(
                &request.name,
                &request.password_hash,
                &request.username,
                &request.email,
            )
            .await
            .map_err(into_status)?;

        Ok(Response::new(proto::CreateUserResponse {
            user: Some(user.into()),
        }))
    }

    async fn user_by_email(
        &self,
        request: Request<proto::UserByEmailRequest>,
    ) -> Result<Response<proto::UserByEmailResponse>, Status> {
        let email = request.into_inner().email;
        required(&email, "email")?;

        let user = self
            .repository
            .user_by_email(&email)
            .await
            .map_err(into_status)?
            .ok_or_else(user_not_found)?;

        Ok(Response::new(proto::UserByEmailResponse {
            user: Some(user.into()),
        }))
    }

    async fn user_by_id(
        &self,
        request: Request<proto::UserByIdRequest>,
    ) -> Result<Response<proto::UserByIdResponse>, Status> {
        let id = positive_id(request.into_inner().id, "id")?;

        let user = self
            .repository
            .user_by_id(id)
            .await
            .map_err(into_status)?
            .ok_or_else(user_not_found)?;

        Ok(Response::new(proto::UserByIdResponse {
            user: Some(user.into()),
        }))
    }

    async fn users_by_ids(
        &self,
        request: Request<proto::UsersByIdsRequest>,
    ) -> Result<Response<proto::UsersByIdsResponse>, Status> {
        let mut ids = request.into_inner().ids;
        if ids.is_empty() {
            return Err(Status::invalid_argument("no ids provided"));
        }
        for id in &ids {
            positive_id(*id, "ids")?;
        }
        ids.sort_unstable();
        ids.dedup();

        let users = self
            .repository
            .users_by_ids(&ids)
            .await
            .map_err(into_status)?;

        Ok(Response::new(proto::UsersByIdsResponse {
            users: users.into_iter().map(Into::into).collect(),
        }))
    }

    async fn update_by_id(
        &self,
        request: Request<proto::UpdateByIdRequest>,
    ) -> Result<Response<proto::UpdateByIdResponse>, Status> {
        let request = request.into_inner();
        let id = positive_id(request.id, "id")?;
        let patch = UserPatch {
            id,
            name: request.name,
            username: request.username,
            bio: request.bio,
            profile_image: request.profile_image,
            cover_image: request.cover_image,
        };

        let updated = self
            .repository
            .update_by_id(&patch)
            .await
            .map_err(into_status)?;
        if !updated {
            return Err(user_not_found());
        }

        // Not atomic with the update: a concurrent writer may win in between.
        let user = self
            .repository
            .user_by_id(id)
            .await
            .map_err(into_status)?
            .ok_or_else(user_not_found)?;

        Ok(Response::new(proto::UpdateByIdResponse {
            user: Some(user.into()),
        }))
    }

    async fn password_hash_by_email(
        &self,
        request: Request<proto::PasswordHashByEmailRequest>,
    ) -> Result<Response<proto::PasswordHashByEmailResponse>, Status> {
        let email = request.into_inner().email;
        required(&email, "email")?;

        let password_hash = self
            .repository
            .fetch_password_hash_by_email(&email)
            .await
            .map_err(into_status)?
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| Status::not_found("hash not found"))?;

        Ok(Response::new(proto::PasswordHashByEmailResponse {
            password_hash,
        }))
    }

    /// `ok` is `true` when a new edge was written or an existing one removed,
    /// not whether the edge exists afterwards.
    async fn follow(
        &self,
        request: Request<proto::FollowRequest>,
    ) -> Result<Response<proto::FollowResponse>, Status> {
        let request = request.into_inner();
        let user_id = positive_id(request.user_id, "user_id")?;
        let target_user_id = positive_id(request.target_user_id, "target_user_id")?;
        if user_id == target_user_id {
            return Err(Status::invalid_argument("a user cannot follow themselves"));
        }

        let ok = match FollowOperation::from(request.operation_type()) {
            FollowOperation::Follow => self.repository.follow(user_id, target_user_id).await,
            FollowOperation::Unfollow => self.repository.unfollow(user_id, target_user_id).await,
        }
        .map_err(into_status)?;

        Ok(Response::new(proto::FollowResponse { ok }))
    }

    async fn new_users(
        &self,
        request: Request<proto::NewUsersRequest>,
    ) -> Result<Response<proto::NewUsersResponse>, Status> {
        let limit = request.into_inner().limit;
        if limit <= 0 {
            return Err(Status::invalid_argument("limit must be positive"));
        }

        let users = self
            .repository
            .new_users(limit.min(MAX_NEW_USERS) as u64)
            .await
            .map_err(into_status)?;

        Ok(Response::new(proto::NewUsersResponse {
            users: users.into_iter().map(Into::into).collect(),
        }))
    }
}

impl From<OperationType> for FollowOperation {
    fn from(operation: OperationType) -> Self {
        match operation {
            OperationType::Unfollow => Self::Unfollow,
            OperationType::Follow | OperationType::Unspecified => Self::Follow,
        }
    }
}

impl From<User> for proto::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            password_hash: user.password_hash,
            username: user.username,
            email: user.email,
            bio: user.bio,
            profile_image: user.profile_image,
            cover_image: user.cover_image,
            following_user_ids: user.following_ids,
            follower_user_ids: user.follower_ids,
        }
    }
}

fn positive_id(id: i32, field: &str) -> Result<i32, Status> {
    if id <= 0 {
        return Err(Status::invalid_argument(format!("invalid {field}: {id}")));
    }
    Ok(id)
}

fn required(value: &str, field: &str) -> Result<(), Status> {
    if value.is_empty() {
        return Err(Status::invalid_argument(format!("{field} is required")));
    }
    Ok(())
}

fn user_not_found() -> Status {
    Status::not_found("user not found")
}

fn into_status(err: RepositoryError) -> Status {
    match err {
        RepositoryError::NothingToUpdate => Status::invalid_argument("nothing to update"),
        RepositoryError::Db(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                warn!(%message, "unique constraint violated");
                Status::already_exists("username or email already taken")
            }
            _ => {
                error!(error = %err, "repository call failed");
                Status::internal(err.to_string())
            }
        },
    }
}
