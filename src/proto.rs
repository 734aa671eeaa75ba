//! Types and service stubs generated from `proto/users.proto`.

tonic::include_proto!("users");

pub use follow_request::OperationType;
pub use users_client::UsersClient;
pub use users_server::{Users, UsersServer};
