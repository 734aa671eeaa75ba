//! A user directory served over gRPC.
//!
//! Profiles live in the `user` table and the directed follow graph in the
//! `follow` table. [`repository::SeaOrmUserRepository`] owns every statement
//! against them, [`service::DirectoryService`] validates requests and maps
//! repository outcomes to RPC statuses, and [`server`] wires both to a tonic
//! listener.

pub mod config;
pub mod domain;
pub mod error;
pub mod patch;
pub mod proto;
pub mod repository;
pub mod schema;
pub mod server;
pub mod service;

pub use config::Config;
pub use domain::{FollowOperation, User};
pub use error::{RepositoryError, ServerError};
pub use patch::UserPatch;
pub use repository::{SeaOrmUserRepository, UserRepository};
pub use service::DirectoryService;
