pub mod follow;
pub mod prelude;
pub mod user;

pub use sea_orm;
