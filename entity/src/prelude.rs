pub use super::follow::Entity as Follow;
pub use super::user::Entity as User;
