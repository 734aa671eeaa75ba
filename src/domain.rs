use entity::user;

/// A user profile together with its follow edges.
///
/// The storage row carries nullable text columns; here an absent value is the
/// empty string. `following_ids` and `follower_ids` are computed when the user
/// is read and are empty, never missing, for a user without edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub password_hash: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub profile_image: String,
    pub cover_image: String,
    pub following_ids: Vec<i32>,
    pub follower_ids: Vec<i32>,
}

impl User {
    /// Attach follow edges to a storage row.
    pub fn hydrate(model: user::Model, following_ids: Vec<i32>, follower_ids: Vec<i32>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            password_hash: model.password_hash,
            username: model.username,
            email: model.email,
            bio: model.bio.unwrap_or_default(),
            profile_image: model.profile_image.unwrap_or_default(),
            cover_image: model.cover_image.unwrap_or_default(),
            following_ids,
            follower_ids,
        }
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self::hydrate(model, Vec::new(), Vec::new())
    }
}

/// Which way a follow request mutates the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowOperation {
    #[default]
    Follow,
    Unfollow,
}
