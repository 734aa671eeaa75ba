//! Partial updates of a user profile.
//!
//! A [`UserPatch`] names the fields a caller wants changed. `None` leaves a
//! column untouched while `Some(String::new())` clears it, so the two intents
//! never collapse into one.

use entity::user;
use sea_orm::ActiveValue::{NotSet, Set};

/// A sparse update of one user row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub id: i32,
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

impl UserPatch {
    /// An empty patch targeting `id`.
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_profile_image(mut self, profile_image: impl Into<String>) -> Self {
        self.profile_image = Some(profile_image.into());
        self
    }

    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }

    /// Columns this patch writes, in table order.
    pub fn columns(&self) -> Vec<user::Column> {
        [
            (user::Column::Name, self.name.is_some()),
            (user::Column::Username, self.username.is_some()),
            (user::Column::Bio, self.bio.is_some()),
            (user::Column::ProfileImage, self.profile_image.is_some()),
            (user::Column::CoverImage, self.cover_image.is_some()),
        ]
        .into_iter()
        .filter_map(|(column, present)| present.then_some(column))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }

    /// Build the row skeleton: present fields are `Set`, every other column,
    /// the primary key included, stays `NotSet` and is never written.
    pub fn to_active_model(&self) -> user::ActiveModel {
        user::ActiveModel {
            id: NotSet,
            name: self.name.clone().map_or(NotSet, Set),
            password_hash: NotSet,
            username: self.username.clone().map_or(NotSet, Set),
            email: NotSet,
            bio: self.bio.clone().map_or(NotSet, |bio| Set(Some(bio))),
            profile_image: self
                .profile_image
                .clone()
                .map_or(NotSet, |image| Set(Some(image))),
            cover_image: self
                .cover_image
                .clone()
                .map_or(NotSet, |image| Set(Some(image))),
        }
    }
}
