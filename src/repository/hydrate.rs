//! Follow edges attached to user rows at read time.
//!
//! Edges are fetched per query for the users being returned, never cached,
//! so a follow or unfollow has nothing to invalidate.

use std::collections::HashMap;

use entity::{follow, prelude::Follow, user};
use itertools::Itertools;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::domain::User;

/// Adjacency of a set of users, keyed by user id.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Graph {
    following: HashMap<i32, Vec<i32>>,
    followers: HashMap<i32, Vec<i32>>,
}

impl Graph {
    /// Load both directions of every edge touching `ids`.
    pub async fn load<C>(db: &C, ids: &[i32]) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Self::default());
        }

        let following: Vec<(i32, i32)> = Follow::find()
            .select_only()
            .column(follow::Column::UserId)
            .column(follow::Column::FollowingUserId)
            .filter(follow::Column::UserId.is_in(ids.iter().copied()))
            .order_by_asc(follow::Column::UserId)
            .order_by_asc(follow::Column::FollowingUserId)
            .into_tuple()
            .all(db)
            .await?;

        let followers: Vec<(i32, i32)> = Follow::find()
            .select_only()
            .column(follow::Column::FollowingUserId)
            .column(follow::Column::UserId)
            .filter(follow::Column::FollowingUserId.is_in(ids.iter().copied()))
            .order_by_asc(follow::Column::FollowingUserId)
            .order_by_asc(follow::Column::UserId)
            .into_tuple()
            .all(db)
            .await?;

        Ok(Self::from_edges(following, followers))
    }

    /// Fold `(owner, other)` pairs into per-owner lists.
    pub fn from_edges(
        following: impl IntoIterator<Item = (i32, i32)>,
        followers: impl IntoIterator<Item = (i32, i32)>,
    ) -> Self {
        Self {
            following: following.into_iter().into_group_map(),
            followers: followers.into_iter().into_group_map(),
        }
    }

    /// Turn storage rows into users, moving each user's edges out of the
    /// graph. Users without edges get empty lists.
    pub fn hydrate(mut self, models: Vec<user::Model>) -> Vec<User> {
        models
            .into_iter()
            .map(|model| {
                let following = self.following.remove(&model.id).unwrap_or_default();
                let followers = self.followers.remove(&model.id).unwrap_or_default();
                User::hydrate(model, following, followers)
            })
            .collect()
    }
}

/// Load edges for `models` and attach them.
pub async fn hydrate_all<C>(db: &C, models: Vec<user::Model>) -> Result<Vec<User>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: Vec<i32> = models.iter().map(|model| model.id).collect();
    let graph = Graph::load(db, &ids).await?;
    Ok(graph.hydrate(models))
}

/// Single-row variant of [`hydrate_all`].
pub async fn hydrate_one<C>(db: &C, model: Option<user::Model>) -> Result<Option<User>, DbErr>
where
    C: ConnectionTrait,
{
    match model {
        Some(model) => Ok(hydrate_all(db, vec![model]).await?.pop()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(id: i32) -> user::Model {
        user::Model {
            id,
            name: format!("user {id}"),
            password_hash: "hash".to_owned(),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            bio: None,
            profile_image: None,
            cover_image: None,
        }
    }

    #[test]
    fn edges_are_grouped_per_user() {
        let graph = Graph::from_edges([(1, 2), (1, 3), (2, 3)], [(2, 1), (3, 1), (3, 2)]);

        let users = graph.hydrate(vec![row(1), row(2), row(3)]);

        assert_eq!(users[0].following_ids, vec![2, 3]);
        assert_eq!(users[0].follower_ids, Vec::<i32>::new());
        assert_eq!(users[1].following_ids, vec![3]);
        assert_eq!(users[1].follower_ids, vec![1]);
        assert_eq!(users[2].following_ids, Vec::<i32>::new());
        assert_eq!(users[2].follower_ids, vec![1, 2]);
    }

    #[test]
    fn user_without_edges_gets_empty_lists() {
        let users = Graph::default().hydrate(vec![row(5)]);

        assert_eq!(users.len(), 1);
        assert!(users[0].following_ids.is_empty());
        assert!(users[0].follower_ids.is_empty());
    }
}
