/// Follow graph
///
/// Following twice or unfollowing a stranger are reported as outcomes, not
/// errors. Self-follows are rejected.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::models::account::AccountId;
use crate::models::follow::{FollowOutcome, UnfollowOutcome};
use crate::store::Store;

/// Follow operations
#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        SocialService { store }
    }

    /// Adds the edge `follower → followee`
    pub async fn follow(&self, follower: AccountId, followee: AccountId) -> CoreResult<FollowOutcome> {
        if follower == followee {
            return Err(CoreError::validation("account_id", "Accounts cannot follow themselves"));
        }
        if self.store.find_account(followee).await?.is_none() {
            return Err(CoreError::NotFound("Account"));
        }

        let outcome = if self.store.insert_follow(follower, followee).await? {
            tracing::info!(account_id = follower, followee, "Followed");
            FollowOutcome::Followed
        } else {
            FollowOutcome::AlreadyFollowing
        };

        Ok(outcome)
    }

    /// Removes the edge `follower → followee` if present
    pub async fn unfollow(&self, follower: AccountId, followee: AccountId) -> CoreResult<UnfollowOutcome> {
        let outcome = if self.store.delete_follow(follower, followee).await? {
            tracing::info!(account_id = follower, followee, "Unfollowed");
            UnfollowOutcome::Unfollowed
        } else {
            UnfollowOutcome::NotFollowing
        };

        Ok(outcome)
    }

    pub async fn is_following(&self, follower: AccountId, followee: AccountId) -> CoreResult<bool> {
        Ok(self.store.follow_exists(follower, followee).await?)
    }
}
