//! The dashboard's three remote collections.
//!
//! Each is a fixed instantiation of `ResourceHook`: the table and ordering
//! come from the entity type, and only the activity feed takes a runtime
//! filter.

use crate::resource::ResourceHook;
use questboard_core::{Achievement, EqualityFilter, User, UserActivity, UserId};
use questboard_storage::RemoteTableService;
use std::sync::Arc;

/// All achievements, highest `xp_reward` first.
pub fn use_achievements(service: Arc<dyn RemoteTableService>) -> ResourceHook<Achievement> {
    ResourceHook::activate(service, None)
}

/// Activity feed, newest first, optionally narrowed to one user.
pub fn use_user_activity(
    service: Arc<dyn RemoteTableService>,
    user_id: Option<UserId>,
) -> ResourceHook<UserActivity> {
    ResourceHook::activate(service, user_id_filter(user_id))
}

/// All users, newest first.
pub fn use_users(service: Arc<dyn RemoteTableService>) -> ResourceHook<User> {
    ResourceHook::activate(service, None)
}

impl ResourceHook<UserActivity> {
    /// Point the feed at another user, or at everyone with `None`.
    pub fn set_user_id(&self, user_id: Option<UserId>) -> bool {
        self.set_filter(user_id_filter(user_id))
    }
}

// A blank id means "no user selected", not "user with empty id".
fn user_id_filter(user_id: Option<UserId>) -> Option<EqualityFilter> {
    user_id
        .filter(|id| !id.as_str().trim().is_empty())
        .map(|id| EqualityFilter::new(UserActivity::USER_ID_FIELD, id.into_inner()))
}
