//! Remote collection schemas
//!
//! Flat records as stored in the backend. The client trusts the shape the
//! service returns and only tolerates null or missing values where a field is
//! an `Option`.

use crate::identity::{AchievementId, ActivityId, Timestamp, UserId};
use crate::query::OrderSpec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record type that lives in exactly one remote table.
///
/// The table name and default ordering are fixed per type; resources built
/// for the type never change them after activation.
pub trait TableEntity: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Name of the remote table.
    const TABLE: &'static str;

    /// Ordering applied to every read of this table.
    fn default_order() -> OrderSpec;
}

/// A badge that can be earned, worth `xp_reward` experience points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    /// Icon reference (name or URL), rendered by the consumer.
    pub icon: String,
    pub xp_reward: u32,
    pub created_at: Timestamp,
}

impl TableEntity for Achievement {
    const TABLE: &'static str = "achievements";

    fn default_order() -> OrderSpec {
        OrderSpec::descending("xp_reward")
    }
}

/// One logged action of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: ActivityId,
    /// References `users.id`; not enforced client-side.
    pub user_id: UserId,
    /// Free-form tag such as `workout_logged` or `streak_extended`.
    pub activity_type: String,
    pub created_at: Timestamp,
    /// Opaque payload; its shape is owned by whoever wrote the row.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl UserActivity {
    /// Column the activity resource filters on.
    pub const USER_ID_FIELD: &'static str = "user_id";
}

impl TableEntity for UserActivity {
    const TABLE: &'static str = "user_activity";

    fn default_order() -> OrderSpec {
        OrderSpec::descending("created_at")
    }
}

/// A dashboard account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    /// Free-form role string (`member`, `coach`, `admin`, ...).
    pub role: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub last_login: Option<Timestamp>,
}

impl TableEntity for User {
    const TABLE: &'static str = "users";

    fn default_order() -> OrderSpec {
        OrderSpec::descending("created_at")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use serde_json::json;

    #[test]
    fn test_schema_instantiations() {
        assert_eq!(Achievement::TABLE, "achievements");
        assert_eq!(
            Achievement::default_order(),
            OrderSpec::new("xp_reward", SortDirection::Descending)
        );
        assert_eq!(UserActivity::TABLE, "user_activity");
        assert_eq!(UserActivity::default_order().field, "created_at");
        assert_eq!(User::TABLE, "users");
        assert_eq!(User::default_order().direction, SortDirection::Descending);
    }

    #[test]
    fn test_user_tolerates_missing_nullable_fields() {
        let row = json!({
            "id": "u1",
            "email": "ada@example.com",
            "name": "Ada",
            "role": "member",
            "created_at": "2024-03-01T10:00:00Z"
        });
        let user: User = serde_json::from_value(row).unwrap();
        assert!(user.avatar_url.is_none());
        assert!(user.last_login.is_none());

        let row = json!({
            "id": "u2",
            "email": "bo@example.com",
            "name": "Bo",
            "role": "coach",
            "created_at": "2024-03-01T10:00:00Z",
            "avatar_url": null,
            "last_login": "2024-03-02T08:30:00Z"
        });
        let user: User = serde_json::from_value(row).unwrap();
        assert!(user.avatar_url.is_none());
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_achievement_rejects_negative_reward() {
        let row = json!({
            "id": "a1",
            "name": "First Steps",
            "description": "Log your first walk",
            "icon": "footprints",
            "xp_reward": -5,
            "created_at": "2024-03-01T10:00:00Z"
        });
        assert!(serde_json::from_value::<Achievement>(row).is_err());
    }

    #[test]
    fn test_activity_metadata_is_opaque() {
        let row = json!({
            "id": "c1",
            "user_id": "u1",
            "activity_type": "workout_logged",
            "created_at": "2024-03-01T10:00:00Z",
            "metadata": {"minutes": 30, "tags": ["run"]}
        });
        let activity: UserActivity = serde_json::from_value(row).unwrap();
        assert_eq!(activity.metadata.unwrap()["minutes"], 30);
    }

    #[test]
    fn test_user_missing_required_field_fails() {
        let row = json!({"id": "u1", "name": "Ada"});
        assert!(serde_json::from_value::<User>(row).is_err());
    }
}
