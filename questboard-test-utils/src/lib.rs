//! Questboard Test Utilities
//!
//! Centralized test infrastructure for the Questboard workspace:
//! - A gated table service whose responses the test releases by hand
//! - Proptest generators for the record types
//! - Fixtures for seeded in-memory services
//! - Assertions for ordering and filter checks

pub use questboard_storage::{InMemoryTableService, RemoteTableService};

pub use questboard_core::{
    Achievement, AchievementId, ActivityId, EqualityFilter, OrderSpec, QueryError, Row,
    SortDirection, TableEntity, TableQuery, Timestamp, User, UserActivity, UserId,
};

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// ============================================================================
// GATED SERVICE
// ============================================================================

/// How long `QueryGate::next` waits before failing the test.
pub const GATE_TIMEOUT: Duration = Duration::from_secs(5);

/// A query that reached the service and is waiting for its response.
#[derive(Debug)]
pub struct PendingQuery {
    pub query: TableQuery,
    responder: oneshot::Sender<Result<Vec<Row>, QueryError>>,
}

impl PendingQuery {
    /// Release the query with an arbitrary result.
    ///
    /// A hook that already went away is not an error here.
    pub fn respond(self, result: Result<Vec<Row>, QueryError>) {
        let _ = self.responder.send(result);
    }

    pub fn respond_rows(self, rows: Vec<Row>) {
        self.respond(Ok(rows));
    }

    /// Release the query as a remote rejection.
    pub fn fail(self, message: Option<&str>) {
        let table = self.query.table.clone();
        self.respond(Err(QueryError::Remote {
            table,
            status: Some(500),
            message: message.map(str::to_string),
        }));
    }

    pub fn filter(&self) -> Option<&EqualityFilter> {
        self.query.filter.as_ref()
    }
}

/// Service half of a gated pair. Every `select` parks until the matching
/// `PendingQuery` is answered.
#[derive(Debug, Clone)]
pub struct GatedTableService {
    tx: mpsc::UnboundedSender<PendingQuery>,
}

/// Test half of a gated pair.
#[derive(Debug)]
pub struct QueryGate {
    rx: mpsc::UnboundedReceiver<PendingQuery>,
}

/// Create a connected service/gate pair.
pub fn gated_service() -> (GatedTableService, QueryGate) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GatedTableService { tx }, QueryGate { rx })
}

#[async_trait]
impl RemoteTableService for GatedTableService {
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, QueryError> {
        let (responder, response) = oneshot::channel();
        self.tx
            .send(PendingQuery {
                query: query.clone(),
                responder,
            })
            .map_err(|_| QueryError::Transport {
                reason: "query gate closed".to_string(),
            })?;
        response.await.map_err(|_| QueryError::Transport {
            reason: "query dropped without a response".to_string(),
        })?
    }
}

impl QueryGate {
    /// Next query in issue order. Panics after `GATE_TIMEOUT`.
    pub async fn next(&mut self) -> PendingQuery {
        match tokio::time::timeout(GATE_TIMEOUT, self.rx.recv()).await {
            Ok(Some(pending)) => pending,
            Ok(None) => panic!("query gate closed"),
            Err(_) => panic!("no query reached the service within {:?}", GATE_TIMEOUT),
        }
    }

    /// Next query if one is already parked.
    pub fn try_next(&mut self) -> Option<PendingQuery> {
        self.rx.try_recv().ok()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Questboard record types.

    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    /// One of a handful of user ids, so generated rows share owners.
    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        (1u8..=4).prop_map(|n| UserId::new(format!("u{}", n)))
    }

    /// Instants between 2020 and 2030. Half of them fall on a whole second, so
    /// serialized forms with and without a fractional part get mixed.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        let nanos = prop_oneof![Just(0u32), 1u32..1_000_000_000];
        (1_577_836_800i64..1_893_456_000i64, nanos).prop_map(|(secs, nanos)| {
            Utc.timestamp_opt(secs, nanos)
                .single()
                .unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_activity_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("workout_logged".to_string()),
            Just("quest_completed".to_string()),
            Just("streak_extended".to_string()),
            Just("achievement_unlocked".to_string()),
        ]
    }

    pub fn arb_achievement() -> impl Strategy<Value = Achievement> {
        ("[a-z]{4,10}", 0u32..5_000, arb_timestamp()).prop_map(|(name, xp_reward, created_at)| {
            Achievement {
                id: AchievementId::new(fixtures::new_id("ach")),
                description: format!("Earn the {} badge", name),
                icon: "star".to_string(),
                name,
                xp_reward,
                created_at,
            }
        })
    }

    pub fn arb_activity() -> impl Strategy<Value = UserActivity> {
        (arb_user_id(), arb_activity_type(), arb_timestamp()).prop_map(
            |(user_id, activity_type, created_at)| UserActivity {
                id: ActivityId::new(fixtures::new_id("act")),
                user_id,
                activity_type,
                created_at,
                metadata: None,
            },
        )
    }

    pub fn arb_user() -> impl Strategy<Value = User> {
        ("[a-z]{3,8}", arb_timestamp(), any::<bool>()).prop_map(|(name, created_at, admin)| User {
            id: UserId::new(fixtures::new_id("user")),
            email: format!("{}@example.com", name),
            name,
            role: if admin { "admin" } else { "member" }.to_string(),
            created_at,
            avatar_url: None,
            last_login: None,
        })
    }

    pub fn arb_activities(max: usize) -> impl Strategy<Value = Vec<UserActivity>> {
        prop::collection::vec(arb_activity(), 0..=max)
    }

    pub fn arb_users(max: usize) -> impl Strategy<Value = Vec<User>> {
        prop::collection::vec(arb_user(), 0..=max)
    }

    pub fn arb_achievements(max: usize) -> impl Strategy<Value = Vec<Achievement>> {
        prop::collection::vec(arb_achievement(), 0..=max)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Ready-made records and seeded services.

    use super::*;
    use chrono::{TimeZone, Utc};
    use serde::Serialize;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Unique, prefixed id.
    pub fn new_id(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::now_v7())
    }

    /// Fixed base instant plus `offset_secs`.
    pub fn at(offset_secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_709_287_200 + offset_secs, 0)
            .single()
            .expect("fixture timestamp in range")
    }

    /// Fixed base instant plus `offset_millis`, for sub-second spacing.
    pub fn at_millis(offset_millis: i64) -> Timestamp {
        at(0) + chrono::Duration::milliseconds(offset_millis)
    }

    pub fn achievement(id: &str, xp_reward: u32) -> Achievement {
        Achievement {
            id: AchievementId::new(id),
            name: format!("Achievement {}", id),
            description: String::new(),
            icon: "trophy".to_string(),
            xp_reward,
            created_at: at(0),
        }
    }

    pub fn activity(id: &str, user_id: &str, offset_secs: i64) -> UserActivity {
        UserActivity {
            id: ActivityId::new(id),
            user_id: UserId::new(user_id),
            activity_type: "workout_logged".to_string(),
            created_at: at(offset_secs),
            metadata: None,
        }
    }

    pub fn user(id: &str, offset_secs: i64) -> User {
        User {
            id: UserId::new(id),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            role: "member".to_string(),
            created_at: at(offset_secs),
            avatar_url: None,
            last_login: None,
        }
    }

    pub fn to_row<T: Serialize>(record: &T) -> Row {
        serde_json::to_value(record).expect("fixture record serializes")
    }

    pub fn to_rows<T: Serialize>(records: &[T]) -> Vec<Row> {
        records.iter().map(to_row).collect()
    }

    /// In-memory service holding the given records.
    pub fn seeded_service(
        achievements: &[Achievement],
        activities: &[UserActivity],
        users: &[User],
    ) -> Arc<InMemoryTableService> {
        let service = InMemoryTableService::new();
        for record in achievements {
            service.insert(record).expect("seed achievement");
        }
        for record in activities {
            service.insert(record).expect("seed activity");
        }
        for record in users {
            service.insert(record).expect("seed user");
        }
        Arc::new(service)
    }

    /// Three activities: c1 for u1, c2 and c3 for u2, newest last.
    pub fn mixed_activity_feed() -> Vec<UserActivity> {
        vec![
            activity("c1", "u1", 10),
            activity("c2", "u2", 20),
            activity("c3", "u2", 30),
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Checks shared by the resource tests.

    use super::*;

    /// Consecutive keys never increase.
    pub fn assert_non_increasing_by<T, K: PartialOrd + std::fmt::Debug>(
        items: &[T],
        key: impl Fn(&T) -> K,
    ) {
        for (i, pair) in items.windows(2).enumerate() {
            let (a, b) = (key(&pair[0]), key(&pair[1]));
            assert!(a >= b, "items {} and {} out of order: {:?} < {:?}", i, i + 1, a, b);
        }
    }

    pub fn assert_newest_first(activities: &[UserActivity]) {
        assert_non_increasing_by(activities, |a| a.created_at);
    }

    pub fn assert_users_newest_first(users: &[User]) {
        assert_non_increasing_by(users, |u| u.created_at);
    }

    pub fn assert_highest_xp_first(achievements: &[Achievement]) {
        assert_non_increasing_by(achievements, |a| a.xp_reward);
    }

    pub fn assert_all_for_user(activities: &[UserActivity], user_id: &UserId) {
        for activity in activities {
            assert_eq!(
                &activity.user_id, user_id,
                "activity {} belongs to another user",
                activity.id
            );
        }
    }

    /// Same records, ignoring order.
    pub fn assert_same_ids<T, I: Ord + std::fmt::Debug>(actual: &[T], expected: &[T], id: impl Fn(&T) -> I) {
        let mut a: Vec<I> = actual.iter().map(&id).collect();
        let mut e: Vec<I> = expected.iter().map(&id).collect();
        a.sort();
        e.sort();
        assert_eq!(a, e);
    }
}
