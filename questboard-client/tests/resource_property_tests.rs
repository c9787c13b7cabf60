use proptest::prelude::*;
use questboard_client::hooks::{use_achievements, use_user_activity, use_users};
use questboard_core::{UserActivity, UserId};
use questboard_test_utils::assertions::{
    assert_all_for_user, assert_highest_xp_first, assert_newest_first, assert_same_ids,
    assert_users_newest_first,
};
use questboard_test_utils::fixtures::{activity, seeded_service, to_rows};
use questboard_test_utils::gated_service;
use questboard_test_utils::generators::{
    arb_achievements, arb_activities, arb_user_id, arb_users,
};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn activity_feed_is_filtered_exhaustive_and_newest_first(
        activities in arb_activities(24),
        user_id in proptest::option::of(arb_user_id()),
    ) {
        let state = runtime().block_on(async {
            let service = seeded_service(&[], &activities, &[]);
            let hook = use_user_activity(service, user_id.clone());
            let state = hook.wait_until_settled().await;
            state
        });

        prop_assert!(state.error.is_none());
        prop_assert!(!state.loading);
        let expected: Vec<UserActivity> = activities
            .iter()
            .filter(|a| user_id.as_ref().map_or(true, |u| &a.user_id == u))
            .cloned()
            .collect();
        assert_same_ids(&state.data, &expected, |a| a.id.as_str().to_string());
        assert_newest_first(&state.data);
        if let Some(user_id) = &user_id {
            assert_all_for_user(&state.data, user_id);
        }
    }

    #[test]
    fn achievements_come_back_highest_xp_first(achievements in arb_achievements(24)) {
        let state = runtime().block_on(async {
            let service = seeded_service(&achievements, &[], &[]);
            let hook = use_achievements(service);
            let state = hook.wait_until_settled().await;
            state
        });

        prop_assert_eq!(state.data.len(), achievements.len());
        assert_highest_xp_first(&state.data);
    }

    #[test]
    fn users_come_back_newest_first(users in arb_users(24)) {
        let state = runtime().block_on(async {
            let service = seeded_service(&[], &[], &users);
            let hook = use_users(service);
            let state = hook.wait_until_settled().await;
            state
        });

        prop_assert!(state.error.is_none());
        assert_same_ids(&state.data, &users, |u| u.id.as_str().to_string());
        assert_users_newest_first(&state.data);
    }

    #[test]
    fn only_the_newest_request_lands(
        filters in prop::collection::vec(proptest::option::of(arb_user_id()), 1..6),
        release_keys in prop::collection::vec(any::<u32>(), 6),
    ) {
        let (landed, expected, issued, discarded) = runtime().block_on(async {
            let (service, mut gate) = gated_service();
            let hook = use_user_activity(std::sync::Arc::new(service), filters[0].clone());
            let mut pending = vec![gate.next().await];
            for filter in &filters[1..] {
                if hook.set_user_id(filter.clone()) {
                    pending.push(gate.next().await);
                }
            }
            let issued = pending.len();

            // Each response carries one row tagged with its issue index.
            let mut releases: Vec<(u32, usize, _)> = pending
                .into_iter()
                .enumerate()
                .map(|(i, p)| (release_keys[i], i, p))
                .collect();
            releases.sort_by_key(|(key, i, _)| (*key, *i));
            for (_, i, p) in releases {
                let owner = p
                    .filter()
                    .and_then(|f| f.value.as_str())
                    .unwrap_or("u1")
                    .to_string();
                p.respond_rows(to_rows(&[activity(&format!("r{}", i), &owner, i as i64)]));
            }

            let state = hook.wait_until_settled().await;
            let expected = format!("r{}", issued - 1);
            tokio::time::timeout(std::time::Duration::from_secs(5), async {
                while hook.discarded_responses() < (issued - 1) as u64 {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .unwrap();
            let landed: Vec<String> = hook.state().data.iter().map(|a| a.id.to_string()).collect();
            prop_assert_eq!(state.data.len(), 1);
            Ok::<_, TestCaseError>((landed, expected, issued, hook.discarded_responses()))
        })?;

        prop_assert_eq!(landed, vec![expected]);
        prop_assert_eq!(discarded, (issued - 1) as u64);
    }
}

#[test]
fn blank_user_id_reads_everyone() {
    let state = runtime().block_on(async {
        let feed = vec![activity("c1", "u1", 1), activity("c2", "u2", 2)];
        let service = seeded_service(&[], &feed, &[]);
        let hook = use_user_activity(service, Some(UserId::new("")));
        let state = hook.wait_until_settled().await;
        state
    });
    assert_eq!(state.data.len(), 2);
}
