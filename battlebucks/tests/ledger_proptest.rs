//! Property-based tests for slot accounting.
//!
//! Random sequences of confirmations and reversions are applied to one
//! tournament and the counter is checked against the registrations after
//! every step.

use battlebucks::db::{MemoryStore, RegistrationRepository, TournamentRepository};
use battlebucks::identity::CallerIdentity;
use battlebucks::ledger::{LedgerConfig, LedgerError, RegistrationLedger, RevertMode};
use battlebucks::notify::LogSink;
use battlebucks::registration::{PaymentStatus, Registration, RegistrationFilter};
use battlebucks::tournament::{Game, Tournament, TournamentStatus};
use chrono::{NaiveDate, NaiveTime, Utc};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Step {
    Confirm(usize),
    Revert(usize),
}

fn step_strategy(registrations: usize) -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..registrations).prop_map(Step::Confirm),
        (0..registrations).prop_map(Step::Revert),
    ]
}

fn scenario_strategy() -> impl Strategy<Value = (i64, usize, Vec<Step>)> {
    (1i64..=6, 1usize..=8).prop_flat_map(|(slots_total, registrations)| {
        (
            Just(slots_total),
            Just(registrations),
            prop::collection::vec(step_strategy(registrations), 1..40),
        )
    })
}

fn seeded_store(slots_total: i64, registrations: usize) -> Arc<MemoryStore> {
    let mut store = MemoryStore::new().with_tournament(Tournament {
        id: "t1".to_string(),
        title: "Kalahari Cup".to_string(),
        game: Game::Pubg,
        date: NaiveDate::from_ymd_opt(2026, 12, 20).unwrap(),
        time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        entry_fee: 25,
        prize_pool: 1000,
        slots_total,
        slots_allotted: 0,
        status: TournamentStatus::Upcoming,
        rules: vec![],
        version: 0,
        created_at: Utc::now(),
    });

    for i in 0..registrations {
        store = store.with_registration(Registration {
            id: format!("r{i}"),
            tournament_id: Some("t1".to_string()),
            tournament_title: "Kalahari Cup".to_string(),
            user_id: format!("u{i}"),
            user_email: format!("u{i}@example.com"),
            game_id: "5550001111".to_string(),
            team_name: format!("Squad {i}"),
            upi_id: format!("u{i}@ybl"),
            payment_status: PaymentStatus::Pending,
            registered_at: Utc::now(),
        });
    }

    Arc::new(store)
}

async fn run_steps(
    store: &Arc<MemoryStore>,
    mode: RevertMode,
    steps: &[Step],
    mut check: impl FnMut(i64, i64),
) {
    let ledger = RegistrationLedger::new(
        store.clone(),
        Arc::new(LogSink),
        LedgerConfig {
            revert_mode: mode,
            ..LedgerConfig::default()
        },
    );
    let admin = CallerIdentity::admin("admin-prop");

    for step in steps {
        let result = match *step {
            Step::Confirm(i) => {
                ledger
                    .confirm_payment(&admin, &format!("r{i}"), Some("t1"))
                    .await
            }
            Step::Revert(i) => {
                ledger
                    .revert_to_pending(&admin, &format!("r{i}"), Some("t1"))
                    .await
            }
        };
        match result {
            Ok(_) | Err(LedgerError::CapacityExceeded { .. }) => {}
            Err(other) => panic!("unexpected ledger error: {other:?}"),
        }

        let allotted = store
            .find_tournament("t1")
            .await
            .unwrap()
            .unwrap()
            .slots_allotted;
        let confirmed = store
            .list_registrations(&RegistrationFilter::all().with_status(PaymentStatus::Confirmed))
            .await
            .unwrap()
            .len() as i64;
        check(allotted, confirmed);
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// With the guarded revert the counter always equals the number of
    /// confirmed registrations and never leaves `0..=slots_total`.
    #[test]
    fn test_guarded_counter_matches_confirmed((slots_total, registrations, steps) in scenario_strategy()) {
        let store = seeded_store(slots_total, registrations);
        let mut violations = Vec::new();

        runtime().block_on(run_steps(&store, RevertMode::Guarded, &steps, |allotted, confirmed| {
            if allotted != confirmed || allotted < 0 || allotted > slots_total {
                violations.push((allotted, confirmed));
            }
        }));

        prop_assert!(violations.is_empty(), "violations: {:?}", violations);
    }

    /// Confirmations never push the counter past capacity, whichever revert
    /// mode is configured.
    #[test]
    fn test_capacity_never_exceeded(
        (slots_total, registrations, steps) in scenario_strategy(),
        unconditional in any::<bool>(),
    ) {
        let mode = if unconditional { RevertMode::Unconditional } else { RevertMode::Guarded };
        let store = seeded_store(slots_total, registrations);
        let mut max_seen = i64::MIN;

        runtime().block_on(run_steps(&store, mode, &steps, |allotted, _| {
            max_seen = max_seen.max(allotted);
        }));

        prop_assert!(max_seen <= slots_total, "counter reached {} of {}", max_seen, slots_total);
    }
}
