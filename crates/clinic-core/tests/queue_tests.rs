//! Queue projection tests.

use chrono::{NaiveDate, NaiveDateTime};
use clinic_core::models::{Patient, Priority, Visit, VisitStatus};
use clinic_core::queue::{QueueEngine, WaitTime};
use proptest::prelude::*;

const DAY: &str = "2024-05-02";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

fn now() -> NaiveDateTime {
    today().and_hms_opt(12, 0, 0).unwrap()
}

fn make_visit(id: usize, priority: Priority, status: VisitStatus, date: &str, time: &str) -> Visit {
    let mut visit = Visit::quick(format!("PAT{:03}", id), priority, "Fever".into());
    visit.id = format!("OPD{:03}", id);
    visit.status = status;
    visit.visit_date = date.into();
    visit.visit_time = Some(time.into());
    visit
}

fn patients() -> Vec<Patient> {
    Vec::new()
}

#[test]
fn test_front_desk_example() {
    let visits = vec![
        make_visit(1, Priority::Normal, VisitStatus::Waiting, DAY, "09:00:00"),
        make_visit(2, Priority::Emergency, VisitStatus::Waiting, DAY, "09:05:00"),
        make_visit(3, Priority::High, VisitStatus::Waiting, DAY, "08:50:00"),
        make_visit(4, Priority::Emergency, VisitStatus::Waiting, DAY, "08:40:00"),
    ];
    let queue = QueueEngine::default().build(&visits, &patients(), today(), now());

    let order: Vec<(Priority, &str)> = queue
        .iter()
        .map(|e| {
            let visit = visits.iter().find(|v| v.id == e.visit_id).unwrap();
            (e.priority, visit.visit_time.as_deref().unwrap())
        })
        .collect();
    assert_eq!(
        order,
        vec![
            (Priority::Emergency, "08:40:00"),
            (Priority::Emergency, "09:05:00"),
            (Priority::High, "08:50:00"),
            (Priority::Normal, "09:00:00"),
        ]
    );
    assert_eq!(queue[0].wait, WaitTime::Minutes(200));
    assert_eq!(queue[0].wait_display(), "200 min");
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Emergency),
        Just(Priority::High),
        Just(Priority::Normal),
        Just(Priority::Low),
    ]
}

fn status_strategy() -> impl Strategy<Value = VisitStatus> {
    prop_oneof![
        Just(VisitStatus::Waiting),
        Just(VisitStatus::InProgress),
        Just(VisitStatus::Completed),
        Just(VisitStatus::Cancelled),
    ]
}

fn visits_strategy() -> impl Strategy<Value = Vec<Visit>> {
    proptest::collection::vec(
        (
            priority_strategy(),
            status_strategy(),
            prop_oneof![Just("2024-05-01"), Just(DAY)],
            8u32..12,
            0u32..60,
        ),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (priority, status, date, hour, minute))| {
                make_visit(
                    i + 1,
                    priority,
                    status,
                    date,
                    &format!("{:02}:{:02}:00", hour, minute),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_queue_is_sorted_and_filtered(visits in visits_strategy()) {
        let queue = QueueEngine::default().build(&visits, &patients(), today(), now());

        let expected = visits
            .iter()
            .filter(|v| v.status == VisitStatus::Waiting && v.visit_date == DAY)
            .count();
        prop_assert_eq!(queue.len(), expected);

        for (index, entry) in queue.iter().enumerate() {
            prop_assert_eq!(entry.position, index + 1);
        }

        let keys: Vec<(u8, String, usize)> = queue
            .iter()
            .map(|e| {
                let pos = visits.iter().position(|v| v.id == e.visit_id).unwrap();
                let v = &visits[pos];
                (v.priority.rank(), v.visit_time.clone().unwrap(), pos)
            })
            .collect();
        for pair in keys.windows(2) {
            // Ties on (rank, time) keep storage order.
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_queue_is_idempotent(visits in visits_strategy()) {
        let engine = QueueEngine::default();
        let first = engine.build(&visits, &patients(), today(), now());
        let second = engine.build(&visits, &patients(), today(), now());
        prop_assert_eq!(first, second);
    }
}
