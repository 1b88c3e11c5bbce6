use analysis::records::{InventorySnapshot, RoundEndEvent, RoundStartEvent};
use analysis::rounds::{self, InventoryLookup, ProbedInventories};
use analysis::Round;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing_test::traced_test;

fn starts(events: &[(i32, u32)]) -> Vec<RoundStartEvent> {
    events
        .iter()
        .map(|(round, tick)| RoundStartEvent {
            round: *round,
            tick: *tick,
        })
        .collect()
}

fn ends(ticks: &[u32]) -> Vec<RoundEndEvent> {
    ticks
        .iter()
        .enumerate()
        .map(|(idx, tick)| RoundEndEvent {
            tick: *tick,
            winner: if idx % 2 == 0 { "CT" } else { "T" }.to_owned(),
            reason: "t_killed".to_owned(),
        })
        .collect()
}

fn inventory(name: &str, items: &[&str]) -> InventorySnapshot {
    InventorySnapshot {
        player_id: format!("7656119{}", name.len()),
        name: name.to_owned(),
        inventory: items.iter().map(|i| (*i).to_owned()).collect(),
    }
}

fn no_inventories() -> HashMap<u32, Vec<InventorySnapshot>> {
    HashMap::new()
}

fn knife_inventories() -> Vec<InventorySnapshot> {
    vec![
        inventory("Excel", &["Knife"]),
        inventory("zeus", &["weapon_knife_t"]),
        inventory("spectator", &[]),
    ]
}

/// Records every tick it gets asked about.
struct RecordingLookup {
    sample: Option<Vec<InventorySnapshot>>,
    asked: RefCell<Vec<u32>>,
}

impl InventoryLookup for RecordingLookup {
    type Error = core::convert::Infallible;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error> {
        self.asked.borrow_mut().push(tick);
        Ok(self.sample.clone())
    }
}

struct FailingLookup;

impl InventoryLookup for FailingLookup {
    type Error = String;

    fn inventories_at(&self, tick: u32) -> Result<Option<Vec<InventorySnapshot>>, Self::Error> {
        Err(format!("tick {} out of range", tick))
    }
}

#[test]
#[traced_test]
fn less_than_two_starts() {
    let lookup = no_inventories();

    let result = rounds::segment_rounds(&[], &ends(&[100]), &lookup).unwrap();
    assert_eq!(result, Vec::<Round>::new());

    let result = rounds::segment_rounds(&starts(&[(1, 0)]), &ends(&[100]), &lookup).unwrap();
    assert_eq!(result, Vec::<Round>::new());
}

#[test]
#[traced_test]
fn regular_match() {
    let lookup = no_inventories();

    let result = rounds::segment_rounds(
        &starts(&[(1, 100), (2, 1000), (3, 2000)]),
        &ends(&[900, 1900, 2900]),
        &lookup,
    )
    .unwrap();

    let expected = vec![
        Round {
            round_number: 1,
            start_tick: 100,
            end_tick: 900,
            winner: "CT".to_owned(),
            reason: "t_killed".to_owned(),
        },
        Round {
            round_number: 2,
            start_tick: 1000,
            end_tick: 1900,
            winner: "T".to_owned(),
            reason: "t_killed".to_owned(),
        },
        Round {
            round_number: 3,
            start_tick: 2000,
            end_tick: 2900,
            winner: "CT".to_owned(),
            reason: "t_killed".to_owned(),
        },
    ];
    assert_eq!(result, expected);
}

#[test]
#[traced_test]
fn last_round_without_end_is_dropped() {
    let lookup = no_inventories();

    let result = rounds::segment_rounds(
        &starts(&[(1, 100), (2, 1000), (3, 2000), (4, 3000)]),
        &ends(&[50, 900, 1900]),
        &lookup,
    )
    .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 100, 900), (2, 1000, 1900)]
    );
}

#[test]
#[traced_test]
fn knife_round_is_skipped() {
    let lookup = RecordingLookup {
        sample: Some(knife_inventories()),
        asked: RefCell::new(Vec::new()),
    };

    let result = rounds::segment_rounds(
        &starts(&[(1, 0), (1, 500), (2, 1500), (3, 2500)]),
        &ends(&[400, 1400, 2400, 3400]),
        &lookup,
    )
    .unwrap();

    assert_eq!(lookup.asked.borrow().as_slice(), &[250]);
    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 500, 1400), (2, 1500, 2400), (3, 2500, 3400)]
    );
}

#[test]
#[traced_test]
fn knife_round_restarts_at_same_tick() {
    let lookup = RecordingLookup {
        sample: Some(knife_inventories()),
        asked: RefCell::new(Vec::new()),
    };

    let round_starts = starts(&[(1, 0), (1, 0), (2, 500), (3, 500), (4, 1000)]);
    let round_ends = ends(&[400, 900, 1400]);

    let result = rounds::segment_rounds(&round_starts, &round_ends, &lookup).unwrap();

    assert_eq!(lookup.asked.borrow().as_slice(), &[0]);
    assert_eq!(result[0].round_number, 1);
    assert_eq!(result[0].start_tick, 0);
    assert_eq!(result[0].end_tick, 400);
    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 0, 400), (2, 500, 900), (3, 1000, 1400)]
    );

    let without_knife = rounds::segment_rounds(&round_starts, &round_ends, &no_inventories()).unwrap();
    assert_eq!(without_knife, result);
}

#[test]
#[traced_test]
fn duplicated_start_is_skipped() {
    let result = rounds::segment_rounds(
        &starts(&[(1, 100), (2, 1000), (2, 1000), (3, 2000)]),
        &ends(&[900, 1900, 2900]),
        &no_inventories(),
    )
    .unwrap();

    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 100, 900), (2, 1000, 1900), (3, 2000, 2900)]
    );
    assert_eq!(result[2].winner, "CT");
    assert!(logs_contain("Skipping overlapping round start"));
}

#[test]
#[traced_test]
fn stray_end_is_skipped() {
    let result = rounds::segment_rounds(
        &starts(&[(1, 100), (2, 1000), (3, 2000)]),
        &ends(&[900, 950, 1900, 2900]),
        &no_inventories(),
    )
    .unwrap();

    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 100, 900), (2, 1000, 1900), (3, 2000, 2900)]
    );
    assert!(logs_contain("Skipping round end before round start"));
}

#[test]
#[traced_test]
fn only_first_two_round_one_starts_are_probed() {
    let lookup = RecordingLookup {
        sample: Some(knife_inventories()),
        asked: RefCell::new(Vec::new()),
    };

    let result = rounds::segment_rounds(
        &starts(&[(1, 0), (1, 100), (1, 1000), (2, 2000)]),
        &ends(&[90, 900, 1900, 2900]),
        &lookup,
    )
    .unwrap();

    assert_eq!(lookup.asked.borrow().as_slice(), &[50]);
    assert_eq!(
        result.iter().map(|r| (r.round_number, r.start_tick, r.end_tick)).collect::<Vec<_>>(),
        vec![(1, 1000, 1900), (2, 2000, 2900)]
    );
}

#[test]
#[traced_test]
fn armed_players_are_not_a_knife_round() {
    let lookup = ProbedInventories {
        tick: 250,
        sample: Some(vec![
            inventory("Excel", &["weapon_knife"]),
            inventory("zeus", &["weapon_knife", "weapon_glock"]),
        ]),
    };

    let result = rounds::segment_rounds(
        &starts(&[(1, 0), (1, 500), (2, 1500)]),
        &ends(&[400, 1400, 2400]),
        &lookup,
    )
    .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].start_tick, 0);
}

#[test]
#[traced_test]
fn missing_inventory_sample_is_not_a_knife_round() {
    let lookup = ProbedInventories {
        tick: 250,
        sample: None,
    };

    let result = rounds::segment_rounds(
        &starts(&[(1, 0), (1, 500), (2, 1500)]),
        &ends(&[400, 1400, 2400]),
        &lookup,
    )
    .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].start_tick, 0);
}

#[test]
fn knife_classification() {
    assert!(rounds::is_knife_round(&knife_inventories()));
    assert!(rounds::is_knife_round(&[inventory("a", &[]), inventory("b", &[])]));
    assert!(!rounds::is_knife_round(&[]));
    assert!(!rounds::is_knife_round(&[inventory("a", &["weapon_knife", ""])]));
    assert!(!rounds::is_knife_round(&[inventory("a", &["weapon_c4"])]));
}

#[test]
fn probe_tick() {
    assert_eq!(rounds::knife_probe_tick(&starts(&[(1, 0), (2, 500)])), None);
    assert_eq!(rounds::knife_probe_tick(&starts(&[(1, 0)])), None);
    assert_eq!(rounds::knife_probe_tick(&starts(&[(1, 11), (2, 13), (1, 20)])), Some(15));
    assert_eq!(
        rounds::knife_probe_tick(&starts(&[(1, u32::MAX - 1), (1, u32::MAX)])),
        Some(u32::MAX - 1)
    );
}

#[test]
#[traced_test]
fn lookup_failure_is_propagated() {
    let result = rounds::segment_rounds(
        &starts(&[(1, 0), (1, 500), (2, 1500)]),
        &ends(&[400, 1400, 2400]),
        &FailingLookup,
    );

    assert_eq!(result, Err("tick 250 out of range".to_owned()));
}

#[test]
#[traced_test]
fn no_end_after_first_start() {
    let result = rounds::segment_rounds(
        &starts(&[(1, 1000), (2, 2000)]),
        &ends(&[100, 500]),
        &no_inventories(),
    )
    .unwrap();

    assert!(result.is_empty());
}

#[test]
#[traced_test]
fn segmenting_twice_gives_same_rounds() {
    let round_starts = starts(&[(1, 0), (1, 500), (2, 1500), (3, 2500)]);
    let round_ends = ends(&[400, 1400, 2400]);
    let lookup: HashMap<u32, Vec<InventorySnapshot>> =
        [(250, knife_inventories())].into_iter().collect();

    let first = rounds::segment_rounds(&round_starts, &round_ends, &lookup).unwrap();
    let second = rounds::segment_rounds(&round_starts, &round_ends, &lookup).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
