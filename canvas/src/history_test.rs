use super::*;
use crate::doc::PositionedNode;
use crate::geometry::Point;

fn snap(tag: usize) -> GraphSnapshot {
    GraphSnapshot::new(vec![PositionedNode::new(format!("n{tag}"), format!("state {tag}"), Point::default())], vec![])
}

fn tag(ledger: &HistoryLedger) -> &str {
    ledger.current().nodes[0].id.as_str()
}

#[test]
fn new_ledger_has_single_seed() {
    let ledger = HistoryLedger::new(snap(0));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.cursor(), 0);
    assert!(!ledger.can_undo());
    assert!(!ledger.can_redo());
    assert!(!ledger.is_empty());
    assert_eq!(ledger.capacity(), HISTORY_CAPACITY);
}

#[test]
fn record_moves_cursor_to_end() {
    let mut ledger = HistoryLedger::new(snap(0));
    ledger.record(snap(1));
    ledger.record(snap(2));
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.cursor(), 2);
    assert_eq!(tag(&ledger), "n2");
}

#[test]
fn undo_at_oldest_is_noop() {
    let mut ledger = HistoryLedger::new(snap(0));
    assert!(ledger.undo().is_none());
    assert_eq!(ledger.cursor(), 0);
}

#[test]
fn redo_at_newest_is_noop() {
    let mut ledger = HistoryLedger::new(snap(0));
    ledger.record(snap(1));
    assert!(ledger.redo().is_none());
    assert_eq!(ledger.cursor(), 1);
}

#[test]
fn bound_holds_after_sixty_edits() {
    let mut ledger = HistoryLedger::new(snap(0));
    for i in 1..=60 {
        ledger.record(snap(i));
    }
    assert_eq!(ledger.len(), 50);
    assert_eq!(ledger.cursor(), 49);

    let mut steps = 0;
    while ledger.undo().is_some() {
        steps += 1;
    }
    assert_eq!(steps, 49);
    // 61 states total (0..=60); the oldest survivor is the 50th from last.
    assert_eq!(tag(&ledger), "n11");
}

#[test]
fn undo_then_redo_restores_exact_snapshot() {
    let mut ledger = HistoryLedger::new(snap(0));
    ledger.record(snap(1));
    ledger.record(snap(2));
    let before = ledger.current().clone();

    let back = ledger.undo().unwrap();
    assert_eq!(back.origin, Origin::Replay);
    assert_eq!(tag(&ledger), "n1");

    let forward = ledger.redo().unwrap();
    assert_eq!(forward.origin, Origin::Replay);
    assert_eq!(*forward.snapshot, before);
    assert_eq!(*ledger.current(), before);
}

#[test]
fn edit_after_undo_discards_redo_branch() {
    let mut ledger = HistoryLedger::new(snap(0));
    ledger.record(snap(1));
    ledger.record(snap(2));
    ledger.undo();
    ledger.undo();
    ledger.record(snap(9));

    assert!(!ledger.can_redo());
    assert!(ledger.redo().is_none());
    assert_eq!(ledger.len(), 2);
    assert_eq!(tag(&ledger), "n9");
}

#[test]
fn observe_records_edits_only() {
    let mut ledger = HistoryLedger::new(snap(0));
    assert!(ledger.observe(&Transition::edit(snap(1))));
    assert_eq!(ledger.len(), 2);

    let replay = ledger.undo().unwrap();
    assert!(!ledger.observe(&replay));
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.cursor(), 0);
    assert!(ledger.can_redo());
}

#[test]
fn replay_shares_stored_snapshot() {
    let mut ledger = HistoryLedger::new(snap(0));
    ledger.record(snap(1));
    let replay = ledger.undo().unwrap();
    assert!(Arc::ptr_eq(&replay.snapshot, &ledger.current_arc()));
}

#[test]
fn reset_replaces_everything() {
    let mut ledger = HistoryLedger::new(snap(0));
    for i in 1..5 {
        ledger.record(snap(i));
    }
    ledger.undo();
    ledger.reset(snap(42));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.cursor(), 0);
    assert_eq!(tag(&ledger), "n42");
    assert!(!ledger.can_undo());
    assert!(!ledger.can_redo());
}

#[test]
fn custom_capacity_drops_oldest() {
    let mut ledger = HistoryLedger::with_capacity(snap(0), 3);
    for i in 1..=5 {
        ledger.record(snap(i));
    }
    assert_eq!(ledger.len(), 3);
    ledger.undo();
    ledger.undo();
    assert_eq!(tag(&ledger), "n3");
}

#[test]
fn zero_capacity_still_holds_displayed_state() {
    let mut ledger = HistoryLedger::with_capacity(snap(0), 0);
    ledger.record(snap(1));
    assert_eq!(ledger.len(), 1);
    assert_eq!(tag(&ledger), "n1");
}
