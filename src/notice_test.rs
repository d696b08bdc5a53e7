use super::*;

#[test]
fn notice_visible_until_ttl() {
    let mut board = NoticeBoard::new();
    let now = Instant::now();
    board.post_at("Copied 2 node(s)", NoticeLevel::Info, now);

    assert_eq!(board.current_at(now).map(|n| n.message.as_str()), Some("Copied 2 node(s)"));
    assert!(board.current_at(now + Duration::from_millis(1999)).is_some());
    assert!(board.current_at(now + NOTICE_TTL).is_none());
}

#[test]
fn newer_notice_replaces_current() {
    let mut board = NoticeBoard::new();
    let start = Instant::now();
    board.post_at("first", NoticeLevel::Info, start);
    board.post_at("second", NoticeLevel::Error, start + Duration::from_millis(1500));

    let later = start + Duration::from_millis(2500);
    let notice = board.current_at(later).unwrap();
    assert_eq!(notice.message, "second");
    assert_eq!(notice.level, NoticeLevel::Error);
}

#[test]
fn prune_removes_only_expired() {
    let mut board = NoticeBoard::new();
    let now = Instant::now();
    assert!(!board.prune_at(now));

    board.post_at("x", NoticeLevel::Info, now);
    assert!(!board.prune_at(now + Duration::from_secs(1)));
    assert!(board.prune_at(now + Duration::from_secs(3)));
    assert!(board.current_at(now).is_none());
}

#[test]
fn clock_before_post_still_shows_notice() {
    let mut board = NoticeBoard::new();
    let now = Instant::now() + Duration::from_secs(10);
    board.post_at("x", NoticeLevel::Info, now);
    assert!(board.current_at(now - Duration::from_secs(1)).is_some());
}

#[test]
fn clear_empties_board() {
    let mut board = NoticeBoard::new();
    board.post("x", NoticeLevel::Info);
    board.clear();
    assert!(board.current().is_none());
}
