use canvas::doc::{GraphSnapshot, PositionedEdge, PositionedNode};
use canvas::geometry::Point;
use time::macros::datetime;

use super::*;

#[test]
fn json_has_nodes_edges_and_timestamp() {
    let snap = GraphSnapshot::new(
        vec![
            PositionedNode::new("1", "Start", Point::new(0.0, 0.0)),
            PositionedNode::new("2", "End", Point::new(0.0, 180.0)),
        ],
        vec![PositionedEdge::new("edge-1-2-0", "1", "2")],
    );
    let text = render_at(&snap, datetime!(2024-05-01 12:30:00 UTC)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["exportedAt"], "2024-05-01T12:30:00Z");
    assert_eq!(value["nodes"][1]["position"]["y"], 180.0);
    assert_eq!(value["nodes"][0]["type"], "default");
    assert_eq!(value["edges"][0]["source"], "1");
    assert_eq!(value["edges"][0]["style"]["strokeWidth"], 2.0);
}

#[test]
fn json_is_pretty_printed() {
    let text = render(&GraphSnapshot::default()).unwrap();
    assert!(text.contains("\n  \"nodes\": []"));
}
