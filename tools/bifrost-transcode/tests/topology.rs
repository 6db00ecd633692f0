//! In-memory topology tests over the whole resolve/assemble pipeline

use std::collections::BTreeMap;

use bifrost_records::{NodeRecord, WayNodeRecord};
use bifrost_transcode::profiles::{RoadClass, Surface};
use bifrost_transcode::{
    AccessAssignment, Coordinate, Disposition, Heading, MemorySink, Mode, Segment,
    SegmentErrorKind, TranscodeConfig, Transcoder,
};

fn transcode(segments: Vec<Segment>) -> (MemorySink, bifrost_transcode::RunSummary) {
    let transcoder = Transcoder::new(TranscodeConfig::default()).unwrap();
    let mut sink = MemorySink::default();
    let summary = transcoder.run(segments, &mut sink).unwrap();
    (sink, summary)
}

fn line(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points
        .iter()
        .map(|&(lon, lat)| Coordinate::new(lon, lat))
        .collect()
}

#[test]
fn test_three_point_motorway_example() {
    let segment = Segment::new(
        "s1",
        line(&[(4.40, 51.20), (4.41, 51.20), (4.42, 51.20)]),
    )
    .with_class("motorway")
    .with_connector("C1", 0.0)
    .with_connector("C2", 1.0);

    let (sink, summary) = transcode(vec![segment]);
    assert_eq!(summary.ways, 1);
    assert_eq!(summary.connectors, 2);

    let way = &sink.ways[0];
    assert_eq!(way.node_count, 3);
    assert_eq!(way.classification.road_class, RoadClass::Motorway.code());
    assert_eq!(way.speeds.speed, 120);
    assert_eq!(way.speeds.speed_limit, 0);

    let forward = way.access.forward;
    let backward = way.access.backward;
    for access in [forward, backward] {
        assert!(access.auto && access.bus && access.truck);
    }
    assert!(way.bike.bike_forward && way.bike.bike_backward);
    assert!(way.classification.pedestrian_forward && way.classification.pedestrian_backward);
    assert!(!way.attributes.oneway && !way.attributes.oneway_reverse);

    let shape: Vec<u32> = sink
        .way_nodes
        .iter()
        .map(|wn| wn.way_shape_node_index)
        .collect();
    assert_eq!(shape, vec![0, 1, 2]);
    let intersections: Vec<bool> = sink
        .way_nodes
        .iter()
        .map(|wn| wn.node.attributes.intersection)
        .collect();
    assert_eq!(intersections, vec![true, false, true]);

    // C1, the shape point, then C2, in first-encounter order
    let ids: Vec<u64> = sink.nodes.iter().map(|n| n.osm_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(sink.way_nodes[0].node, sink.nodes[0]);
    assert_eq!(sink.way_nodes[2].node, sink.nodes[2]);
}

#[test]
fn test_connector_consistency_across_segments() {
    let segments = vec![
        Segment::new("a", line(&[(0.0, 0.0), (0.001, 0.0)]))
            .with_connector("C1", 0.0)
            .with_connector("C2", 1.0),
        Segment::new("b", line(&[(0.001, 0.0), (0.002, 0.0), (0.002, 0.001)]))
            .with_connector("C2", 0.0)
            .with_connector("C3", 1.0),
        Segment::new("c", line(&[(0.002, 0.001), (0.0, 0.0)]))
            .with_connector("C3", 0.0)
            .with_connector("C1", 1.0),
    ];
    let (sink, summary) = transcode(segments);
    assert_eq!(summary.connectors, 3);

    // every occurrence of an intersection node embeds the same record
    let mut seen: BTreeMap<u64, NodeRecord> = BTreeMap::new();
    for wn in sink.way_nodes.iter().filter(|wn| wn.node.attributes.intersection) {
        let first = *seen.entry(wn.node.osm_id).or_insert(wn.node);
        assert_eq!(first, wn.node);
    }
    assert_eq!(seen.len(), 3);

    // node stream: one record per distinct node, ascending ids
    assert_eq!(sink.nodes.len(), 4);
    assert!(sink.nodes.windows(2).all(|w| w[0].osm_id < w[1].osm_id));
}

#[test]
fn test_node_count_invariant() {
    let segments: Vec<Segment> = (0..20)
        .map(|i| {
            let n = 2 + i % 5;
            let geometry = (0..n)
                .map(|k| Coordinate::new(0.001 * k as f64, 0.001 * i as f64))
                .collect();
            Segment::new(format!("s{i}"), geometry)
        })
        .collect();
    let (sink, _) = transcode(segments);

    let mut runs: BTreeMap<u32, Vec<&WayNodeRecord>> = BTreeMap::new();
    for wn in &sink.way_nodes {
        runs.entry(wn.way_index).or_default().push(wn);
    }
    assert_eq!(runs.len(), sink.ways.len());
    for (way_index, way) in sink.ways.iter().enumerate() {
        let run = &runs[&(way_index as u32)];
        assert_eq!(run.len(), way.node_count as usize);
        let shape: Vec<u32> = run.iter().map(|wn| wn.way_shape_node_index).collect();
        assert_eq!(shape, (0..way.node_count as u32).collect::<Vec<_>>());
    }
}

#[test]
fn test_access_tie_break_in_way_bits() {
    let segment = Segment::new("t", line(&[(0.0, 0.0), (0.001, 0.0)]))
        .with_access(AccessAssignment::new(Disposition::Denied, Mode::Foot))
        .with_access(AccessAssignment::new(Disposition::Designated, Mode::Bicycle));
    let (sink, _) = transcode(vec![segment]);
    let way = &sink.ways[0];

    assert!(way.bike.bike_forward && way.bike.bike_backward);
    assert!(!way.classification.pedestrian_forward && !way.classification.pedestrian_backward);
    // nothing applies to auto, so it keeps the default
    assert!(way.access.forward.auto && way.access.backward.auto);
}

#[test]
fn test_directional_denial_makes_oneway() {
    let segment = Segment::new("o", line(&[(0.0, 0.0), (0.001, 0.0)]))
        .with_class("primary")
        .with_access(
            AccessAssignment::new(Disposition::Denied, Mode::MotorVehicle)
                .heading(Heading::Backward),
        );
    let (sink, _) = transcode(vec![segment]);
    let way = &sink.ways[0];

    assert!(way.attributes.oneway);
    assert!(!way.attributes.oneway_reverse);
    assert!(way.access.forward.truck && !way.access.backward.truck);
    assert!(way.access.forward.bus && !way.access.backward.bus);
    // bicycles are not motor vehicles
    assert!(way.bike.bike_backward);
}

#[test]
fn test_untagged_defaults() {
    let segment = Segment::new("u", line(&[(0.0, 0.0), (0.001, 0.0)]))
        .with_class("something_new");
    let (sink, _) = transcode(vec![segment]);
    let way = &sink.ways[0];
    assert_eq!(way.classification.road_class, RoadClass::Unclassified.code());
    assert_eq!(way.attributes.surface, Surface::Path.code());
    assert!(way.attributes.drive_on_right);
}

#[test]
fn test_excluded_segments_counted() {
    let segments = vec![
        Segment::new("ok", line(&[(0.0, 0.0), (0.001, 0.0)])),
        Segment::new("point", line(&[(0.0, 0.0)])),
        Segment::new("empty", Vec::new()),
        Segment::new("stray", line(&[(0.0, 0.0), (0.001, 0.0), (0.002, 0.0)]))
            .with_connector("X", 0.25),
        Segment::new("nan", line(&[(0.0, 0.0), (0.001, 0.0)])).with_connector("Y", f64::NAN),
    ];
    let (sink, summary) = transcode(segments);

    assert_eq!(summary.segments_read, 5);
    assert_eq!(summary.ways, 1);
    assert_eq!(summary.excluded[&SegmentErrorKind::DegenerateSegment], 2);
    assert_eq!(summary.excluded[&SegmentErrorKind::UnresolvedConnector], 2);
    assert_eq!(sink.ways.len(), 1);
    assert_eq!(sink.way_nodes.len(), 2);
}

#[test]
fn test_repeated_runs_identical() {
    let segments = || {
        vec![
            Segment::new("a", line(&[(0.0, 0.0), (0.001, 0.0)])).with_connector("C", 1.0),
            Segment::new("b", line(&[(0.001, 0.0), (0.001, 0.002)]))
                .with_connector("C", 0.0)
                .with_class("residential"),
        ]
    };
    let (first, _) = transcode(segments());
    let (second, _) = transcode(segments());
    assert_eq!(first, second);
}
