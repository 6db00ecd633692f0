//! End-to-end: JSON lines in, record streams + manifest out, then verify

use std::fs;
use std::path::Path;

use bifrost_records::{read_stream, NodeRecord, WayNodeRecord, WayRecord};
use bifrost_transcode::cli::{run_convert, ConvertArgs};
use bifrost_transcode::manifest::{Manifest, MANIFEST_FILE};
use bifrost_transcode::pipeline::{NODES_FILE, WAYS_FILE, WAY_NODES_FILE};
use bifrost_transcode::{verify_output, TranscodeConfig};
use tempfile::tempdir;

const SEGMENTS: &str = r#"{"id":"s1","geometry":[[4.40,51.20],[4.41,51.20],[4.42,51.20]],"subtype":"road","class":"motorway","connectors":[{"connector_id":"C1","at":0.0},{"connector_id":"C2","at":1.0}],"speed_limits":[{"max_speed":{"value":70,"unit":"mph"}}],"lanes":{"total":3}}
{"id":"s2","geometry":[[4.42,51.20],[4.42,51.21]],"class":"residential","road_surface":"asphalt","connectors":[{"connector_id":"C2","at":0.0}],"access_restrictions":[{"access_type":"denied","when":{"heading":"backward","mode":["car"]}}]}

{"id":"s3","geometry":[[4.43,51.20]]}
{"id":"s4","geometry":[[4.42,51.21],[4.43,51.22]],"class":"footway","connectors":[{"connector_id":"C3","at":0.5}]}
{"id":"s5","geometry":[[4.42,51.21],[4.43,51.21],[4.44,51.21]],"class":"tertiary","connectors":[{"connector_id":"C4","at":0.37}]}
"#;

const CONNECTORS: &str = r#"{"id":"C1","geometry":[4.40,51.20]}
{"id":"C2","geometry":[4.42,51.20]}
{"id":"C4","geometry":[4.43,51.21]}
"#;

fn convert(dir: &Path, config: TranscodeConfig) -> Manifest {
    let segments = dir.join("segments.jsonl");
    let connectors = dir.join("connectors.jsonl");
    fs::write(&segments, SEGMENTS).unwrap();
    fs::write(&connectors, CONNECTORS).unwrap();

    run_convert(ConvertArgs {
        segments,
        connectors: Some(connectors),
        output_dir: dir.join("out"),
        config,
    })
    .unwrap()
}

#[test]
fn test_convert_and_verify() {
    let dir = tempdir().unwrap();
    let manifest = convert(dir.path(), TranscodeConfig::default());
    let out = dir.path().join("out");

    assert_eq!(manifest.segments_read, 5);
    assert_eq!(manifest.excluded["degenerate_segment"], 1);
    // s4: 0.5 is not a vertex fraction and C3 has no connector record
    assert_eq!(manifest.excluded["unresolved_connector"], 1);
    assert!(!manifest.cancelled);
    assert_eq!(Manifest::read(out.join(MANIFEST_FILE)).unwrap(), manifest);

    let report = verify_output(&out).unwrap();
    assert_eq!(report.ways, 3);

    let ways: Vec<WayRecord> = read_stream(out.join(WAYS_FILE)).unwrap();
    let nodes: Vec<NodeRecord> = read_stream(out.join(NODES_FILE)).unwrap();
    let way_nodes: Vec<WayNodeRecord> = read_stream(out.join(WAY_NODES_FILE)).unwrap();

    // s1: 70 mph -> 113 km/h, tagged, three lanes
    assert_eq!(ways[0].speeds.speed, 113);
    assert_eq!(ways[0].speeds.speed_limit, 113);
    assert!(ways[0].attributes.tagged_speed);
    assert_eq!(ways[0].classification.lanes, 3);

    // s2: cars denied backward
    assert!(ways[1].attributes.oneway);

    // s5 is the third emitted way; C4 placed by its own coordinate
    assert_eq!(ways[2].way_id, 3);
    let s5: Vec<&WayNodeRecord> = way_nodes.iter().filter(|wn| wn.way_index == 2).collect();
    assert_eq!(s5.len(), 3);
    assert!(s5[1].node.attributes.intersection);
    assert!(!s5[0].node.attributes.intersection);

    assert_eq!(nodes.len() as u64, manifest.streams.nodes.records);
    assert_eq!(way_nodes.len(), 3 + 2 + 3);
}

#[test]
fn test_repeated_conversion_is_byte_identical() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let config = TranscodeConfig {
        batch_size: 2,
        threads: Some(3),
        ..Default::default()
    };
    convert(first.path(), config.clone());
    convert(second.path(), config);

    for file in [WAYS_FILE, NODES_FILE, WAY_NODES_FILE, MANIFEST_FILE] {
        let a = fs::read(first.path().join("out").join(file)).unwrap();
        let b = fs::read(second.path().join("out").join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn test_malformed_input_aborts() {
    let dir = tempdir().unwrap();
    let segments = dir.path().join("segments.jsonl");
    fs::write(
        &segments,
        "{\"id\":\"a\",\"geometry\":[[0,0],[1,0]]}\n{\"id\":\"b\",\"geometry\":\n",
    )
    .unwrap();

    let err = run_convert(ConvertArgs {
        segments,
        connectors: None,
        output_dir: dir.path().join("out"),
        config: TranscodeConfig::default(),
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("segments.jsonl:2"));
}
