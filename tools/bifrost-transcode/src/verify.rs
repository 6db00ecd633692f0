//! Output verification against `manifest.json`
//!
//! A. Stream integrity: alignment, record counts and CRC-64 per stream.
//! B. Topology: node identifiers strictly ascending, way-node runs contiguous
//!    and in way order, each run as long as its way's `node_count`, every
//!    referenced node present in the node stream.

use anyhow::{bail, Context, Result};
use bifrost_records::{verify_stream, NodeRecord, Record, RecordReader, WayNodeRecord, WayRecord};
use std::path::Path;

use crate::manifest::{Manifest, StreamEntry, MANIFEST_FILE};

/// Record counts of a verified output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub ways: u64,
    pub nodes: u64,
    pub way_nodes: u64,
}

/// Verify every condition on the output in `dir`
pub fn verify_output(dir: &Path) -> Result<VerifyReport> {
    println!("🔍 Verifying {}...", dir.display());
    let manifest = Manifest::read(dir.join(MANIFEST_FILE))?;

    println!();
    println!("A. Stream integrity:");
    check_stream::<WayRecord>(dir, &manifest.streams.ways)?;
    check_stream::<NodeRecord>(dir, &manifest.streams.nodes)?;
    check_stream::<WayNodeRecord>(dir, &manifest.streams.way_nodes)?;

    println!();
    println!("B. Topology:");
    let node_ids = check_node_order(dir, &manifest.streams.nodes)?;
    check_way_nodes(dir, &manifest, &node_ids)?;

    println!();
    println!("✅ All output checks passed!");
    Ok(VerifyReport {
        ways: manifest.streams.ways.records,
        nodes: manifest.streams.nodes.records,
        way_nodes: manifest.streams.way_nodes.records,
    })
}

fn check_stream<R: Record>(dir: &Path, entry: &StreamEntry) -> Result<()> {
    if entry.record_size != R::SIZE {
        bail!(
            "{}: manifest record size {} but {} is {} bytes",
            entry.file,
            entry.record_size,
            R::NAME,
            R::SIZE
        );
    }

    let path = dir.join(&entry.file);
    let summary = verify_stream::<R, _>(&path)
        .with_context(|| format!("Failed to verify {}", path.display()))?;

    if summary.records != entry.records {
        bail!(
            "{}: {} records on disk, manifest says {}",
            entry.file,
            summary.records,
            entry.records
        );
    }
    let expected_crc = entry.crc64_value()?;
    if summary.crc64 != expected_crc {
        bail!(
            "{}: CRC-64 {:016x} does not match manifest {:016x}",
            entry.file,
            summary.crc64,
            expected_crc
        );
    }

    println!(
        "  ✓ {}: {} records, CRC-64 {:016x}",
        entry.file, summary.records, summary.crc64
    );
    Ok(())
}

/// Node ids in stream order; fails unless strictly ascending
fn check_node_order(dir: &Path, entry: &StreamEntry) -> Result<Vec<u64>> {
    let mut ids = Vec::with_capacity(entry.records as usize);
    for node in RecordReader::<NodeRecord, _>::open(dir.join(&entry.file))? {
        let node = node?;
        if let Some(&prev) = ids.last() {
            if node.osm_id <= prev {
                bail!(
                    "{}: node id {} follows {} (ids must be strictly ascending)",
                    entry.file,
                    node.osm_id,
                    prev
                );
            }
        }
        ids.push(node.osm_id);
    }
    println!("  ✓ Node ids strictly ascending ({} nodes)", ids.len());
    Ok(ids)
}

fn check_way_nodes(dir: &Path, manifest: &Manifest, node_ids: &[u64]) -> Result<()> {
    let ways = RecordReader::<WayRecord, _>::open(dir.join(&manifest.streams.ways.file))?;
    let way_nodes =
        RecordReader::<WayNodeRecord, _>::open(dir.join(&manifest.streams.way_nodes.file))?;
    let total = check_runs(ways, way_nodes, node_ids)?;

    println!(
        "  ✓ Way-node runs match node_count ({} ways, {} way nodes)",
        manifest.streams.ways.records, total
    );
    Ok(())
}

/// Walk ways and way nodes together; returns the number of way nodes
fn check_runs<W, N>(ways: W, way_nodes: N, node_ids: &[u64]) -> Result<u64>
where
    W: IntoIterator<Item = bifrost_records::Result<WayRecord>>,
    N: IntoIterator<Item = bifrost_records::Result<WayNodeRecord>>,
{
    let mut way_nodes = way_nodes.into_iter().peekable();
    let mut total = 0u64;

    for (way_index, way) in ways.into_iter().enumerate() {
        let way = way?;
        let way_index = way_index as u32;
        let mut run = 0u32;

        // a read error is taken as part of the run and returned
        let in_run = |wn: &bifrost_records::Result<WayNodeRecord>| match wn {
            Ok(wn) => wn.way_index == way_index,
            Err(_) => true,
        };
        while let Some(next) = way_nodes.next_if(in_run) {
            let wn =
                next.with_context(|| format!("Failed to read way nodes of way {}", way.way_id))?;
            if wn.way_shape_node_index != run {
                bail!(
                    "way {} (index {}): shape index {} where {} expected",
                    way.way_id,
                    way_index,
                    wn.way_shape_node_index,
                    run
                );
            }
            if node_ids.binary_search(&wn.node.osm_id).is_err() {
                bail!(
                    "way {} references node {} missing from the node stream",
                    way.way_id,
                    wn.node.osm_id
                );
            }
            run += 1;
        }

        if run < 2 || run as u16 != way.node_count {
            bail!(
                "way {} (index {}): {} way nodes but node_count is {}",
                way.way_id,
                way_index,
                run,
                way.node_count
            );
        }
        total += run as u64;
    }

    if let Some(extra) = way_nodes.next() {
        let extra = extra?;
        bail!(
            "way node for way index {} has no matching way",
            extra.way_index
        );
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscodeConfig;
    use crate::model::{Coordinate, Segment};
    use crate::pipeline::{StreamSink, Transcoder, WAY_NODES_FILE};
    use tempfile::tempdir;

    fn convert(dir: &Path) {
        let transcoder = Transcoder::new(TranscodeConfig::default()).unwrap();
        let mut sink = StreamSink::create(dir).unwrap();
        let segments = vec![
            Segment::new(
                "a",
                vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.001, 0.0)],
            )
            .with_connector("J", 1.0),
            Segment::new(
                "b",
                vec![
                    Coordinate::new(0.001, 0.0),
                    Coordinate::new(0.001, 0.001),
                    Coordinate::new(0.002, 0.001),
                ],
            )
            .with_connector("J", 0.0),
        ];
        let run = transcoder.run(segments, &mut sink).unwrap();
        let streams = sink.finish().unwrap();
        Manifest::new(&streams, &run)
            .write(dir.join(MANIFEST_FILE))
            .unwrap();
    }

    #[test]
    fn test_verify_clean_output() {
        let dir = tempdir().unwrap();
        convert(dir.path());
        let report = verify_output(dir.path()).unwrap();
        assert_eq!(
            report,
            VerifyReport {
                ways: 2,
                nodes: 4,
                way_nodes: 5
            }
        );
    }

    #[test]
    fn test_verify_detects_corruption() {
        let dir = tempdir().unwrap();
        convert(dir.path());
        let path = dir.path().join(WAY_NODES_FILE);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[0] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();
        assert!(verify_output(dir.path()).is_err());
    }

    #[test]
    fn test_read_error_inside_run_reported() {
        let node = |id| NodeRecord {
            osm_id: id,
            ..Default::default()
        };
        let way = WayRecord {
            way_id: 1,
            node_count: 2,
            ..Default::default()
        };
        let first = WayNodeRecord {
            node: node(1),
            way_index: 0,
            way_shape_node_index: 0,
        };
        let way_nodes = vec![
            Ok(first),
            Err(bifrost_records::RecordError::TruncatedRecord {
                record: "OSMWayNode",
                expected: 56,
                actual: 20,
            }),
        ];

        let err = check_runs(vec![Ok(way)], way_nodes, &[1, 2]).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("truncated OSMWayNode"), "{message}");
        assert!(!message.contains("node_count"), "{message}");
    }

    #[test]
    fn test_runs_counted() {
        let way = WayRecord {
            way_id: 9,
            node_count: 2,
            ..Default::default()
        };
        let way_nodes = (0..2).map(|i| {
            Ok(WayNodeRecord {
                node: NodeRecord {
                    osm_id: i + 1,
                    ..Default::default()
                },
                way_index: 0,
                way_shape_node_index: i as u32,
            })
        });
        assert_eq!(check_runs(vec![Ok(way)], way_nodes, &[1, 2]).unwrap(), 2);
    }

    #[test]
    fn test_verify_detects_truncation() {
        let dir = tempdir().unwrap();
        convert(dir.path());
        let path = dir.path().join(WAY_NODES_FILE);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();
        let err = verify_output(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("way_nodes.bin"));
    }
}
