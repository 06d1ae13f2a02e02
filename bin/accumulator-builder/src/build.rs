use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::Path,
};

use alloy_primitives::B256;
use alloy_rlp::Decodable;
use anyhow::{anyhow, Context};
use portal_api::{utils::bytes::hex_decode, EpochAccumulator, Header};
use portal_validation::builder::AccumulatorBuilder;
use ssz::Encode;
use tracing::{debug, info};
use tree_hash::TreeHash;

pub const PRE_MERGE_ACC_FILE_NAME: &str = "pre_merge_acc.bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub root: B256,
    pub header_count: u64,
    pub epoch_count: usize,
}

/// File name of the epoch accumulator at `epoch_index`, which sorts in epoch order.
pub fn epoch_file_name(epoch_index: usize, epoch_root: B256) -> String {
    format!("epoch-{epoch_index:05}-{epoch_root}.bin")
}

/// Reads headers from `headers_path` and writes the pre-merge accumulator plus one file per
/// epoch accumulator into `output_dir`.
pub fn build_accumulators(headers_path: &Path, output_dir: &Path) -> anyhow::Result<BuildSummary> {
    let file = File::open(headers_path)
        .with_context(|| format!("Unable to open headers file {headers_path:?}"))?;
    fs::create_dir_all(output_dir)?;

    let mut builder = AccumulatorBuilder::new();
    let mut epoch_count = 0;
    for (line_number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let header = decode_header(line)
            .with_context(|| format!("Invalid header on line {}", line_number + 1))?;
        if let Some(epoch_acc) = builder.update(&header)? {
            write_epoch(output_dir, epoch_count, &epoch_acc)?;
            epoch_count += 1;
        }
    }

    let header_count = builder.next_block_number();
    let (accumulator, last_epoch) = builder.finish()?;
    if let Some(epoch_acc) = last_epoch {
        write_epoch(output_dir, epoch_count, &epoch_acc)?;
        epoch_count += 1;
    }
    let root = accumulator.tree_hash_root();
    fs::write(
        output_dir.join(PRE_MERGE_ACC_FILE_NAME),
        accumulator.as_ssz_bytes(),
    )?;
    info!(root = %root, epochs = epoch_count, "Wrote pre-merge accumulator");

    Ok(BuildSummary {
        root,
        header_count,
        epoch_count,
    })
}

fn decode_header(line: &str) -> anyhow::Result<Header> {
    let rlp = hex_decode(line)?;
    Header::decode(&mut rlp.as_slice()).map_err(|err| anyhow!("Unable to decode header: {err}"))
}

fn write_epoch(
    output_dir: &Path,
    epoch_index: usize,
    epoch_acc: &EpochAccumulator,
) -> anyhow::Result<()> {
    let epoch_root = epoch_acc.tree_hash_root();
    let path = output_dir.join(epoch_file_name(epoch_index, epoch_root));
    fs::write(&path, epoch_acc.as_ssz_bytes())?;
    debug!(
        epoch.index = epoch_index,
        epoch.root = %epoch_root,
        "Wrote epoch accumulator to {path:?}"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use portal_api::utils::bytes::hex_encode;
    use portal_validation::{accumulator::PreMergeAccumulator, test_utils::ProvenChain};
    use ssz::Decode;
    use tempfile::TempDir;

    use super::*;

    fn write_headers(dir: &Path, proven: &ProvenChain) -> std::path::PathBuf {
        let path = dir.join("headers.txt");
        let mut file = File::create(&path).unwrap();
        for header in &proven.headers {
            writeln!(file, "{}", hex_encode(alloy_rlp::encode(header))).unwrap();
        }
        // Trailing blank lines are skipped.
        writeln!(file).unwrap();
        path
    }

    #[test]
    fn builds_accumulators_from_headers() {
        let temp_dir = TempDir::new().unwrap();
        let proven = ProvenChain::new(20).unwrap();
        let headers_path = write_headers(temp_dir.path(), &proven);
        let output_dir = temp_dir.path().join("out");

        let summary = build_accumulators(&headers_path, &output_dir).unwrap();
        assert_eq!(summary.root, proven.accumulator.tree_hash_root());
        assert_eq!(summary.header_count, 20);
        assert_eq!(summary.epoch_count, 1);

        let accumulator =
            PreMergeAccumulator::try_from_file(&output_dir.join(PRE_MERGE_ACC_FILE_NAME)).unwrap();
        assert_eq!(accumulator, *proven.accumulator);

        let epoch_root = proven.epochs[0].tree_hash_root();
        let epoch_bytes = fs::read(output_dir.join(epoch_file_name(0, epoch_root))).unwrap();
        let epoch_acc = EpochAccumulator::from_ssz_bytes(&epoch_bytes).unwrap();
        assert_eq!(epoch_acc, proven.epochs[0]);
    }

    #[test]
    fn invalid_header_line_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let headers_path = temp_dir.path().join("headers.txt");
        fs::write(&headers_path, "0xc0ffee\n").unwrap();

        let err = build_accumulators(&headers_path, &temp_dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
