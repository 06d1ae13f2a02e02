//! Types shared by every component of the history subnetwork: content keys and ids, the XOR
//! distance metric and the execution layer data that travels over the wire.
#![warn(clippy::unwrap_used)]

pub mod types;
pub mod utils;

pub use types::{
    content_key::{
        error::ContentKeyError,
        history::{BlockHashKey, HistoryContentKey},
        overlay::OverlayContentKey,
    },
    distance::{Distance, Metric, XorMetric},
    execution::{
        accumulator::{EpochAccumulator, HeaderRecord},
        block_body::PortalBlockBody,
        header::Header,
        header_with_proof::{BlockHeaderProof, HeaderWithProof, PreMergeAccumulatorProof},
        receipts::PortalReceipts,
    },
};
