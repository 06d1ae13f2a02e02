pub mod accumulator;
pub mod block_body;
pub mod header;
pub mod header_with_proof;
pub mod receipts;
pub mod trie;
