use std::sync::Arc;

use alloy_primitives::B256;
use anyhow::anyhow;
use eth_trie::{EthTrie, MemoryDB, Trie};

/// Root of the Merkle-Patricia trie mapping `rlp(index)` to each item, in order.
///
/// This is how transactions, receipts and withdrawals are committed to in a header.
pub fn ordered_trie_root<T: AsRef<[u8]>>(items: &[T]) -> anyhow::Result<B256> {
    let memdb = Arc::new(MemoryDB::new(true));
    let mut trie = EthTrie::new(memdb);
    for (index, item) in items.iter().enumerate() {
        let path = alloy_rlp::encode(index);
        trie.insert(&path, item.as_ref())
            .map_err(|err| anyhow!("Error inserting into ordered trie: {err:?}"))?;
    }
    trie.root_hash()
        .map_err(|err| anyhow!("Error calculating ordered trie root: {err:?}"))
}
