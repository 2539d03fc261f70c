//! Header chain tracker
//!
//! Headers are accepted ahead of their blocks so ancestry can be checked
//! before the bodies are downloaded. The chain is linear: a header is only
//! appended if it links to the current tip.

use chain_core::{BlockHeight, Hash256, Header};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Linear chain of headers starting at genesis
#[derive(Debug, Clone)]
pub struct HeaderChain {
    hashes: Vec<Hash256>,
    headers: HashMap<Hash256, Header>,
}

impl HeaderChain {
    /// Start a chain at `genesis`
    pub fn new(genesis: Header) -> Self {
        let hash = genesis.hash();
        let mut headers = HashMap::new();
        headers.insert(hash, genesis);
        Self {
            hashes: vec![hash],
            headers,
        }
    }

    /// Height of the tip
    pub fn height(&self) -> BlockHeight {
        (self.hashes.len() - 1) as BlockHeight
    }

    pub fn tip_hash(&self) -> Hash256 {
        self.hashes[self.hashes.len() - 1]
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.headers.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash256) -> Option<&Header> {
        self.headers.get(hash)
    }

    pub fn hash_at(&self, height: BlockHeight) -> Option<Hash256> {
        self.hashes.get(height as usize).copied()
    }

    /// Current frontier. A linear chain has a single leaf.
    pub fn leaf_hashes(&self) -> Vec<Hash256> {
        vec![self.tip_hash()]
    }

    /// Append `headers` in order. Known headers are skipped; the first
    /// header that does not extend the tip ends the batch. Returns the
    /// number of headers appended.
    pub fn add_headers(&mut self, headers: &[Header]) -> usize {
        let mut added = 0;
        for header in headers {
            let hash = header.hash();
            if self.contains(&hash) {
                continue;
            }
            if header.prev_hash() != self.tip_hash() || header.height() != self.height() + 1 {
                debug!(
                    "Header #{} {} does not extend tip #{}, stopping",
                    header.height(),
                    hash,
                    self.height()
                );
                break;
            }
            self.push(header.clone());
            added += 1;
        }
        added
    }

    /// Record the header of a committed block. Speculative headers at or
    /// above its height that disagree with it are dropped.
    pub fn accept_block_header(&mut self, header: &Header) {
        let hash = header.hash();
        if self.hash_at(header.height()) == Some(hash) {
            return;
        }
        let height = header.height() as usize;
        if height < self.hashes.len() {
            warn!(
                "Block #{} {} replaces {} speculative headers",
                header.height(),
                hash,
                self.hashes.len() - height
            );
            for stale in self.hashes.split_off(height) {
                self.headers.remove(&stale);
            }
        }
        self.push(header.clone());
    }

    fn push(&mut self, header: Header) {
        let hash = header.hash();
        self.hashes.push(hash);
        self.headers.insert(hash, header);
    }
}
