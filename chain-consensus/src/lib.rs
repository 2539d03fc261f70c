//! Bookkeeper election and protocol economics
//!
//! This crate decides who signs blocks: it derives the bookkeeper count
//! from stake-weighted votes, ranks enrolled candidates, and builds the
//! multi-signature address that the next block must be signed by. It also
//! holds the generation schedule used for claims.

pub mod config;
pub mod economics;
pub mod election;
pub mod error;
pub mod weighted;

pub use config::ConsensusConfig;
pub use economics::{
    standby_miners, DECREMENT_INTERVAL, GENERATION_AMOUNT, SECONDS_PER_BLOCK, STANDBY_MINERS,
};
pub use election::{elect_miners, get_miner_address, miner_count_target, signature_threshold};
pub use error::{ConsensusError, ConsensusResult};
pub use weighted::{weighted_average, weighted_filter, WeightedRange};
