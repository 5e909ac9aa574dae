// Copyright 2018-2020 EGEM Contributors
// This file is part of egem-ethcore.

// egem-ethcore is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// egem-ethcore is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with egem-ethcore.  If not, see <http://www.gnu.org/licenses/>.

//! EGEM consensus engine.
//!
//! A standalone, embedder-agnostic implementation of EGEM's Ethash-family
//! proof-of-work consensus rules: difficulty adjustment, header/uncle
//! verification (single and parallel batch), seal checking, and era-based
//! block reward accumulation. The chain database, state trie and the PoW
//! primitive itself are left to the embedder via the traits in [`chain`].

#[macro_use]
extern crate log;

mod batch;
mod chain;
mod difficulty;
mod engine;
mod error;
mod header;
mod params;
mod rewards;
mod seal;
mod uncles;
mod verify;

#[cfg(test)]
mod test_util;

pub use batch::{verify_headers, AbortHandle, SealCheck};
pub use chain::{Cache, CacheProvider, ChainReader, HashimotoLight, State};
pub use difficulty::calc_difficulty;
pub use engine::EgemEngine;
pub use error::{ConsensusError, Mismatch, OutOfBounds};
pub use header::{Block, Header, MAX_EXTRA_DATA_SIZE, MAX_UNCLES};
pub use params::{ChainConfig, EgemParams, Era};
pub use rewards::{accumulate_rewards, dev_fund_addresses};
pub use seal::{verify_seal, FakeParams, PowMode, TEST_DATASET_SIZE};
pub use uncles::verify_uncles;
pub use verify::{now_unix, verify_header, verify_header_basic};
