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

//! External interfaces consumed by the core (§6).
//!
//! Everything in this module is a trait: the chain database, the state
//! trie, the Ethash cache provider and the PoW primitive are all external
//! collaborators out of scope for this crate. Only the shape the core
//! needs from them is specified here, so an embedder can wire in its own
//! blockchain/state-db implementation.

use crate::error::ConsensusError;
use crate::header::{Block, Header};
use crate::params::ChainConfig;
use ethereum_types::{Address, H256, U256};

/// Read-only view onto ancestor headers/blocks and the active chain
/// configuration. The only external lookups the core ever issues.
pub trait ChainReader {
	type Config: ChainConfig;
	type Tx;
	type Receipt;

	fn config(&self) -> &Self::Config;

	/// Returns the header for `(hash, number)` if it is known to this
	/// chain. A non-`None` result for the header *currently being
	/// verified* short-circuits verification as an already-known block
	/// (§4.2/§4.3, Q3).
	fn get_header(&self, hash: H256, number: u64) -> Option<Header>;

	/// As [`ChainReader::get_header`], but for the full block — used by
	/// the uncle verifier's ancestor walk, which also needs each
	/// ancestor's own uncle list.
	fn get_block(&self, hash: H256, number: u64) -> Option<Block<Self::Tx, Self::Receipt>>;

	/// DAO hard-fork extra-data check (external fork guard, §4.2 step 10).
	fn verify_dao_header_extra_data(&self, header: &Header) -> Result<(), ConsensusError>;

	/// Fork-hash checkpoint check (external fork guard, §4.2 step 10).
	fn verify_fork_hashes(&self, header: &Header, is_uncle: bool) -> Result<(), ConsensusError>;
}

/// Mutable account state, as consumed by reward accumulation and
/// finalization (§4.6, §4.7). The only two operations the core calls.
pub trait State {
	fn add_balance(&mut self, address: Address, wei: U256);
	fn intermediate_root(&mut self, eip158_active: bool) -> H256;
}

/// An Ethash light-verification cache for one epoch. Opaque to the core;
/// callers of [`HashimotoLight::hashimoto_light`] must keep whatever
/// guard this produces alive for the duration of that call (§5 "Shared
/// state").
pub trait Cache {}

/// Supplies the Ethash light cache for the epoch containing a given
/// block number. A cache provider keyed by epoch.
pub trait CacheProvider {
	type Cache: Cache;

	fn cache(&self, block_number: u64) -> Self::Cache;

	/// Size, in bytes, of the full Ethash dataset for the epoch
	/// containing `block_number`. Consulted by [`crate::seal::verify_seal`]
	/// outside `Test` mode, which instead uses a small fixed size.
	fn dataset_size(&self, block_number: u64) -> u64;
}

/// The Hashimoto-light PoW primitive (§2.2, §6).
pub trait HashimotoLight {
	type Cache: Cache;

	fn hashimoto_light(&self, dataset_size: u64, cache: &Self::Cache, header_hash: H256, nonce: u64) -> (H256, H256);
}
