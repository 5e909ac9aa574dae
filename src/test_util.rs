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

//! Shared test fixtures. Not part of the public API; `#[cfg(test)]` only.

use crate::chain::{Cache, CacheProvider, ChainReader, HashimotoLight, State};
use crate::error::ConsensusError;
use crate::header::{Block, Header};
use crate::params::ChainConfig;
use crate::seal::TEST_DATASET_SIZE;
use ethereum_types::{Address, Bloom, H256, H64, U256};
use std::collections::HashMap;

/// Install the `env_logger` subscriber so tests exercising `trace!`/
/// `debug!`/`warn!` call sites (difficulty, verify, seal, rewards, batch)
/// actually emit somewhere when run with `RUST_LOG` set. Safe to call from
/// more than one test in a process; `try_init` only installs once.
pub fn init_test_logging() {
	let _ = ::env_logger::try_init();
}

pub fn test_header(f: impl FnOnce(&mut Header)) -> Header {
	let mut header = Header {
		parent_hash: H256::zero(),
		uncle_hash: H256::zero(),
		coinbase: Address::zero(),
		root: H256::zero(),
		tx_hash: H256::zero(),
		receipts_hash: H256::zero(),
		bloom: Bloom::zero(),
		difficulty: U256::from(1u64),
		number: 1,
		gas_limit: 5_000_000,
		gas_used: 0,
		time: 1000,
		extra: Vec::new(),
		mix_digest: H256::zero(),
		nonce: H64::zero(),
	};
	f(&mut header);
	header
}

#[derive(Debug, Clone, Copy)]
pub struct TestChainConfig;

impl ChainConfig for TestChainConfig {
	fn is_homestead(&self, _number: u64) -> bool {
		true
	}
	fn is_byzantium(&self, _number: u64) -> bool {
		true
	}
	fn is_eip158(&self, _number: u64) -> bool {
		true
	}
}

pub fn test_chain_config() -> TestChainConfig {
	TestChainConfig
}

/// A `ChainReader` backed by plain maps, populated by the test as needed.
/// Fork guards succeed unconditionally unless `fail_dao`/`fail_fork_hash`
/// are set.
#[derive(Default)]
pub struct TestChainReader {
	pub headers: HashMap<(H256, u64), Header>,
	pub blocks: HashMap<(H256, u64), Block<(), ()>>,
	pub fail_dao: bool,
	pub fail_fork_hash: bool,
}

impl TestChainReader {
	pub fn with_ancestors(headers: Vec<Header>) -> Self {
		let mut reader = TestChainReader::default();
		for h in headers {
			reader.headers.insert((h.hash(), h.number), h);
		}
		reader
	}

	pub fn insert_block(&mut self, block: Block<(), ()>) {
		self.headers.insert((block.header.hash(), block.header.number), block.header.clone());
		self.blocks.insert((block.header.hash(), block.header.number), block);
	}
}

impl ChainReader for TestChainReader {
	type Config = TestChainConfig;
	type Tx = ();
	type Receipt = ();

	fn config(&self) -> &Self::Config {
		&TestChainConfig
	}

	fn get_header(&self, hash: H256, number: u64) -> Option<Header> {
		self.headers.get(&(hash, number)).cloned()
	}

	fn get_block(&self, hash: H256, number: u64) -> Option<Block<Self::Tx, Self::Receipt>> {
		self.blocks.get(&(hash, number)).cloned()
	}

	fn verify_dao_header_extra_data(&self, _header: &Header) -> Result<(), ConsensusError> {
		if self.fail_dao { Err(ConsensusError::InvalidDaoExtraData) } else { Ok(()) }
	}

	fn verify_fork_hashes(&self, _header: &Header, _is_uncle: bool) -> Result<(), ConsensusError> {
		if self.fail_fork_hash { Err(ConsensusError::InvalidForkHash(0)) } else { Ok(()) }
	}
}

pub fn test_chain_reader() -> TestChainReader {
	TestChainReader::default()
}

/// In-memory `State`, recording every balance credit so tests can assert
/// on exact deltas (§8 P7/P8).
#[derive(Default, Debug, Clone)]
pub struct FakeState {
	pub balances: HashMap<Address, U256>,
}

impl FakeState {
	pub fn balance_of(&self, address: Address) -> U256 {
		self.balances.get(&address).copied().unwrap_or_default()
	}
}

impl State for FakeState {
	fn add_balance(&mut self, address: Address, wei: U256) {
		*self.balances.entry(address).or_insert_with(U256::zero) += wei;
	}

	fn intermediate_root(&mut self, _eip158_active: bool) -> H256 {
		H256::zero()
	}
}

pub struct FakeCache;
impl Cache for FakeCache {}

pub struct FakeCacheProvider;
impl CacheProvider for FakeCacheProvider {
	type Cache = FakeCache;
	fn cache(&self, _block_number: u64) -> Self::Cache {
		FakeCache
	}
	fn dataset_size(&self, _block_number: u64) -> u64 {
		TEST_DATASET_SIZE
	}
}

enum FakePowMode {
	EchoMixDigest,
	MismatchedDigest,
	ResultAboveTarget,
}

pub struct FakePow(FakePowMode);

impl FakePow {
	pub fn always_valid() -> Self {
		FakePow(FakePowMode::EchoMixDigest)
	}
	pub fn mismatched_digest() -> Self {
		FakePow(FakePowMode::MismatchedDigest)
	}
	pub fn result_above_target() -> Self {
		FakePow(FakePowMode::ResultAboveTarget)
	}
}

impl HashimotoLight for FakePow {
	type Cache = FakeCache;

	fn hashimoto_light(&self, _dataset_size: u64, _cache: &FakeCache, _header_hash: H256, _nonce: u64) -> (H256, H256) {
		match self.0 {
			FakePowMode::EchoMixDigest => (H256::zero(), H256::zero()),
			FakePowMode::MismatchedDigest => (H256::repeat_byte(0xAB), H256::zero()),
			FakePowMode::ResultAboveTarget => (H256::zero(), H256::repeat_byte(0xFF)),
		}
	}
}
