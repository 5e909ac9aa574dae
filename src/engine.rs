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

//! Engine façade (§4.7).
//!
//! `EgemEngine` is the single entry point an embedder talks to; it owns
//! the PoW primitive and cache provider generics so every other module
//! (`verify`, `uncles`, `batch`, `rewards`) can stay free of them and
//! operate on plain closures instead.

use crate::batch::{self, AbortHandle, SealCheck};
use crate::chain::{CacheProvider, ChainReader, HashimotoLight, State};
use crate::error::ConsensusError;
use crate::header::{Block, Header};
use crate::params::EgemParams;
use crate::rewards::accumulate_rewards;
use crate::seal::{self, FakeParams, PowMode};
use crate::uncles::verify_uncles;
use crate::verify::{now_unix, verify_header};
use crossbeam::channel::Receiver;
use ethereum_types::Address;
use std::sync::Arc;

/// The EGEM Ethash engine: composes the difficulty calculator, header
/// verifier, batch pipeline, uncle verifier and reward accumulator behind
/// the seven operations an embedder needs (§2 item 10).
pub struct EgemEngine<Pow, CacheProv>
where
	Pow: HashimotoLight<Cache = CacheProv::Cache>,
	CacheProv: CacheProvider,
{
	params: Arc<EgemParams>,
	mode: PowMode,
	fake: FakeParams,
	pow: Arc<Pow>,
	cache_provider: Arc<CacheProv>,
	shared: Option<Arc<EgemEngine<Pow, CacheProv>>>,
}

impl<Pow, CacheProv> EgemEngine<Pow, CacheProv>
where
	Pow: HashimotoLight<Cache = CacheProv::Cache> + Send + Sync + 'static,
	CacheProv: CacheProvider + Send + Sync + 'static,
	CacheProv::Cache: Send + Sync,
{
	pub fn new(params: Arc<EgemParams>, mode: PowMode, fake: FakeParams, pow: Pow, cache_provider: CacheProv) -> Self {
		EgemEngine { params, mode, fake, pow: Arc::new(pow), cache_provider: Arc::new(cache_provider), shared: None }
	}

	/// Build a `Shared`-mode instance that delegates `verify_seal` to
	/// `shared` instead of verifying locally (§3 "Engine instance").
	pub fn shared_with(mut self, shared: Arc<EgemEngine<Pow, CacheProv>>) -> Self {
		self.mode = PowMode::Shared;
		self.shared = Some(shared);
		self
	}

	/// `Author(header) -> header.coinbase`.
	pub fn author(&self, header: &Header) -> Address {
		header.coinbase
	}

	/// Fetch `header`'s parent and set `header.difficulty` to the value
	/// `CalcDifficulty` computes for it. Fails with `UnknownAncestor` if
	/// the parent is not known to `chain`.
	pub fn prepare<R: ChainReader>(&self, chain: &R, header: &mut Header) -> Result<(), ConsensusError> {
		let parent = chain
			.get_header(header.parent_hash, header.number.saturating_sub(1))
			.ok_or(ConsensusError::UnknownAncestor)?;
		header.difficulty = crate::difficulty::calc_difficulty(&self.params, chain.config(), &parent, header.time);
		Ok(())
	}

	/// Accumulate rewards, set the state root, and assemble the final
	/// `Block`. Infallible (§7 policy).
	pub fn finalize<R: ChainReader, S: State>(
		&self,
		chain: &R,
		mut header: Header,
		state: &mut S,
		transactions: Vec<R::Tx>,
		uncles: Vec<Header>,
		receipts: Vec<R::Receipt>,
	) -> Block<R::Tx, R::Receipt> {
		accumulate_rewards(&self.params, state, &header, &uncles);
		header.root = state.intermediate_root(chain.config().is_eip158(header.number));
		Block::new(header, transactions, uncles, receipts)
	}

	/// Verify a single header against `chain`. Short-circuits under
	/// `FullFake` and for already-known blocks (§4.7).
	pub fn verify_header<R: ChainReader>(&self, chain: &R, header: &Header, seal: bool) -> Result<(), ConsensusError> {
		if self.mode == PowMode::FullFake {
			return Ok(());
		}
		if chain.get_header(header.hash(), header.number).is_some() {
			return Ok(());
		}
		let parent = chain
			.get_header(header.parent_hash, header.number.saturating_sub(1))
			.ok_or(ConsensusError::UnknownAncestor)?;

		let check_seal: Option<Box<dyn FnOnce() -> Result<(), ConsensusError> + '_>> =
			if seal { Some(Box::new(|| self.verify_seal(chain, header))) } else { None };
		verify_header(&self.params, chain, header, &parent, false, now_unix(), check_seal)
	}

	/// Parallel batch verification (§4.3). Returns immediately; see
	/// [`batch::verify_headers`] for the concurrency contract.
	pub fn verify_headers<R>(&self, chain: Arc<R>, headers: Vec<Header>, seals: Vec<bool>) -> (AbortHandle, Receiver<Result<(), ConsensusError>>)
	where
		R: ChainReader + Send + Sync + 'static,
	{
		let seal_check: SealCheck = self.seal_check_closure();
		batch::verify_headers(Arc::clone(&self.params), chain, self.mode, headers, seals, seal_check)
	}

	/// Validate `block`'s uncles against the ancestor window (§4.5).
	pub fn verify_uncles<R: ChainReader>(&self, chain: &R, block: &Block<R::Tx, R::Receipt>) -> Result<(), ConsensusError> {
		verify_uncles(&self.params, chain, block, self.mode, now_unix(), |uncle| self.verify_seal(chain, uncle))
	}

	/// Verify the PoW seal on `header`, dispatching on engine mode
	/// (§4.4). `Shared` mode delegates to the shared engine instead of
	/// touching the local cache/PoW primitive.
	pub fn verify_seal<R: ChainReader>(&self, _chain: &R, header: &Header) -> Result<(), ConsensusError> {
		if self.mode == PowMode::Shared {
			let shared = self.shared.as_ref().expect("Shared mode requires a shared engine");
			return shared.verify_seal(_chain, header);
		}
		let dataset_size = self.cache_provider.dataset_size(header.number);
		seal::verify_seal(&*self.pow, &*self.cache_provider, self.mode, &self.fake, header, dataset_size)
	}

	fn seal_check_closure(&self) -> SealCheck {
		let pow = Arc::clone(&self.pow);
		let cache_provider = Arc::clone(&self.cache_provider);
		let mode = self.mode;
		let fake = self.fake;
		let shared = self.shared.clone();
		Arc::new(move |header: &Header| {
			if mode == PowMode::Shared {
				let shared = shared.as_ref().expect("Shared mode requires a shared engine");
				return shared.verify_seal_standalone(header);
			}
			let dataset_size = cache_provider.dataset_size(header.number);
			seal::verify_seal(&*pow, &*cache_provider, mode, &fake, header, dataset_size)
		})
	}

	/// Seal verification without a chain reader in scope, for the batch
	/// pipeline's boxed closure (which only ever needs the header).
	fn verify_seal_standalone(&self, header: &Header) -> Result<(), ConsensusError> {
		if self.mode == PowMode::Shared {
			let shared = self.shared.as_ref().expect("Shared mode requires a shared engine");
			return shared.verify_seal_standalone(header);
		}
		let dataset_size = self.cache_provider.dataset_size(header.number);
		seal::verify_seal(&*self.pow, &*self.cache_provider, self.mode, &self.fake, header, dataset_size)
	}
}

impl<Pow, CacheProv> Clone for EgemEngine<Pow, CacheProv>
where
	Pow: HashimotoLight<Cache = CacheProv::Cache>,
	CacheProv: CacheProvider,
{
	fn clone(&self) -> Self {
		EgemEngine {
			params: Arc::clone(&self.params),
			mode: self.mode,
			fake: self.fake,
			pow: Arc::clone(&self.pow),
			cache_provider: Arc::clone(&self.cache_provider),
			shared: self.shared.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::{test_chain_reader, test_header, FakeCacheProvider, FakePow, TestChainReader};

	fn engine(mode: PowMode) -> EgemEngine<FakePow, FakeCacheProvider> {
		EgemEngine::new(Arc::new(EgemParams::for_tests()), mode, FakeParams::default(), FakePow::always_valid(), FakeCacheProvider)
	}

	#[test]
	fn author_returns_coinbase() {
		let eng = engine(PowMode::FullFake);
		let header = test_header(|h| h.coinbase = Address::repeat_byte(0x11));
		assert_eq!(eng.author(&header), Address::repeat_byte(0x11));
	}

	#[test]
	fn full_fake_verify_header_always_succeeds() {
		let eng = engine(PowMode::FullFake);
		let chain = test_chain_reader();
		let header = test_header(|h| h.extra = vec![0u8; 1000]);
		assert!(eng.verify_header(&chain, &header, true).is_ok());
	}

	#[test]
	fn verify_header_short_circuits_on_known_block() {
		let eng = engine(PowMode::Test);
		let header = test_header(|h| h.number = 5);
		let mut chain = TestChainReader::default();
		chain.headers.insert((header.hash(), header.number), header.clone());
		assert!(eng.verify_header(&chain, &header, true).is_ok());
	}

	#[test]
	fn verify_header_reports_unknown_ancestor() {
		let eng = engine(PowMode::Test);
		let chain = test_chain_reader();
		let header = test_header(|h| h.number = 5);
		assert_eq!(eng.verify_header(&chain, &header, true), Err(ConsensusError::UnknownAncestor));
	}

	#[test]
	fn prepare_sets_difficulty_from_parent() {
		let eng = engine(PowMode::Test);
		let parent = test_header(|h| {
			h.number = 1;
			h.time = 1000;
			h.difficulty = eng_params().minimum_difficulty;
		});
		let mut chain = TestChainReader::default();
		chain.headers.insert((parent.hash(), parent.number), parent.clone());
		let mut header = test_header(|h| {
			h.number = 2;
			h.time = 1010;
			h.parent_hash = parent.hash();
		});
		eng.prepare(&chain, &mut header).unwrap();
		let expected = crate::difficulty::calc_difficulty(&eng_params(), &crate::test_util::TestChainConfig, &parent, 1010);
		assert_eq!(header.difficulty, expected);
	}

	#[test]
	fn finalize_credits_miner_and_sets_root() {
		let eng = engine(PowMode::Test);
		let chain = test_chain_reader();
		let mut state = crate::test_util::FakeState::default();
		let header = test_header(|h| h.number = 100);
		let block = eng.finalize(&chain, header.clone(), &mut state, Vec::<()>::new(), Vec::new(), Vec::<()>::new());
		assert_eq!(state.balance_of(header.coinbase), U256_8_EGEM());
		assert_eq!(block.header.root, ethereum_types::H256::zero());
	}

	fn eng_params() -> EgemParams {
		EgemParams::for_tests()
	}

	#[allow(non_snake_case)]
	fn U256_8_EGEM() -> ethereum_types::U256 {
		ethereum_types::U256::from(8u64) * ethereum_types::U256::exp10(18)
	}
}
