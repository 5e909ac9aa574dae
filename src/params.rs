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

//! Configuration layer (§4.8).
//!
//! Chain-wide constants are fields of an immutable, `Clone`-able struct
//! built once per chain instance rather than free-floating `const`s
//! scattered through the verifier — this is what lets a test fixture swap
//! in a shrunk `minimum_difficulty` or a relocated era table without
//! recompiling, the way a parameter record is assembled once by the chain
//! layer and handed to the engine.

use ethereum_types::{Address, U256};

/// One entry of the era-based mining-reward schedule (§4.6).
///
/// Eras are matched by strict `>` against `above`, in descending order;
/// the first match wins. `dev_reward_per_fund: None` marks the pre-era-0
/// default branch, where only the miner is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Era {
	pub above: u64,
	pub miner_reward: U256,
	pub dev_reward_per_fund: Option<U256>,
}

/// The frozen, per-chain record of every constant the consensus rules
/// consult. Construct one with [`EgemParams::mainnet`] and share it (it is
/// cheap to `Clone`, and intended to be wrapped in an `Arc` by the
/// embedder for the batch verifier's worker threads).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EgemParams {
	/// Divisor bounding how much `gas_limit` may move from its parent's
	/// per block (§3 invariant, Q in S3).
	pub gas_limit_bound_divisor: u64,
	/// Floor below which `gas_limit` may never fall.
	pub min_gas_limit: u64,
	/// Floor below which `difficulty` may never fall.
	pub minimum_difficulty: U256,
	/// `Δt` threshold separating the "increase" and "decrease" branches
	/// of [`crate::difficulty::calc_difficulty`].
	pub duration_limit: u64,
	/// Maximum length of `Header::extra`.
	pub max_extra_data_size: usize,
	/// Maximum uncles per block.
	pub max_uncles: usize,
	/// How far into the future (in seconds) a non-uncle header's
	/// timestamp may sit relative to wall clock before it is rejected.
	pub allowed_future_block_time_secs: u64,
	/// Era reward table, sorted descending by `above`.
	pub eras: Vec<Era>,
	/// The four fixed developer-fund addresses credited alongside the
	/// miner in every era except the pre-era-0 default.
	pub dev_funds: [Address; 4],
}

fn egem(whole_e18: u64) -> U256 {
	U256::from(whole_e18) * U256::exp10(18)
}

/// Wei amount given directly, for the developer-fund rewards: these do
/// not reduce to clean EGEM fractions (see the module-level note on the
/// era table below) so they are spelled out as literal wei the way the
/// original source does.
fn wei(amount: u64) -> U256 {
	U256::from(amount)
}

impl EgemParams {
	/// The production EGEM mainnet parameter set (§4.6, §6).
	///
	/// The developer-fund amounts below are the *executed* per-era
	/// values from the original source, not the values its own code
	/// comments claim (the comments there are off by a factor of four
	/// from the `big.Int` literals actually constructed — e.g. the
	/// block-5000 era's comment reads "1 EGEM" but the literal is
	/// `250000000000000000` wei, i.e. 0.25 EGEM). The property tests in
	/// §8 (P8: 0.25 EGEM/fund at the era-0 boundary) are written against
	/// the executed values, so that is what this table encodes; see
	/// DESIGN.md for the full reconciliation.
	pub fn mainnet() -> Self {
		EgemParams {
			gas_limit_bound_divisor: 1024,
			min_gas_limit: 5_000,
			minimum_difficulty: U256::from(131_072),
			duration_limit: 13,
			max_extra_data_size: crate::header::MAX_EXTRA_DATA_SIZE,
			max_uncles: crate::header::MAX_UNCLES,
			allowed_future_block_time_secs: 15,
			eras: vec![
				Era { above: 15_000_000, miner_reward: egem(1) / U256::from(8), dev_reward_per_fund: Some(wei(6_250_000_000_000_000)) },
				Era { above: 12_500_000, miner_reward: egem(1) / U256::from(4), dev_reward_per_fund: Some(wei(12_500_000_000_000_000)) },
				Era { above: 10_000_000, miner_reward: egem(1) / U256::from(2), dev_reward_per_fund: Some(wei(25_000_000_000_000_000)) },
				Era { above: 7_500_000, miner_reward: egem(1), dev_reward_per_fund: Some(wei(62_500_000_000_000_000)) },
				Era { above: 5_000_000, miner_reward: egem(2), dev_reward_per_fund: Some(wei(125_000_000_000_000_000)) },
				Era { above: 2_500_000, miner_reward: egem(4), dev_reward_per_fund: Some(wei(187_500_000_000_000_000)) },
				Era { above: 5_000, miner_reward: egem(8), dev_reward_per_fund: Some(wei(250_000_000_000_000_000)) },
			],
			dev_funds: [
				"3fa6576610cac6c68e88ee68de07b104c9524fda".parse().expect("valid fixed address"),
				"fc0f0a5F06cB00c9EB435127142ac79ac6F48B94".parse().expect("valid fixed address"),
				"0666bf13ab1902de7dee4f8193c819118d7e21a6".parse().expect("valid fixed address"),
				"cEf0890408b4FC0DC025c8F581c77383529D38B6".parse().expect("valid fixed address"),
			],
		}
	}

	/// Default era/reward applied before any threshold in `self.eras` is
	/// matched (i.e. `n <= 5000`): the flat 8 EGEM miner reward with no
	/// developer fee.
	pub fn default_era(&self) -> Era {
		Era { above: 0, miner_reward: egem(8), dev_reward_per_fund: None }
	}

	/// A cheap parameter set for unit tests and `Test` engine mode:
	/// shrunk difficulty floor and duration limit so difficulty/seal
	/// fixtures stay small, overriding individual fields off a
	/// `..mainnet()` base rather than rebuilding the whole record.
	#[cfg(any(test, feature = "test-helpers"))]
	pub fn for_tests() -> Self {
		EgemParams {
			minimum_difficulty: U256::from(1),
			duration_limit: 13,
			..Self::mainnet()
		}
	}
}

/// Fork-activation predicates the difficulty calculator and fork guards
/// consult, keyed purely on block number (§3).
///
/// All three predicates currently gate into the same EGEM algorithm
/// (§4.1) — they are threaded through so a future fork can branch without
/// changing the call sites, even though every arm currently dispatches
/// to the same EGEM difficulty formula.
pub trait ChainConfig {
	fn is_homestead(&self, number: u64) -> bool;
	fn is_byzantium(&self, number: u64) -> bool;
	fn is_eip158(&self, number: u64) -> bool;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::difficulty::calc_difficulty;
	use crate::test_util::{test_chain_config, test_header};

	/// A verifier reading `mainnet()`'s floor and one reading a shrunk
	/// test config reach different, each internally consistent, verdicts
	/// on the same near-floor parent — proving the difficulty calculator
	/// consults the injected `EgemParams`, not a hidden global constant.
	#[test]
	fn difficulty_floor_tracks_the_injected_config() {
		let parent = test_header(|h| {
			h.difficulty = U256::from(131_100u64);
			h.time = 1000;
		});

		let mainnet = EgemParams::mainnet();
		let got_mainnet = calc_difficulty(&mainnet, &test_chain_config(), &parent, 2000);
		assert_eq!(got_mainnet, mainnet.minimum_difficulty);

		let shrunk = EgemParams::for_tests();
		let got_shrunk = calc_difficulty(&shrunk, &test_chain_config(), &parent, 2000);
		assert_eq!(got_shrunk, shrunk.minimum_difficulty);

		assert_ne!(got_mainnet, got_shrunk);
	}
}
