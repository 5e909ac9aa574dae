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

//! Difficulty calculator (§4.1).

use crate::header::Header;
use crate::params::{ChainConfig, EgemParams};
use ethereum_types::U256;

/// Pure function of parent header + proposed child timestamp.
///
/// `config`'s fork predicates are threaded through for future fork
/// branching (see [`ChainConfig`]'s doc comment); every branch currently
/// dispatches to the same EGEM algorithm.
pub fn calc_difficulty<C: ChainConfig>(params: &EgemParams, config: &C, parent: &Header, child_time: u64) -> U256 {
	let next_number = parent.number + 1;
	if config.is_byzantium(next_number) || config.is_homestead(next_number) {
		calc_difficulty_egem(params, parent, child_time)
	} else {
		calc_difficulty_egem(params, parent, child_time)
	}
}

fn calc_difficulty_egem(params: &EgemParams, parent: &Header, child_time: u64) -> U256 {
	let adjust_up = parent.difficulty / U256::from(7);
	let adjust_down = parent.difficulty / U256::from(3);

	let delta = child_time.saturating_sub(parent.time);
	let mut diff = if delta < params.duration_limit {
		parent.difficulty + U256::from(7) + adjust_up
	} else {
		parent.difficulty.saturating_sub(U256::from(3)).saturating_sub(adjust_down)
	};

	if diff < params.minimum_difficulty {
		diff = params.minimum_difficulty;
	}

	trace!(target: "ethash", "calc_difficulty: parent={} delta={} -> {}", parent.difficulty, delta, diff);
	diff
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::{init_test_logging, test_chain_config, test_header};

	#[test]
	fn steps_up_below_duration_limit() {
		init_test_logging();
		let params = EgemParams { duration_limit: 13, ..EgemParams::mainnet() };
		let parent = test_header(|h| {
			h.difficulty = U256::from(70_000u64);
			h.time = 1000;
		});
		let got = calc_difficulty(&params, &test_chain_config(), &parent, 1005);
		assert_eq!(got, U256::from(80_007u64));
	}

	#[test]
	fn steps_down_at_or_above_duration_limit() {
		let params = EgemParams { duration_limit: 13, ..EgemParams::mainnet() };
		let parent = test_header(|h| {
			h.difficulty = U256::from(70_000u64);
			h.time = 1000;
		});
		let got = calc_difficulty(&params, &test_chain_config(), &parent, 1020);
		assert_eq!(got, U256::from(46_664u64));
	}

	#[test]
	fn never_drops_below_floor() {
		let params = EgemParams { minimum_difficulty: U256::from(131_072u64), duration_limit: 13, ..EgemParams::mainnet() };
		let parent = test_header(|h| {
			h.difficulty = U256::from(131_100u64);
			h.time = 1000;
		});
		let got = calc_difficulty(&params, &test_chain_config(), &parent, 2000);
		assert_eq!(got, params.minimum_difficulty);
	}

	#[test]
	fn monotone_branching_table_driven() {
		let params = EgemParams { duration_limit: 13, minimum_difficulty: U256::from(1u64), ..EgemParams::mainnet() };
		for &(parent_diff, delta) in &[(200_000u64, 1u64), (200_000, 12), (200_000, 13), (200_000, 100), (1_000_000, 0)] {
			let parent = test_header(|h| {
				h.difficulty = U256::from(parent_diff);
				h.time = 1000;
			});
			let got = calc_difficulty(&params, &test_chain_config(), &parent, 1000 + delta);
			if delta < params.duration_limit {
				assert!(got > parent.difficulty, "expected increase for delta={}", delta);
			} else {
				assert!(got <= parent.difficulty, "expected non-increase for delta={}", delta);
			}
			assert!(got >= params.minimum_difficulty);
		}
	}
}
