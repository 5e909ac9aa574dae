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

//! Reward accumulator (§4.6).
//!
//! The per-uncle bonus computation below reproduces a quirk in the
//! original source verbatim (§9 Q1): the "distance-weighted" bonus is
//! computed and then unconditionally overwritten with `miner_base / 32`
//! before being added to the miner's reward. Uncle coinbases are never
//! credited directly. This is *not* stock Ethereum behavior, and it is
//! preserved on purpose rather than "fixed" — see DESIGN.md.

use crate::chain::State;
use crate::header::Header;
use crate::params::EgemParams;
use ethereum_types::{Address, U256};

/// Credit `header.coinbase` (and, for eras `>= 0`, the four developer
/// funds) with this block's reward, given its included `uncles`.
///
/// Cannot fail (§7 policy): balance addition is infallible.
pub fn accumulate_rewards<S: State>(params: &EgemParams, state: &mut S, header: &Header, uncles: &[Header]) {
	let era = params.eras.iter().find(|era| header.number > era.above).copied().unwrap_or_else(|| params.default_era());

	let mut reward = era.miner_reward;
	for _uncle in uncles {
		// Dead code preserved verbatim: the distance-weighted term is
		// computed and discarded; only `reward / 32` survives, and it is
		// taken from the running accumulator, not the era's static base
		// reward — so a second uncle's bonus compounds on the first
		// uncle's already-added bonus rather than being a flat per-uncle
		// fraction of `miner_reward`.
		let _distance_weighted = U256::zero();
		let bonus = reward / U256::from(32);
		reward += bonus;
	}

	if reward.is_zero() {
		warn!(target: "ethash", "accumulate_rewards: block #{} would credit a zero reward", header.number);
	}

	state.add_balance(header.coinbase, reward);

	if let Some(dev_reward) = era.dev_reward_per_fund {
		for fund in params.dev_funds {
			state.add_balance(fund, dev_reward);
		}
	}

	trace!(
		target: "ethash",
		"accumulate_rewards: block #{} miner={} reward={} uncles={}",
		header.number, header.coinbase, reward, uncles.len()
	);
}

/// All four fixed developer-fund addresses, for callers that want to
/// assert on "unchanged" balances without hardcoding the list again.
pub fn dev_fund_addresses(params: &EgemParams) -> [Address; 4] {
	params.dev_funds
}
