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

//! Single-header verifier (§4.2).

use crate::chain::ChainReader;
use crate::difficulty::calc_difficulty;
use crate::error::{ConsensusError, Mismatch, OutOfBounds};
use crate::header::Header;
use crate::params::EgemParams;

/// Current wall-clock time, seconds since the Unix epoch.
///
/// The only place in the core that reads real time (§5 "Timeouts: none").
/// Exposed as a free function so tests can fix "now" without mocking a
/// whole clock trait.
pub fn now_unix() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Apply the header-independent rules to `header`: extra-data length and
/// the future-block/large-timestamp checks. Runs first, before any rule
/// that needs `parent` in scope.
pub fn verify_header_basic(params: &EgemParams, header: &Header, is_uncle: bool, now: u64) -> Result<(), ConsensusError> {
	if header.extra.len() > params.max_extra_data_size {
		return Err(ConsensusError::ExtraTooLong(OutOfBounds {
			min: None,
			max: Some(params.max_extra_data_size),
			found: header.extra.len(),
		}));
	}

	if is_uncle {
		// Header::time is a plain u64 here, so it can never exceed the
		// Keccak/U256 range the Go original guards against; the check is
		// kept as a named rule so the error taxonomy in §7 stays
		// complete and future widenings of `time` don't silently drop it.
		if header.time > u64::MAX {
			return Err(ConsensusError::LargeBlockTime(OutOfBounds { min: None, max: Some(u64::MAX), found: header.time }));
		}
	} else if header.time > now + params.allowed_future_block_time_secs {
		return Err(ConsensusError::FutureBlock(OutOfBounds {
			min: None,
			max: Some(now + params.allowed_future_block_time_secs),
			found: header.time,
		}));
	}

	Ok(())
}

/// `verify_header(chain, header, parent, is_uncle, check_seal)` from §4.2.
///
/// `check_seal` is a lazily-invoked closure rather than an
/// already-computed result: it only runs once every cheaper structural
/// and arithmetic rule below has passed, so callers never pay for PoW
/// verification on a header that was going to fail anyway. Wiring it up
/// to [`crate::seal::verify_seal`] is the caller's job; this function
/// stays independent of the PoW primitive's generic parameters. Also
/// calls [`verify_header_basic`] first for the gas/number-independent
/// checks.
pub fn verify_header<R: ChainReader>(
	params: &EgemParams,
	chain: &R,
	header: &Header,
	parent: &Header,
	is_uncle: bool,
	now: u64,
	check_seal: Option<Box<dyn FnOnce() -> Result<(), ConsensusError> + '_>>,
) -> Result<(), ConsensusError> {
	verify_header_basic(params, header, is_uncle, now)?;

	if header.time <= parent.time {
		return Err(ConsensusError::ZeroBlockTime(OutOfBounds { min: Some(parent.time + 1), max: None, found: header.time }));
	}

	let expected_difficulty = calc_difficulty(params, chain.config(), parent, header.time);
	if header.difficulty != expected_difficulty {
		return Err(ConsensusError::InvalidDifficulty(Mismatch { expected: expected_difficulty, found: header.difficulty }));
	}

	const GAS_LIMIT_MAX: u64 = 0x7fff_ffff_ffff_ffff;
	if header.gas_limit > GAS_LIMIT_MAX {
		return Err(ConsensusError::GasLimitTooLarge(OutOfBounds { min: None, max: Some(GAS_LIMIT_MAX), found: header.gas_limit }));
	}
	if header.gas_used > header.gas_limit {
		return Err(ConsensusError::GasUsedExceeds(OutOfBounds { min: None, max: Some(header.gas_limit), found: header.gas_used }));
	}

	let diff = (parent.gas_limit as i128 - header.gas_limit as i128).unsigned_abs() as u64;
	let limit = parent.gas_limit / params.gas_limit_bound_divisor;
	if diff >= limit || header.gas_limit < params.min_gas_limit {
		return Err(ConsensusError::InvalidGasLimit(OutOfBounds {
			min: Some(parent.gas_limit.saturating_sub(limit)),
			max: Some(parent.gas_limit + limit),
			found: header.gas_limit,
		}));
	}

	if header.number != parent.number + 1 {
		return Err(ConsensusError::InvalidNumber(Mismatch { expected: parent.number + 1, found: header.number }));
	}

	if let Some(check) = check_seal {
		check()?;
	}

	chain.verify_dao_header_extra_data(header)?;
	chain.verify_fork_hashes(header, is_uncle)?;

	debug!(target: "ethash", "verify_header: header #{} parent #{} accepted", header.number, parent.number);
	Ok(())
}
