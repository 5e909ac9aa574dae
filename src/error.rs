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

//! Consensus error taxonomy.
//!
//! One variant per rejection reason in the rule set. Structural and
//! arithmetic violations carry the bound/mismatch that triggered them so a
//! caller can log or report something more useful than a bare string,
//! as structured `OutOfBounds`/`Mismatch` wrapper types.

use ethereum_types::{H256, U256};
use std::fmt;

/// A value that was found outside an allowed `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds<T> {
	pub min: Option<T>,
	pub max: Option<T>,
	pub found: T,
}

impl<T: fmt::Display> fmt::Display for OutOfBounds<T> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match (&self.min, &self.max) {
			(Some(min), Some(max)) => write!(f, "{} not in range [{}, {}]", self.found, min, max),
			(Some(min), None) => write!(f, "{} below minimum {}", self.found, min),
			(None, Some(max)) => write!(f, "{} above maximum {}", self.found, max),
			(None, None) => write!(f, "{} out of bounds", self.found),
		}
	}
}

/// An expected value compared against what was actually found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch<T> {
	pub expected: T,
	pub found: T,
}

impl<T: fmt::Display> fmt::Display for Mismatch<T> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "expected {}, found {}", self.expected, self.found)
	}
}

/// Every way header/uncle/seal verification can reject input.
///
/// No recovery happens within the core (§7): any variant terminates
/// verification of the header it was raised for. The caller decides what to
/// do with the error; the core never retries or falls back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
	#[error("extra-data too long: {0}")]
	ExtraTooLong(OutOfBounds<usize>),

	#[error("block has a timestamp too far in the future: {0}")]
	FutureBlock(OutOfBounds<u64>),

	#[error("uncle timestamp out of representable range: {0}")]
	LargeBlockTime(OutOfBounds<u64>),

	#[error("timestamp does not advance on parent's: {0}")]
	ZeroBlockTime(OutOfBounds<u64>),

	#[error("non-positive difficulty")]
	InvalidDifficultySign,

	#[error("invalid difficulty: {0}")]
	InvalidDifficulty(Mismatch<U256>),

	#[error("invalid gas limit: {0}")]
	GasLimitTooLarge(OutOfBounds<u64>),

	#[error("gas used exceeds gas limit: {0}")]
	GasUsedExceeds(OutOfBounds<u64>),

	#[error("invalid gas limit relative to parent: {0}")]
	InvalidGasLimit(OutOfBounds<u64>),

	#[error("invalid block number: {0}")]
	InvalidNumber(Mismatch<u64>),

	#[error("parent header or block not found in chain")]
	UnknownAncestor,

	#[error("invalid mix digest: {0}")]
	InvalidMixDigest(Mismatch<H256>),

	#[error("invalid proof-of-work")]
	InvalidPoW,

	#[error("too many uncles: {0}")]
	TooManyUncles(OutOfBounds<usize>),

	#[error("duplicate uncle {0:?}")]
	DuplicateUncle(H256),

	#[error("uncle {0:?} is an ancestor")]
	UncleIsAncestor(H256),

	#[error("uncle {0:?} has no known, non-parent ancestry")]
	DanglingUncle(H256),

	#[error("DAO hard-fork extra-data mismatch")]
	InvalidDaoExtraData,

	#[error("fork hash mismatch at block {0}")]
	InvalidForkHash(u64),
}

#[cfg(test)]
mod tests {
	use super::*;

	/// `InvalidGasLimit`'s `OutOfBounds` payload round-trips the
	/// `min`/`max`/`found` values a caller supplied, rather than losing
	/// them to the `Display` string.
	#[test]
	fn invalid_gas_limit_payload_round_trips() {
		let err = ConsensusError::InvalidGasLimit(OutOfBounds { min: Some(4_996u64), max: Some(5_004), found: 7_000 });
		match err {
			ConsensusError::InvalidGasLimit(bounds) => {
				assert_eq!(bounds.min, Some(4_996));
				assert_eq!(bounds.max, Some(5_004));
				assert_eq!(bounds.found, 7_000);
			}
			_ => panic!("expected InvalidGasLimit"),
		}
	}
}
