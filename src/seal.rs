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

//! Seal verifier (§4.4).

use crate::chain::{Cache, CacheProvider, HashimotoLight};
use crate::error::{ConsensusError, Mismatch};
use ethereum_types::U256;
use std::thread;
use std::time::Duration;

/// Operating mode of an engine instance (§3 "Engine instance").
///
/// `Fake`/`FullFake`/`Test` exist so embedders can exercise the rest of
/// the pipeline (or their own test suites) without paying for real
/// Ethash verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowMode {
	/// Full PoW verification against the real Ethash cache/dataset.
	Normal,
	/// Sleeps `fake_delay` and fails only on `fake_fail`, never touching
	/// the cache.
	Fake,
	/// Accepts every header/uncle/seal unconditionally; `VerifyHeaders`
	/// short-circuits entirely (§4.3).
	FullFake,
	/// Real verification, but with a small fixed dataset size so unit
	/// tests don't need a production-sized cache.
	Test,
	/// Delegates to a canonical shared engine instance instead of
	/// verifying locally. Intercepted by [`crate::engine::EgemEngine`]
	/// before [`verify_seal`] is ever called — present here only so the
	/// mode enum matches §3's full `{Normal, Fake, FullFake, Test,
	/// Shared}` set and the match below stays exhaustive.
	Shared,
}

/// Parameters specific to [`PowMode::Fake`] / [`PowMode::FullFake`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeParams {
	pub fake_delay: Duration,
	pub fake_fail: Option<u64>,
}

/// Fixed dataset size used under [`PowMode::Test`] in place of the real,
/// epoch-derived size (§4.4 step 2).
pub const TEST_DATASET_SIZE: u64 = 32 * 1024;

/// Verify the PoW seal on `header`.
///
/// `shared` lets a `Shared`-mode engine (§3) delegate verification to a
/// canonical engine instance instead of recomputing; `dataset_size` is
/// supplied by the caller, which already knows whether to use the real
/// epoch size or [`TEST_DATASET_SIZE`].
pub fn verify_seal<P, C>(
	pow: &P,
	cache_provider: &C,
	mode: PowMode,
	fake: &FakeParams,
	header: &crate::header::Header,
	dataset_size: u64,
) -> Result<(), ConsensusError>
where
	P: HashimotoLight<Cache = C::Cache>,
	C: CacheProvider,
{
	match mode {
		PowMode::Fake | PowMode::FullFake => {
			if !fake.fake_delay.is_zero() {
				thread::sleep(fake.fake_delay);
			}
			if fake.fake_fail == Some(header.number) {
				return Err(ConsensusError::InvalidPoW);
			}
			Ok(())
		}
		PowMode::Normal | PowMode::Test => {
			if header.difficulty.is_zero() {
				return Err(ConsensusError::InvalidDifficultySign);
			}

			let cache = cache_provider.cache(header.number);
			let size = if mode == PowMode::Test { TEST_DATASET_SIZE } else { dataset_size };

			let (digest, result) = {
				// `cache` must outlive the call: keep it bound in this
				// scope for the full duration of `hashimoto_light`, then
				// drop it only after the result has been read out.
				let (digest, result) = pow.hashimoto_light(size, &cache, header.hash_no_nonce(), nonce_as_u64(header));
				(digest, result)
			};
			drop(cache);

			if digest != header.mix_digest {
				return Err(ConsensusError::InvalidMixDigest(Mismatch { expected: header.mix_digest, found: digest }));
			}

			let target = U256::max_value() / header.difficulty;
			if U256::from(result.as_bytes()) > target {
				return Err(ConsensusError::InvalidPoW);
			}
			debug!(target: "ethash", "verify_seal: header #{} passed", header.number);
			Ok(())
		}
		PowMode::Shared => unreachable!(
			"PowMode::Shared must be intercepted by EgemEngine before calling verify_seal directly"
		),
	}
}

fn nonce_as_u64(header: &crate::header::Header) -> u64 {
	u64::from_be_bytes(header.nonce.to_fixed_bytes())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::{init_test_logging, test_header, FakeCache, FakeCacheProvider, FakePow};

	#[test]
	fn fake_mode_never_touches_the_cache() {
		init_test_logging();
		let header = test_header(|h| h.number = 42);
		let pow = FakePow::always_valid();
		let provider = FakeCacheProvider;
		let fake = FakeParams { fake_delay: Duration::from_millis(0), fake_fail: None };
		assert!(verify_seal(&pow, &provider, PowMode::FullFake, &fake, &header, 0).is_ok());
	}

	#[test]
	fn fake_mode_fails_the_configured_block() {
		let header = test_header(|h| h.number = 7);
		let pow = FakePow::always_valid();
		let provider = FakeCacheProvider;
		let fake = FakeParams { fake_delay: Duration::from_millis(0), fake_fail: Some(7) };
		assert_eq!(verify_seal(&pow, &provider, PowMode::Fake, &fake, &header, 0), Err(ConsensusError::InvalidPoW));
	}

	#[test]
	fn rejects_zero_difficulty() {
		let header = test_header(|h| h.difficulty = U256::zero());
		let pow = FakePow::always_valid();
		let provider = FakeCacheProvider;
		let fake = FakeParams::default();
		assert_eq!(
			verify_seal(&pow, &provider, PowMode::Test, &fake, &header, 0),
			Err(ConsensusError::InvalidDifficultySign)
		);
	}

	#[test]
	fn mismatched_mix_digest_is_rejected() {
		let header = test_header(|h| h.difficulty = U256::from(1000u64));
		let pow = FakePow::mismatched_digest();
		let provider = FakeCacheProvider;
		let fake = FakeParams::default();
		assert!(matches!(
			verify_seal(&pow, &provider, PowMode::Test, &fake, &header, 0),
			Err(ConsensusError::InvalidMixDigest(_))
		));
	}

	#[test]
	fn result_above_target_is_rejected_as_invalid_pow() {
		let header = test_header(|h| h.difficulty = U256::from(1000u64));
		let pow = FakePow::result_above_target();
		let provider = FakeCacheProvider;
		let fake = FakeParams::default();
		assert_eq!(verify_seal(&pow, &provider, PowMode::Test, &fake, &header, 0), Err(ConsensusError::InvalidPoW));
	}
}
