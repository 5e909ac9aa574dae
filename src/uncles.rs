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

//! Uncle verifier (§4.5).

use crate::chain::ChainReader;
use crate::error::{ConsensusError, OutOfBounds};
use crate::header::{Block, Header};
use crate::params::EgemParams;
use crate::seal::PowMode;
use crate::verify::verify_header;
use ethereum_types::H256;
use std::collections::{HashMap, HashSet};

/// Number of ancestors walked back from the block's parent when gathering
/// the "recently used" uncle set (§4.5).
const ANCESTOR_DEPTH: usize = 7;

/// Validate `block.uncles` against the ancestor window.
///
/// `is_seal_valid` is a closure rather than a direct dependency on the PoW
/// primitive: the uncle verifier needs §4.2's rules applied with
/// `check_seal=true`, but threading the generic `HashimotoLight`/`Cache`
/// parameters through here would force every caller (including
/// `FullFake`-mode callers that never touch a cache) to monomorphize over
/// them. The façade is what actually owns those generics (§4.7).
pub fn verify_uncles<R, F>(
	params: &EgemParams,
	chain: &R,
	block: &Block<R::Tx, R::Receipt>,
	mode: PowMode,
	now: u64,
	mut verify_uncle_seal: F,
) -> Result<(), ConsensusError>
where
	R: ChainReader,
	F: FnMut(&Header) -> Result<(), ConsensusError>,
{
	if mode == PowMode::FullFake {
		return Ok(());
	}

	if block.uncles.len() > params.max_uncles {
		return Err(ConsensusError::TooManyUncles(OutOfBounds {
			min: None,
			max: Some(params.max_uncles),
			found: block.uncles.len(),
		}));
	}

	let mut ancestors: HashMap<H256, Header> = HashMap::new();
	let mut seen_uncle_hashes: HashSet<H256> = HashSet::new();

	let mut number = block.header.number.saturating_sub(1);
	let mut parent_hash = block.header.parent_hash;
	for _ in 0..ANCESTOR_DEPTH {
		let ancestor = match chain.get_block(parent_hash, number) {
			Some(a) => a,
			None => break,
		};
		for uncle in &ancestor.uncles {
			seen_uncle_hashes.insert(uncle.hash());
		}
		let ancestor_hash = ancestor.header.hash();
		parent_hash = ancestor.header.parent_hash;
		ancestors.insert(ancestor_hash, ancestor.header);
		if number == 0 {
			break;
		}
		number -= 1;
	}

	let block_hash = block.header.hash();
	ancestors.insert(block_hash, block.header.clone());
	seen_uncle_hashes.insert(block_hash);

	for uncle in &block.uncles {
		let hash = uncle.hash();

		if seen_uncle_hashes.contains(&hash) {
			return Err(ConsensusError::DuplicateUncle(hash));
		}
		seen_uncle_hashes.insert(hash);

		if ancestors.contains_key(&hash) {
			return Err(ConsensusError::UncleIsAncestor(hash));
		}

		let uncle_parent = match ancestors.get(&uncle.parent_hash) {
			Some(p) if uncle.parent_hash != block.header.parent_hash => p,
			_ => return Err(ConsensusError::DanglingUncle(hash)),
		};

		let seal_check: Box<dyn FnOnce() -> Result<(), ConsensusError> + '_> = Box::new(|| verify_uncle_seal(uncle));
		verify_header(params, chain, uncle, uncle_parent, true, now, Some(seal_check))?;
	}

	Ok(())
}
