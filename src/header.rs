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

//! Header and Block data model (§3).
//!
//! `Header` deliberately carries only the fields the consensus rules in
//! this crate read or write. Fields that are opaque to the core (state
//! root, transaction/receipts roots, logs bloom) are still present — the
//! façade sets `root` during `Finalize` — but nothing here interprets them.

use ethereum_types::{Address, Bloom, H256, H64, U256};
use rlp::{Encodable, RlpStream};

/// Maximum length, in bytes, of the header's free-form `extra` field.
/// The single source of truth `EgemParams::mainnet()` builds its
/// `max_extra_data_size` field from.
pub const MAX_EXTRA_DATA_SIZE: usize = 32;

/// Maximum number of uncles a single block may include. The single
/// source of truth `EgemParams::mainnet()` builds its `max_uncles`
/// field from.
pub const MAX_UNCLES: usize = 2;

/// A block header as seen by the consensus engine.
///
/// Sealed fields (`nonce`, `mix_digest`) are excluded from
/// [`Header::hash_no_nonce`] so that the pre-seal hash can be fed to the
/// PoW primitive and compared against the post-seal digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	pub parent_hash: H256,
	pub uncle_hash: H256,
	pub coinbase: Address,
	pub root: H256,
	pub tx_hash: H256,
	pub receipts_hash: H256,
	pub bloom: Bloom,
	pub difficulty: U256,
	pub number: u64,
	pub gas_limit: u64,
	pub gas_used: u64,
	pub time: u64,
	pub extra: Vec<u8>,
	pub mix_digest: H256,
	pub nonce: H64,
}

impl Header {
	/// RLP-encode the header with the seal fields (`mix_digest`, `nonce`)
	/// excluded, then Keccak it. This is the value the PoW primitive
	/// verifies the nonce against.
	pub fn hash_no_nonce(&self) -> H256 {
		keccak_hash::keccak(self.rlp_bytes_no_nonce())
	}

	/// Full header hash, seal fields included. Used to look up a header
	/// in the chain and to seed the uncle-ancestry walk.
	pub fn hash(&self) -> H256 {
		keccak_hash::keccak(rlp::encode(self))
	}

	fn rlp_bytes_no_nonce(&self) -> Vec<u8> {
		let mut stream = RlpStream::new_list(13);
		self.stream_common(&mut stream);
		stream.out()
	}

	fn stream_common(&self, s: &mut RlpStream) {
		s.append(&self.parent_hash);
		s.append(&self.uncle_hash);
		s.append(&self.coinbase);
		s.append(&self.root);
		s.append(&self.tx_hash);
		s.append(&self.receipts_hash);
		s.append(&self.bloom);
		s.append(&self.difficulty);
		s.append(&self.number);
		s.append(&self.gas_limit);
		s.append(&self.gas_used);
		s.append(&self.time);
		s.append(&self.extra);
	}
}

impl Encodable for Header {
	fn rlp_append(&self, s: &mut RlpStream) {
		s.begin_list(15);
		self.stream_common(s);
		s.append(&self.mix_digest);
		s.append(&self.nonce);
	}
}

/// `(header, transactions, uncles, receipts)` — opaque transaction and
/// receipt payloads are left generic to the embedder; the core never reads
/// them.
#[derive(Debug, Clone)]
pub struct Block<Tx, Receipt> {
	pub header: Header,
	pub transactions: Vec<Tx>,
	pub uncles: Vec<Header>,
	pub receipts: Vec<Receipt>,
}

impl<Tx, Receipt> Block<Tx, Receipt> {
	pub fn new(header: Header, transactions: Vec<Tx>, uncles: Vec<Header>, receipts: Vec<Receipt>) -> Self {
		Block { header, transactions, uncles, receipts }
	}
}
