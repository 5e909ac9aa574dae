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

//! Batch header verifier (§4.3, §5).
//!
//! A coordinator thread multiplexes over three events — a worker slot
//! opening up to take the next index, a worker reporting completion, and
//! the caller's abort signal — via [`crossbeam::channel::Select`], the
//! direct analogue of the `select { ... }` dispatch loops common in
//! channel-based I/O handlers. Homogeneous workers pull
//! indices off a rendezvous channel; results are buffered until every
//! lower index has been emitted, so the consumer sees them strictly in
//! input order regardless of completion order.

use crate::chain::ChainReader;
use crate::error::ConsensusError;
use crate::header::Header;
use crate::params::EgemParams;
use crate::seal::PowMode;
use crate::verify::{now_unix, verify_header};
use crossbeam::channel::{bounded, Receiver, Select, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

/// A boxed, thread-shareable seal check: `verify_headers` stays generic
/// over *which* PoW primitive backs it only through this closure, so the
/// worker threads don't need to monomorphize over `HashimotoLight`/`Cache`
/// (§4.7 owns that generic surface; this module just needs *a* seal
/// check per header).
pub type SealCheck = Arc<dyn Fn(&Header) -> Result<(), ConsensusError> + Send + Sync>;

/// Handle used by the consumer to request cancellation (§5 "Cancellation:
/// the abort signal is one-shot").
#[derive(Clone)]
pub struct AbortHandle(Sender<()>);

impl AbortHandle {
	/// Request the coordinator stop emitting further results. Idempotent;
	/// a second call is a harmless no-op once the first has been
	/// observed (or the channel has already closed).
	pub fn abort(&self) {
		let _ = self.0.send(());
	}
}

/// Verify `headers` against `chain`, checking seals per the parallel
/// `seals` flags, using up to `min(headers.len(), available cores)`
/// worker threads. Returns immediately with an abort handle and a
/// results channel; results arrive strictly in input order and the
/// channel closes once the last result has been sent or abort is
/// observed (§4.3).
pub fn verify_headers<R>(
	params: Arc<EgemParams>,
	chain: Arc<R>,
	mode: PowMode,
	headers: Vec<Header>,
	seals: Vec<bool>,
	verify_seal: SealCheck,
) -> (AbortHandle, Receiver<Result<(), ConsensusError>>)
where
	R: ChainReader + Send + Sync + 'static,
{
	let n = headers.len();
	debug_assert_eq!(n, seals.len(), "headers and seals must be parallel arrays");
	let (abort_tx, abort_rx) = bounded::<()>(0);

	if mode == PowMode::FullFake || n == 0 {
		let (results_tx, results_rx) = bounded(n.max(1));
		for _ in 0..n {
			let _ = results_tx.send(Ok(()));
		}
		return (AbortHandle(abort_tx), results_rx);
	}

	let workers = n.min(num_cpus::get()).max(1);
	let headers = Arc::new(headers);
	let seals = Arc::new(seals);
	let slots: Arc<Mutex<Vec<Option<Result<(), ConsensusError>>>>> = Arc::new(Mutex::new((0..n).map(|_| None).collect()));

	let (input_tx, input_rx) = bounded::<usize>(0);
	let (done_tx, done_rx) = bounded::<usize>(workers);
	let (out_tx, out_rx) = bounded::<Result<(), ConsensusError>>(n);

	for _ in 0..workers {
		let input_rx = input_rx.clone();
		let done_tx = done_tx.clone();
		let headers = Arc::clone(&headers);
		let seals = Arc::clone(&seals);
		let slots = Arc::clone(&slots);
		let chain = Arc::clone(&chain);
		let params = Arc::clone(&params);
		let verify_seal = Arc::clone(&verify_seal);
		thread::spawn(move || {
			for index in input_rx.iter() {
				let result = verify_one(&params, &*chain, &headers, &seals, index, &*verify_seal);
				slots.lock().expect("batch verifier slots mutex poisoned").get_mut(index).map(|s| *s = Some(result));
				if done_tx.send(index).is_err() {
					break;
				}
			}
		});
	}

	thread::spawn(move || {
		let mut next_in = 0usize;
		let mut completed = vec![false; n];
		let mut next_out = 0usize;
		let mut input_tx = Some(input_tx);

		loop {
			let mut select = Select::new();
			let send_op = input_tx.as_ref().map(|tx| select.send(tx));
			let done_op = select.recv(&done_rx);
			let abort_op = select.recv(&abort_rx);

			let chosen = select.select();
			let chosen_index = chosen.index();

			if Some(chosen_index) == send_op {
				let tx = input_tx.as_ref().expect("send operation only registered while sender present");
				if chosen.send(tx, next_in).is_err() {
					return;
				}
				next_in += 1;
				if next_in == n {
					// No more indices to dispatch; dropping the sender
					// closes the rendezvous channel so workers exit once
					// they've drained what's already in flight.
					input_tx = None;
				}
			} else if chosen_index == done_op {
				let index = match chosen.recv(&done_rx) {
					Ok(index) => index,
					Err(_) => return,
				};
				completed[index] = true;
				while next_out < n && completed[next_out] {
					let result = slots.lock().expect("batch verifier slots mutex poisoned")[next_out]
						.take()
						.expect("completed slot must hold a result");
					if out_tx.send(result).is_err() {
						return;
					}
					next_out += 1;
				}
				if next_out == n {
					return;
				}
			} else if chosen_index == abort_op {
				let _ = chosen.recv(&abort_rx);
				warn!(target: "ethash", "verify_headers: abort observed, {}/{} results emitted", next_out, n);
				return;
			} else {
				unreachable!("Select only registers the operations built above");
			}
		}
	});

	(AbortHandle(abort_tx), out_rx)
}

/// Per-index worker logic (§4.3, §9 Q3).
fn verify_one<R: ChainReader>(
	params: &EgemParams,
	chain: &R,
	headers: &[Header],
	seals: &[bool],
	index: usize,
	verify_seal: &(dyn Fn(&Header) -> Result<(), ConsensusError> + Send + Sync),
) -> Result<(), ConsensusError> {
	let header = &headers[index];

	let parent = if index == 0 {
		chain.get_header(header.parent_hash, header.number.saturating_sub(1))
	} else if headers[index - 1].hash() == header.parent_hash {
		Some(headers[index - 1].clone())
	} else {
		chain.get_header(header.parent_hash, header.number.saturating_sub(1))
	};
	let parent = match parent {
		Some(parent) => parent,
		None => return Err(ConsensusError::UnknownAncestor),
	};

	// Preserved verbatim (§9 Q3): the "already known" short-circuit looks
	// up `headers[index].hash()`, not the parent's hash or any other
	// derived key.
	if chain.get_header(header.hash(), header.number).is_some() {
		return Ok(());
	}

	let check_seal: Option<Box<dyn FnOnce() -> Result<(), ConsensusError> + '_>> =
		if seals[index] { Some(Box::new(|| verify_seal(header))) } else { None };

	verify_header(params, chain, header, &parent, false, now_unix(), check_seal)
}
