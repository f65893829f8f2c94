use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::PinLengths;
use crate::credential::{CredentialHash, RecoveryOutcome};

/// Chunks handed to each worker; more chunks than workers lets idle threads
/// steal low ranges first.
const CHUNKS_PER_WORKER: u64 = 4;

/// Find the smallest candidate in `0..space` accepted by `is_match`.
///
/// The space is cut into disjoint ascending ranges scanned in parallel. A
/// shared minimum acts as the cancellation signal: a worker stops as soon as
/// its next candidate is not below the best match found so far, so the
/// result is always the numerically smallest match no matter which worker
/// reports first. The pool never grows past the number of available cores.
pub fn search_smallest<F>(space: u64, workers: usize, is_match: F) -> Option<u64>
where
    F: Fn(u64) -> bool + Sync,
{
    if space == 0 {
        return None;
    }

    let workers = workers.clamp(1, num_cpus::get().max(1)) as u64;
    let chunks = (workers * CHUNKS_PER_WORKER).min(space);
    let chunk_size = (space + chunks - 1) / chunks;
    let best = AtomicU64::new(u64::MAX);

    let scan = || {
        (0..chunks).into_par_iter().for_each(|chunk| {
            let start = chunk * chunk_size;
            let end = (start + chunk_size).min(space);
            for candidate in start..end {
                if candidate >= best.load(Ordering::Acquire) {
                    break;
                }
                if is_match(candidate) {
                    best.fetch_min(candidate, Ordering::AcqRel);
                    break;
                }
            }
        });
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers as usize).build() {
        Ok(pool) => pool.install(scan),
        Err(e) => {
            warn!("Failed to build recovery worker pool ({}), using the global pool", e);
            scan();
        }
    }

    match best.into_inner() {
        u64::MAX => None,
        found => Some(found),
    }
}

/// Brute-forces a numeric lockscreen PIN against a stored salted hash.
#[derive(Debug, Clone)]
pub struct CredentialRecoveryEngine {
    lengths: PinLengths,
    workers: usize,
}

impl CredentialRecoveryEngine {
    pub fn new(lengths: PinLengths, workers: usize) -> Self {
        Self {
            lengths,
            workers: workers.max(1),
        }
    }

    /// Search PIN lengths in ascending order, each one `0..10^len` ascending
    pub fn recover(&self, hash: &CredentialHash) -> RecoveryOutcome {
        info!(
            "Attempting {} PIN recovery over {}..={} digits with {} workers",
            hash.scheme, self.lengths.min, self.lengths.max, self.workers
        );

        for length in self.lengths.min..=self.lengths.max {
            let space = 10u64.pow(length as u32);
            debug!("Scanning {} candidates of length {}", space, length);

            let found = search_smallest(space, self.workers, |candidate| {
                hash.matches(&format_pin(candidate, length))
            });

            if let Some(candidate) = found {
                let pin = format_pin(candidate, length);
                info!("Lockscreen PIN recovered");
                return RecoveryOutcome::Recovered(pin);
            }
        }

        info!("PIN search space exhausted without a match");
        RecoveryOutcome::Exhausted
    }
}

/// Zero-padded decimal PIN of the given width
pub fn format_pin(candidate: u64, length: usize) -> String {
    format!("{:0width$}", candidate, width = length)
}
