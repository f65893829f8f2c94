use log::info;
use sha1::{Digest, Sha1};

use crate::constants::{GESTURE_GRID_NODES, GESTURE_MIN_NODES};
use crate::credential::search_smallest;

/// SHA-1 of a pattern given as 0-based grid node indices
pub fn pattern_digest(nodes: &[u8]) -> [u8; 20] {
    Sha1::digest(nodes).into()
}

/// Every sequence of `length` distinct nodes, lexicographic, flattened
fn patterns_of_length(length: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(length);
    let mut used = [false; GESTURE_GRID_NODES as usize];
    extend_patterns(length, &mut current, &mut used, &mut out);
    out
}

fn extend_patterns(length: usize, current: &mut Vec<u8>, used: &mut [bool], out: &mut Vec<u8>) {
    if current.len() == length {
        out.extend_from_slice(current);
        return;
    }
    for node in 0..GESTURE_GRID_NODES {
        if used[node as usize] {
            continue;
        }
        used[node as usize] = true;
        current.push(node);
        extend_patterns(length, current, used, out);
        current.pop();
        used[node as usize] = false;
    }
}

/// Invert a 20-byte `gesture.key` digest.
///
/// Patterns are tried shortest first, lexicographically within a length,
/// so the result is the first pattern in that order with this digest.
pub fn recover_pattern(digest: &[u8], workers: usize) -> Option<Vec<u8>> {
    for length in GESTURE_MIN_NODES..=GESTURE_GRID_NODES as usize {
        let patterns = patterns_of_length(length);
        let space = (patterns.len() / length) as u64;

        let found = search_smallest(space, workers, |index| {
            let start = index as usize * length;
            pattern_digest(&patterns[start..start + length]).as_slice() == digest
        });

        if let Some(index) = found {
            let start = index as usize * length;
            info!("Gesture pattern recovered ({} nodes)", length);
            return Some(patterns[start..start + length].to_vec());
        }
    }
    None
}

/// Render nodes as `0-3-6-7-8`
pub fn format_pattern(nodes: &[u8]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
