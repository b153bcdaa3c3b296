//! Run-length compression of a target's sample log into up/down blocks.

use super::types::{HistoryBlock, Sample};

/// Compress time-ascending samples into maximal same-status blocks.
///
/// The result is newest first. Adjacent blocks always differ in status and
/// every input sample falls inside exactly one block.
pub fn compress(samples: &[Sample]) -> Vec<HistoryBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<HistoryBlock> = None;

    for sample in samples {
        if let Some(block) = current.as_mut() {
            if block.status == sample.status {
                block.end = sample.timestamp;
                continue;
            }
        }

        let opened = HistoryBlock { status: sample.status, start: sample.timestamp, end: sample.timestamp };
        if let Some(closed) = current.replace(opened) {
            blocks.push(closed);
        }
    }

    if let Some(closed) = current {
        blocks.push(closed);
    }

    blocks.reverse();
    blocks
}

/// Number of status changes between consecutive samples
pub fn transitions(samples: &[Sample]) -> usize {
    samples.windows(2).filter(|pair| pair[0].status != pair[1].status).count()
}
