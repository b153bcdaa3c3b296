use std::collections::HashSet;

use super::types::{AvailabilityStats, Sample, Status};

/// Count distinct UTC days with an UP sample and find the latest one.
///
/// Order of `samples` does not matter. This is a total, not a streak.
pub fn aggregate<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> AvailabilityStats {
    let mut up_days = HashSet::new();
    let mut last_online = None;

    for sample in samples.into_iter().filter(|s| s.status == Status::Up) {
        let day = sample.timestamp.date_naive();
        up_days.insert(day);
        last_online = last_online.max(Some(day));
    }

    AvailabilityStats { distinct_up_days: up_days.len(), last_online }
}
