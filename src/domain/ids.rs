use chrono::{DateTime, Utc};

/// Issues time-derived ids: the current epoch milliseconds, bumped past the
/// last issued id so two records created in the same millisecond never collide.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Resumes after the largest id already present in a restored snapshot.
    pub fn resume_after<I: IntoIterator<Item = u64>>(ids: I) -> Self {
        Self {
            last: ids.into_iter().max().unwrap_or(0),
        }
    }

    pub fn next_at(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last.saturating_add(1));
        self.last
    }

    pub fn next(&mut self) -> u64 {
        self.next_at(Utc::now())
    }
}
