use chrono::prelude::*;
use chrono::{Duration, NaiveDate};

/// Length of one forecast bucket.
pub const CADENCE_HOURS: i64 = 3;

pub fn cadence() -> Duration {
    Duration::hours(CADENCE_HOURS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Day {
    t: NaiveDate,
}

impl Day {
    pub fn new(t: NaiveDate) -> Day {
        Day { t }
    }

    pub fn containing(t: DateTime<Utc>) -> Day {
        Day::new(t.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.t
    }

    pub fn next(&self) -> Day {
        Day::new(self.t + Duration::days(1))
    }

    pub fn prev(&self) -> Day {
        Day::new(self.t - Duration::days(1))
    }

    /// Days from `self` through `last`, inclusive.
    pub fn through(&self, last: Day) -> DaysIter {
        DaysIter {
            cur: *self,
            end: last.next(),
        }
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.t)
    }
}

pub struct DaysIter {
    cur: Day,
    end: Day,
}

impl Iterator for DaysIter {
    type Item = Day;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur;
        if cur.t < self.end.t {
            self.cur = cur.next();
            Some(cur)
        } else {
            None
        }
    }
}

/// A fixed-width time interval together with the pixel column it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    index: usize,
    start: DateTime<Utc>,
    x: i32,
}

impl Bucket {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + cadence()
    }

    /// Left pixel column of this bucket.
    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end()
    }
}

/// Walks `count` consecutive buckets from `start`, advancing `step` pixels each.
pub struct Buckets {
    next: Bucket,
    step: i32,
    remaining: usize,
}

impl Buckets {
    pub fn new(start: DateTime<Utc>, x: i32, step: i32, count: usize) -> Buckets {
        Buckets {
            next: Bucket { index: 0, start, x },
            step,
            remaining: count,
        }
    }
}

impl Iterator for Buckets {
    type Item = Bucket;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let cur = self.next;
        self.next = Bucket {
            index: cur.index + 1,
            start: cur.end(),
            x: cur.x + self.step,
        };
        Some(cur)
    }
}
