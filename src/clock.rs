use chrono::{Local, NaiveDateTime};

/// Source of wall-clock time for everything that stamps or compares dates,
/// so tests can pin "now".
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
