//! The engine's notion of "now".
//!
//! Derived age depends on the current date, so the clock is injected rather
//! than read globally. Tests pin it with [`FixedClock`].

use chrono::{DateTime, NaiveDate, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;

  /// The current calendar date, in UTC.
  fn today(&self) -> NaiveDate { self.now().date_naive() }
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
  /// Midnight UTC on `date`.
  pub fn on(date: NaiveDate) -> Self { Self(date.and_time(chrono::NaiveTime::MIN).and_utc()) }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}
