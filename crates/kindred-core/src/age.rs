//! Calendar age derived from a birth date.

use chrono::{Datelike, NaiveDate};

/// Completed years between `birth_date` and `today`.
///
/// The year difference is reduced by one when this year's birthday has not
/// been reached yet, comparing month first and then day of month. A Feb 29
/// birthday is therefore reached on Mar 1 in non-leap years.
pub fn derived_age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
  let diff_year = today.year() - birth_date.year();
  let diff_month = today.month() as i32 - birth_date.month() as i32;
  let diff_day = today.day() as i32 - birth_date.day() as i32;

  let step = if diff_month < 0 || (diff_month == 0 && diff_day < 0) { -1 } else { 0 };

  diff_year + step
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  #[test]
  fn day_before_birthday() {
    assert_eq!(derived_age(d(2000, 6, 15), d(2024, 6, 14)), 23);
  }

  #[test]
  fn on_birthday() {
    assert_eq!(derived_age(d(2000, 6, 15), d(2024, 6, 15)), 24);
  }

  #[test]
  fn day_after_birthday() {
    assert_eq!(derived_age(d(2000, 6, 15), d(2024, 6, 16)), 24);
  }

  #[test]
  fn earlier_and_later_months() {
    assert_eq!(derived_age(d(2000, 6, 15), d(2024, 5, 30)), 23);
    assert_eq!(derived_age(d(2000, 6, 15), d(2024, 7, 1)), 24);
    assert_eq!(derived_age(d(2000, 12, 31), d(2025, 1, 1)), 24);
  }

  #[test]
  fn born_today_is_zero() {
    assert_eq!(derived_age(d(2024, 3, 3), d(2024, 3, 3)), 0);
  }

  #[test]
  fn leap_day_birthday_counts_from_march_first() {
    let birth = d(2000, 2, 29);
    assert_eq!(derived_age(birth, d(2001, 2, 28)), 0);
    assert_eq!(derived_age(birth, d(2001, 3, 1)), 1);
    assert_eq!(derived_age(birth, d(2004, 2, 28)), 3);
    assert_eq!(derived_age(birth, d(2004, 2, 29)), 4);
  }

  #[test]
  fn never_decreases_over_a_year() {
    let birth = d(1992, 2, 29);
    let mut day = d(2023, 1, 1);
    let mut last = derived_age(birth, day);
    while day < d(2025, 1, 1) {
      day = day.succ_opt().unwrap();
      let age = derived_age(birth, day);
      assert!(age >= last, "age went backwards on {day}");
      last = age;
    }
  }
}
