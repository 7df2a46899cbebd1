//! Quarter boundary arithmetic.
//!
//! A [`QuarterDescriptor`] is computed once per run from a reference
//! date and is never mutated afterwards.

use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use tracing::{
  debug,
  trace
};

use crate::error::{
  Result,
  WorklogError
};

const LAST_ISO_WEEK_FALLBACK: u32 = 52;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct QuarterDescriptor {
  pub quarter:    u32,
  pub year:       i32,
  pub first_day:  NaiveDate,
  pub last_day:   NaiveDate,
  pub first_week: u32,
  pub last_week:  u32
}

impl QuarterDescriptor {
  /// A weekday strictly between the first and last calendar day.
  ///
  /// Both boundary dates are excluded even when they fall on a
  /// weekday.
  #[must_use]
  pub fn is_day_printable(
    &self,
    day: NaiveDate
  ) -> bool {
    !matches!(
      day.weekday(),
      Weekday::Sat | Weekday::Sun
    ) && day < self.last_day
      && day > self.first_day
  }
}

/// Quarter (1-4) containing `month`.
pub fn quarter_of(
  month: u32
) -> Result<u32> {
  if !(1..=12).contains(&month) {
    return Err(
      WorklogError::InvalidInput(
        format!("invalid month {month}")
      )
    );
  }
  Ok(month.div_ceil(3))
}

/// Quarter and year following the one that contains `date`.
pub fn next_quarter(
  date: NaiveDate
) -> Result<(u32, i32)> {
  let quarter = quarter_of(date.month())?;
  if quarter == 4 {
    Ok((1, date.year() + 1))
  } else {
    Ok((quarter + 1, date.year()))
  }
}

pub fn first_month_of_quarter(
  quarter: u32
) -> Result<u32> {
  if !(1..=4).contains(&quarter) {
    return Err(
      WorklogError::InvalidInput(
        format!(
          "invalid quarter {quarter}"
        )
      )
    );
  }
  Ok((quarter - 1) * 3 + 1)
}

/// Q1 and Q4 end in a 31-day month, Q2 and Q3 in a 30-day one.
fn last_day_of_quarter(
  first_month: u32
) -> u32 {
  if first_month == 1
    || first_month == 10
  {
    31
  } else {
    30
  }
}

#[tracing::instrument]
pub fn compute(
  reference: Option<NaiveDate>,
  use_next_quarter: bool
) -> Result<QuarterDescriptor> {
  let reference =
    reference.ok_or_else(|| {
      WorklogError::InvalidInput(
        "reference date not set"
          .to_string()
      )
    })?;

  let (quarter, year) =
    if use_next_quarter {
      next_quarter(reference)?
    } else {
      (
        quarter_of(reference.month())?,
        reference.year()
      )
    };
  debug!(
    quarter,
    year,
    use_next_quarter,
    "resolved target quarter"
  );

  for_quarter(quarter, year)
}

/// Boundaries of `quarter` in calendar `year`.
pub fn for_quarter(
  quarter: u32,
  year: i32
) -> Result<QuarterDescriptor> {
  let first_month =
    first_month_of_quarter(quarter)?;

  let first_day =
    NaiveDate::from_ymd_opt(
      year,
      first_month,
      1
    )
    .ok_or_else(|| {
      WorklogError::InvalidInput(
        format!(
          "no first day for \
           {year}Q{quarter}"
        )
      )
    })?;

  let last_day =
    NaiveDate::from_ymd_opt(
      year,
      first_month + 2,
      last_day_of_quarter(
        first_month
      )
    )
    .ok_or_else(|| {
      WorklogError::InvalidInput(
        format!(
          "no last day for \
           {year}Q{quarter}"
        )
      )
    })?;

  let first_iso = first_day.iso_week();
  let first_week =
    if first_iso.year() < year {
      trace!(
        iso_year = first_iso.year(),
        iso_week = first_iso.week(),
        "first day belongs to previous iso year"
      );
      1
    } else {
      first_iso.week()
    };

  let mut last_week =
    last_day.iso_week().week();
  if last_week == 1 {
    trace!(
      %last_day,
      "last day falls in iso week 1 of next year"
    );
    last_week = LAST_ISO_WEEK_FALLBACK;
  }

  let descriptor = QuarterDescriptor {
    quarter,
    year,
    first_day,
    last_day,
    first_week,
    last_week
  };
  debug!(?descriptor, "computed quarter");
  Ok(descriptor)
}

#[cfg(test)]
mod tests {
  use chrono::{
    Datelike,
    NaiveDate
  };

  use super::{
    compute,
    first_month_of_quarter,
    for_quarter,
    next_quarter,
    quarter_of
  };
  use crate::error::WorklogError;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn quarter_of_every_month() {
    let expected =
      [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4];
    for (idx, quarter) in
      expected.iter().enumerate()
    {
      let month = idx as u32 + 1;
      assert_eq!(
        quarter_of(month)
          .expect("valid month"),
        *quarter,
        "month {month}"
      );
    }
  }

  #[test]
  fn quarter_of_rejects_out_of_range() {
    for month in [0, 13, 99] {
      assert!(matches!(
        quarter_of(month),
        Err(WorklogError::InvalidInput(_))
      ));
    }
  }

  #[test]
  fn first_month_rejects_bad_quarter()
  {
    assert_eq!(
      first_month_of_quarter(4)
        .expect("valid quarter"),
      10
    );
    assert!(
      first_month_of_quarter(0).is_err()
    );
    assert!(
      first_month_of_quarter(5).is_err()
    );
  }

  #[test]
  fn next_quarter_advances_and_rolls_year()
  {
    for month in 1..=12 {
      let reference = date(2023, month, 15);
      let source = quarter_of(month)
        .expect("valid month");
      let (quarter, year) =
        next_quarter(reference)
          .expect("next quarter");
      assert_eq!(
        quarter,
        source % 4 + 1
      );
      let expected_year =
        if source == 4 { 2024 } else { 2023 };
      assert_eq!(year, expected_year);

      let descriptor =
        compute(Some(reference), true)
          .expect("compute");
      assert_eq!(
        quarter_of(
          descriptor.first_day.month()
        )
        .expect("valid month"),
        source % 4 + 1
      );
      assert_eq!(
        descriptor.year,
        expected_year
      );
    }
  }

  #[test]
  fn current_quarter_mid_may_2024() {
    let descriptor = compute(
      Some(date(2024, 5, 15)),
      false
    )
    .expect("compute");
    assert_eq!(descriptor.quarter, 2);
    assert_eq!(descriptor.year, 2024);
    assert_eq!(
      descriptor.first_day,
      date(2024, 4, 1)
    );
    assert_eq!(
      descriptor.last_day,
      date(2024, 6, 30)
    );
    assert_eq!(descriptor.first_week, 14);
    assert_eq!(descriptor.last_week, 26);
  }

  #[test]
  fn next_quarter_from_november_rolls_over()
  {
    let descriptor = compute(
      Some(date(2024, 11, 20)),
      true
    )
    .expect("compute");
    assert_eq!(descriptor.quarter, 1);
    assert_eq!(descriptor.year, 2025);
    assert_eq!(
      descriptor.first_day,
      date(2025, 1, 1)
    );
    assert_eq!(
      descriptor.last_day,
      date(2025, 3, 31)
    );
    assert_eq!(descriptor.first_week, 1);
    assert_eq!(descriptor.last_week, 14);
  }

  #[test]
  fn last_day_length_follows_quarter() {
    for quarter in 1..=4 {
      let descriptor =
        for_quarter(quarter, 2026)
          .expect("quarter");
      assert_eq!(
        descriptor.first_day.day(),
        1
      );
      let expected = match quarter {
        | 1 | 4 => 31,
        | _ => 30
      };
      assert_eq!(
        descriptor.last_day.day(),
        expected
      );
      assert_eq!(
        descriptor.last_day.month(),
        descriptor.first_day.month() + 2
      );
    }
  }

  #[test]
  fn december_week_one_reads_as_52() {
    // 2024-12-31 is a Tuesday in ISO week 1 of 2025.
    let descriptor = for_quarter(4, 2024)
      .expect("quarter");
    assert_eq!(
      descriptor.last_day,
      date(2024, 12, 31)
    );
    assert_eq!(descriptor.first_week, 40);
    assert_eq!(descriptor.last_week, 52);
  }

  #[test]
  fn december_week_53_is_kept() {
    // 2026-12-31 is a Thursday in ISO week 53.
    let descriptor = for_quarter(4, 2026)
      .expect("quarter");
    assert_eq!(descriptor.last_week, 53);
  }

  #[test]
  fn january_in_previous_iso_year_starts_at_week_one()
  {
    // 2027-01-01 is a Friday in ISO week 53 of 2026.
    let descriptor = for_quarter(1, 2027)
      .expect("quarter");
    assert_eq!(descriptor.first_week, 1);
    assert_eq!(descriptor.last_week, 13);
  }

  #[test]
  fn missing_reference_is_invalid_input()
  {
    assert!(matches!(
      compute(None, false),
      Err(WorklogError::InvalidInput(_))
    ));
  }

  #[test]
  fn printable_days_exclude_weekends_and_bounds()
  {
    let descriptor = for_quarter(3, 2024)
      .expect("quarter");
    // Monday 2024-07-01 and Monday 2024-09-30 are the bounds.
    assert!(
      !descriptor
        .is_day_printable(date(2024, 7, 1))
    );
    assert!(
      !descriptor
        .is_day_printable(date(2024, 9, 30))
    );
    assert!(
      descriptor
        .is_day_printable(date(2024, 7, 2))
    );
    assert!(
      descriptor
        .is_day_printable(date(2024, 9, 27))
    );
    assert!(
      !descriptor
        .is_day_printable(date(2024, 7, 6))
    );
    assert!(
      !descriptor
        .is_day_printable(date(2024, 7, 7))
    );
    assert!(
      !descriptor
        .is_day_printable(date(2024, 10, 2))
    );
    assert!(
      !descriptor
        .is_day_printable(date(2024, 6, 28))
    );
  }
}
