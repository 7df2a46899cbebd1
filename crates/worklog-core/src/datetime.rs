use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  Local,
  NaiveDate
};
use regex::Regex;

use crate::quarter;

const LONG_DATE_FORMAT: &str =
  "%a %b %-d %Y";
const PADDED_DATE_FORMAT: &str =
  "%a %b %e %Y";

/// Today on the local system clock.
#[must_use]
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

/// `Mon Jan 2 2006` style.
#[must_use]
pub fn format_long_date(
  date: NaiveDate
) -> String {
  date
    .format(LONG_DATE_FORMAT)
    .to_string()
}

/// `Mon Jan  2 2006` style, day of month padded to two columns.
#[must_use]
pub fn format_padded_date(
  date: NaiveDate
) -> String {
  date
    .format(PADDED_DATE_FORMAT)
    .to_string()
}

#[tracing::instrument]
pub fn parse_reference_date(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" | "now" => {
      return Ok(today);
    }
    | "tomorrow" => {
      return Ok(
        today + Duration::days(1)
      );
    }
    | "yesterday" => {
      return Ok(
        today - Duration::days(1)
      );
    }
    | _ => {}
  }

  if let Some(month) =
    parse_month_name(&lower)
  {
    return NaiveDate::from_ymd_opt(
      today.year(),
      month,
      1
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid month name: {token}"
      )
    });
  }

  if let Some(date) =
    parse_quarter_expr(token)?
  {
    return Ok(date);
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  if token.len() == 8
    && token
      .chars()
      .all(|c| c.is_ascii_digit())
  {
    return NaiveDate::parse_from_str(
      token, "%Y%m%d"
    )
    .with_context(|| {
      format!(
        "invalid compact date: {token}"
      )
    });
  }

  let month_re =
    Regex::new(r"^(\d{4})-(\d{1,2})$")
      .context(
        "failed to compile month \
         pattern"
      )?;
  if let Some(caps) =
    month_re.captures(token)
  {
    let year: i32 = caps[1]
      .parse()
      .context("invalid year")?;
    let month: u32 = caps[2]
      .parse()
      .context("invalid month")?;
    return NaiveDate::from_ymd_opt(
      year, month, 1
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid year-month: {token}"
      )
    });
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {token}; supported: today, \
     yesterday, tomorrow, YYYY-MM-DD, \
     YYYYMMDD, YYYY-MM, YYYY-Qn, month \
     names (e.g. march)"
  ))
}

fn parse_quarter_expr(
  token: &str
) -> anyhow::Result<Option<NaiveDate>>
{
  let quarter_re = Regex::new(
    r"(?i)^(?P<year>\d{4})-?q(?P<quarter>\d)$"
  )
  .context(
    "failed to compile quarter pattern"
  )?;
  let Some(caps) =
    quarter_re.captures(token)
  else {
    return Ok(None);
  };

  let year: i32 = caps["year"]
    .parse()
    .context("invalid year")?;
  let quarter: u32 = caps["quarter"]
    .parse()
    .context("invalid quarter")?;
  let month =
    quarter::first_month_of_quarter(
      quarter
    )?;

  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .map(Some)
  .ok_or_else(|| {
    anyhow!(
      "invalid quarter expression: \
       {token}"
    )
  })
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}
