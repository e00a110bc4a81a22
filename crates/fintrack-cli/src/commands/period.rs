//! Period resolution

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};

/// Resolve a period string to (from_date, to_date), relative to today
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
) -> Result<(NaiveDate, NaiveDate)> {
    resolve_period_at(period, custom_from, custom_to, Utc::now().date_naive())
}

/// Resolve a period string relative to a fixed date
pub fn resolve_period_at(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    match (custom_from, custom_to) {
        (Some(from), Some(to)) => {
            let from_date = NaiveDate::parse_from_str(from, "%Y-%m-%d")
                .context("Invalid --from date format (use YYYY-MM-DD)")?;
            let to_date = NaiveDate::parse_from_str(to, "%Y-%m-%d")
                .context("Invalid --to date format (use YYYY-MM-DD)")?;
            return Ok((from_date, to_date));
        }
        (Some(_), None) | (None, Some(_)) => {
            anyhow::bail!("--from and --to must be given together")
        }
        (None, None) => {}
    }

    match period.to_lowercase().as_str() {
        "this-month" => Ok((month_start(today.year(), today.month())?, today)),
        "last-month" => {
            let this_month = month_start(today.year(), today.month())?;
            let last_day = this_month
                .pred_opt()
                .context("No day before the start of this month")?;
            let from = month_start(last_day.year(), last_day.month())?;
            Ok((from, last_day))
        }
        "this-year" => Ok((month_start(today.year(), 1)?, today)),
        "last-30-days" => Ok((today - Duration::days(30), today)),
        "last-90-days" => Ok((today - Duration::days(90), today)),
        "all" => Ok((month_start(2000, 1)?, today)),
        _ => anyhow::bail!(
            "Unknown period: {}. Available: this-month, last-month, this-year, last-30-days, last-90-days, all",
            period
        ),
    }
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month {}-{}", year, month))
}
