//! Epidemic curve (zero-filled daily counts) and the Estimated
//! Dissemination Ratio (EDR), a rolling growth/decline indicator.

use chrono::Duration;
use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::EngineError;
use crate::types::*;

/// Group events by calendar date and reindex over the full inclusive span
/// with zero-fill. Empty input returns an empty series, not an error.
pub fn daily_counts(events: &[OutbreakEvent]) -> DailyCountSeries {
  if events.is_empty() {
    return DailyCountSeries::default();
  }

  let mut by_date: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
  for event in events {
    *by_date.entry(event.reported_date).or_insert(0) += 1;
  }

  // BTreeMap keys are sorted; first/last exist because events is non-empty.
  let (start, end) = match (by_date.keys().next(), by_date.keys().next_back()) {
    (Some(&start), Some(&end)) => (start, end),
    _ => return DailyCountSeries::default(),
  };

  let mut points = Vec::with_capacity((end - start).num_days() as usize + 1);
  let mut date = start;
  while date <= end {
    points.push(DailyCount {
      date,
      count: by_date.get(&date).copied().unwrap_or(0),
    });
    date += Duration::days(1);
  }
  DailyCountSeries { points }
}

/// Compute the EDR series over a daily-count series.
///
/// `numerator(t)` is the trailing `w`-day rolling sum ending at `t`;
/// `denominator(t)` is that same sum shifted back `w` days. Ratios whose
/// windows fall outside the series, and ratios with a zero denominator
/// (0/0 and x/0 alike), are coerced to 0.0 — this deliberately discards
/// the distinction between "no prior data" and "genuinely zero
/// dissemination". The leading `2w - 1` points carry `partial: true` so
/// callers can present them at reduced confidence. No NaN or Inf escapes.
///
/// EDR > 1 signals growth, < 1 decline, = 1 plateau; interpreting those
/// thresholds is the caller's business.
pub fn calculate_edr(
  series: &DailyCountSeries,
  config: &Config,
) -> Result<EdrSeries, EngineError> {
  config.validate()?;
  let w = config.edr_window_days;
  let n = series.len();
  if n == 0 {
    return Ok(EdrSeries::default());
  }

  // Prefix sums: prefix[i] = counts[0] + .. + counts[i-1].
  let mut prefix = vec![0u64; n + 1];
  for (i, point) in series.points.iter().enumerate() {
    prefix[i + 1] = prefix[i] + point.count;
  }
  // Trailing w-day sum ending at i; None until the window is populated.
  let rolling = |i: usize| -> Option<u64> {
    if i + 1 >= w {
      Some(prefix[i + 1] - prefix[i + 1 - w])
    } else {
      None
    }
  };

  let mut points = Vec::with_capacity(n);
  for i in 0..n {
    let numerator = rolling(i);
    let denominator = if i >= w { rolling(i - w) } else { None };
    let edr = match (numerator, denominator) {
      (Some(num), Some(den)) if den > 0 => num as f64 / den as f64,
      _ => 0.0,
    };
    points.push(EdrPoint {
      date: series.points[i].date,
      edr,
      partial: i + 1 < 2 * w,
    });
  }
  Ok(EdrSeries { points })
}
