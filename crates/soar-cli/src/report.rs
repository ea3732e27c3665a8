//! Human-readable progress lines.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use soar_core::{Solution, TaskStats};

/// Wall-clock arrival for `remaining_s` seconds from `now`, RFC 3339 UTC.
pub fn eta(now: DateTime<Utc>, remaining_s: f64) -> Option<String> {
    if !remaining_s.is_finite() || remaining_s < 0.0 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds((remaining_s * 1000.0).round() as i64)?;
    now.checked_add_signed(delta)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn solution_label(solution: Solution) -> &'static str {
    match solution {
        Solution::Ok => "ok",
        Solution::Partial => "partial",
        Solution::WindExceeds => "wind",
        Solution::MacCreadyInsufficient => "mc",
        Solution::NoSolution => "none",
    }
}

pub fn format_stats(stats: &TaskStats, now: DateTime<Utc>) -> String {
    let active = stats
        .active_index
        .map_or_else(|| "-".to_string(), |i| i.to_string());
    let remaining = &stats.total.solution_remaining;
    let arrival = if stats.task_finished {
        "finished".to_string()
    } else if remaining.solution.is_achievable() {
        eta(now, stats.total.time_remaining).unwrap_or_else(|| "-".to_string())
    } else {
        "-".to_string()
    };
    format!(
        "t={:>6.0}s active={} scored={:>6.1}km remaining={:>6.1}km speed={:>5.1}km/h \
         glide={} margin={:>6.0}m mc_best={:.1} eff={:.2} eta={}",
        stats.time,
        active,
        stats.distance_scored / 1000.0,
        stats.total.remaining.distance / 1000.0,
        stats.total.travelled.speed * 3.6,
        solution_label(remaining.solution),
        remaining.altitude_difference,
        stats.mc_best,
        stats.cruise_efficiency,
        arrival,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn eta_adds_remaining_time() {
        assert_eq!(
            eta(noon(), 5400.0).as_deref(),
            Some("2024-07-01T13:30:00Z")
        );
        assert_eq!(eta(noon(), f64::INFINITY), None);
        assert_eq!(eta(noon(), -1.0), None);
    }

    #[test]
    fn line_reflects_state() {
        let mut stats = TaskStats::default();
        assert!(format_stats(&stats, noon()).contains("active=-"));

        stats.active_index = Some(2);
        stats.total.solution_remaining.solution = Solution::Ok;
        stats.total.time_remaining = 60.0;
        let line = format_stats(&stats, noon());
        assert!(line.contains("active=2"));
        assert!(line.contains("eta=2024-07-01T12:01:00Z"));

        stats.task_finished = true;
        assert!(format_stats(&stats, noon()).contains("eta=finished"));
    }
}
