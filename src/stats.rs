use crate::session::SessionStats;
use itertools::Itertools;

/// Below this many minutes WPM reads 0 rather than spiking.
const MIN_WPM_MINUTES: f64 = 0.1;

/// Words per minute since the first keystroke, rounded.
pub fn words_per_minute(stats: &SessionStats, now_ms: i64) -> u64 {
    let Some(start) = stats.start_time else {
        return 0;
    };

    let minutes = now_ms.saturating_sub(start) as f64 / 60_000.0;
    if minutes < MIN_WPM_MINUTES {
        return 0;
    }

    (stats.words_typed as f64 / minutes).round() as u64
}

/// Elapsed session time as `M:SS`. Minutes do not roll over into hours.
pub fn elapsed_time(stats: &SessionStats, now_ms: i64) -> String {
    let Some(start) = stats.start_time else {
        return "0:00".to_string();
    };

    let seconds = now_ms.saturating_sub(start).max(0) / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Most frequent jam pairs, ties broken by pair id.
pub fn top_jam_pairs(stats: &SessionStats, n: usize) -> Vec<(String, u64)> {
    stats
        .jam_pairs
        .iter()
        .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
        .take(n)
        .map(|(pair, count)| (pair.clone(), *count))
        .collect()
}

/// One-line verdict shown next to the WPM figure.
pub fn pace_remark(wpm: u64) -> &'static str {
    match wpm {
        0..=29 => "Take your time - enjoy the mechanical rhythm!",
        30..=49 => "Steady pace! You're getting the hang of it.",
        50..=69 => "Great speed! Professional typists averaged 60-80 WPM.",
        70..=89 => "Impressive! You'd be a star in any 1960s typing pool.",
        _ => "Exceptional! You type faster than most professionals of the era!",
    }
}
