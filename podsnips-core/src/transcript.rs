//! Timestamp conversion and transcript windowing
//!
//! Pure functions used by the task detail view: convert between textual
//! timestamps and seconds, pick the transcript segments around a task, and
//! build a deep link into the source video.

use crate::types::TranscriptSegment;
use regex::Regex;

/// Seconds of transcript shown before a task's timestamp.
pub const DEFAULT_BEFORE_SECS: f64 = 15.0;

/// Seconds of transcript shown after a task's timestamp.
pub const DEFAULT_AFTER_SECS: f64 = 45.0;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Parse `"HH:MM:SS"` or `"MM:SS"` into whole seconds.
///
/// Empty or unrecognized input yields 0.
pub fn time_to_seconds(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let parts: Option<Vec<u64>> = text
        .split(':')
        .map(|part| {
            let part = part.trim();
            if part.is_empty() {
                None
            } else {
                part.parse().ok()
            }
        })
        .collect();

    let total = match parts.as_deref() {
        Some(&[hours, minutes, seconds]) => hours
            .checked_mul(3600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds)),
        Some(&[minutes, seconds]) => minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds)),
        _ => None,
    };
    // out-of-range values count as unrecognized
    total.unwrap_or(0)
}

/// Format seconds as zero-padded `"HH:MM:SS"`.
///
/// Fractional seconds are truncated; negative or non-finite input formats as zero.
pub fn seconds_to_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Select the segments overlapping `[T - before, T + after]`, where `T` is
/// the task timestamp in seconds.
///
/// A segment `[start, start + duration]` is kept when it touches the window
/// at all. The result is sorted by `start` regardless of input order. An
/// empty timestamp selects nothing.
pub fn select_window<'a>(
    transcript: &'a [TranscriptSegment],
    task_timestamp: &str,
    before_secs: f64,
    after_secs: f64,
) -> Vec<&'a TranscriptSegment> {
    if task_timestamp.trim().is_empty() {
        return Vec::new();
    }

    let task_secs = time_to_seconds(task_timestamp) as f64;
    let min_time = task_secs - before_secs;
    let max_time = task_secs + after_secs;

    let mut window: Vec<&TranscriptSegment> = transcript
        .iter()
        .filter(|segment| segment.end() >= min_time && segment.start <= max_time)
        .collect();
    window.sort_by(|a, b| a.start.total_cmp(&b.start));
    window
}

/// Start and end seconds of a clip cut around a task timestamp.
///
/// The start never goes below zero.
pub fn clip_bounds(task_timestamp: &str, before_secs: f64, after_secs: f64) -> (f64, f64) {
    let task_secs = time_to_seconds(task_timestamp) as f64;
    let start = (task_secs - before_secs).max(0.0);
    let end = (task_secs + after_secs).max(start);
    (start, end)
}

/// Build a watch URL for `video_id`, optionally starting at `start_secs`.
///
/// Returns `None` without a video id. A start of exactly zero still emits
/// `&t=0s`: absence is expressed with `None`, not with zero.
pub fn build_video_url(video_id: Option<&str>, start_secs: Option<f64>) -> Option<String> {
    let video_id = video_id.map(str::trim).filter(|id| !id.is_empty())?;
    let base = format!("{WATCH_URL}{video_id}");

    Some(match start_secs {
        Some(start) if start.is_finite() => {
            let start = start.max(0.0).floor() as u64;
            format!("{base}&t={start}s")
        }
        _ => base,
    })
}

/// Extract an 11-character video id from a bare id or a watch/short/embed URL.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if let Ok(bare) = Regex::new(r"^[a-zA-Z0-9_-]{11}$") {
        if bare.is_match(input) {
            return Some(input.to_string());
        }
    }

    let patterns = [
        r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtu\.be/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"(?:https?://)?(?:www\.)?youtube\.com/v/([a-zA-Z0-9_-]{11})",
    ];

    patterns.iter().find_map(|pattern| {
        Regex::new(pattern)
            .ok()?
            .captures(input)?
            .get(1)
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, duration: f64) -> TranscriptSegment {
        TranscriptSegment {
            start,
            duration,
            text: format!("at {start}"),
        }
    }

    #[test]
    fn test_time_to_seconds() {
        assert_eq!(time_to_seconds("01:33:53"), 5633);
        assert_eq!(time_to_seconds("09:22"), 562);
        assert_eq!(time_to_seconds(""), 0);
        assert_eq!(time_to_seconds("   "), 0);
    }

    #[test]
    fn test_time_to_seconds_unrecognized() {
        assert_eq!(time_to_seconds("42"), 0);
        assert_eq!(time_to_seconds("1:2:3:4"), 0);
        assert_eq!(time_to_seconds("ab:cd"), 0);
        assert_eq!(time_to_seconds("01::03"), 0);
        assert_eq!(time_to_seconds("-1:30"), 0);
    }

    #[test]
    fn test_time_to_seconds_overflow() {
        assert_eq!(time_to_seconds("9999999999999999:00:00"), 0);
        assert_eq!(time_to_seconds("18446744073709551615:00"), 0);
        assert_eq!(time_to_seconds("00:00:18446744073709551615"), 18446744073709551615);
        assert_eq!(time_to_seconds("00:01:18446744073709551615"), 0);
    }

    #[test]
    fn test_clip_bounds_with_overflowing_timestamp() {
        let (start, end) = clip_bounds("9999999999999999:00:00", 15.0, 45.0);
        assert_eq!(start, 0.0);
        assert_eq!(end, 45.0);
    }

    #[test]
    fn test_seconds_to_time() {
        assert_eq!(seconds_to_time(5633.0), "01:33:53");
        assert_eq!(seconds_to_time(0.0), "00:00:00");
        assert_eq!(seconds_to_time(59.99), "00:00:59");
        assert_eq!(seconds_to_time(-5.0), "00:00:00");
        assert_eq!(seconds_to_time(f64::NAN), "00:00:00");
    }

    #[test]
    fn test_round_trip() {
        for x in (0..200_000u64).step_by(997).chain([0, 59, 60, 3599, 3600, 86_399]) {
            assert_eq!(time_to_seconds(&seconds_to_time(x as f64)), x, "x = {x}");
        }
    }

    #[test]
    fn test_select_window_keeps_overlapping_only() {
        let transcript = vec![seg(0.0, 30.0), seg(100.0, 10.0), seg(200.0, 5.0)];
        let window = select_window(&transcript, "01:45", 15.0, 45.0);

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].start, 100.0);
    }

    #[test]
    fn test_select_window_sorts_reverse_input() {
        let transcript = vec![seg(120.0, 5.0), seg(110.0, 5.0), seg(100.0, 5.0), seg(95.0, 5.0)];
        let window = select_window(&transcript, "00:01:45", 15.0, 45.0);

        let starts: Vec<f64> = window.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![95.0, 100.0, 110.0, 120.0]);
    }

    #[test]
    fn test_select_window_boundaries_inclusive() {
        // window for 100s with 10/10 is [90, 110]
        let transcript = vec![seg(80.0, 10.0), seg(110.0, 3.0), seg(79.0, 10.0), seg(111.0, 1.0)];
        let window = select_window(&transcript, "01:40", 10.0, 10.0);

        let starts: Vec<f64> = window.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![80.0, 110.0]);
    }

    #[test]
    fn test_select_window_empty_timestamp() {
        let transcript = vec![seg(0.0, 30.0)];
        assert!(select_window(&transcript, "", 15.0, 45.0).is_empty());
    }

    #[test]
    fn test_clip_bounds_clamps_start() {
        assert_eq!(clip_bounds("00:05", 15.0, 45.0), (0.0, 50.0));
        assert_eq!(clip_bounds("01:00", 15.0, 45.0), (45.0, 105.0));
    }

    #[test]
    fn test_build_video_url() {
        assert_eq!(build_video_url(None, Some(10.0)), None);
        assert_eq!(build_video_url(Some(""), None), None);
        assert_eq!(
            build_video_url(Some("abc123"), None).as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(
            build_video_url(Some("abc123"), Some(90.7)).as_deref(),
            Some("https://www.youtube.com/watch?v=abc123&t=90s")
        );
    }

    #[test]
    fn test_build_video_url_zero_start_keeps_parameter() {
        assert_eq!(
            build_video_url(Some("abc123"), Some(0.0)).as_deref(),
            Some("https://www.youtube.com/watch?v=abc123&t=0s")
        );
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id("https://example.com/video"), None);
    }
}
