use std::time::Duration;

/// Characters that make up one "word" for WPM purposes.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Smallest elapsed time stats are computed over, in minutes.
pub const MIN_ELAPSED_MINUTES: f64 = 0.01;

/// Speed and accuracy figures derived from character counts and elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub gross_wpm: u32,
    pub net_wpm: u32,
    pub accuracy: u32,
}

/// Clamp a duration to the minimum positive window, in minutes.
pub fn elapsed_minutes(elapsed: Duration) -> f64 {
    clamp_minutes(elapsed.as_secs_f64() / 60.0)
}

pub fn clamp_minutes(minutes: f64) -> f64 {
    if minutes.is_nan() {
        return MIN_ELAPSED_MINUTES;
    }
    minutes.max(MIN_ELAPSED_MINUTES)
}

/// Gross/net WPM and accuracy percentage.
///
/// An untouched session (no characters typed) reports 100% accuracy. Net WPM
/// never exceeds gross WPM and neither goes below zero.
pub fn compute_stats(
    total_chars: usize,
    errors: usize,
    correct_chars: usize,
    elapsed_minutes: f64,
) -> Stats {
    let minutes = clamp_minutes(elapsed_minutes);
    let typed_words = total_chars as f64 / CHARS_PER_WORD;

    let gross_wpm = (typed_words / minutes).round().max(0.0) as u32;
    let net_wpm = ((typed_words - errors as f64) / minutes).round().max(0.0) as u32;

    let accuracy = if total_chars > 0 {
        (100.0 * correct_chars.min(total_chars) as f64 / total_chars as f64).round() as u32
    } else {
        100
    };

    Stats {
        gross_wpm,
        net_wpm,
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_session() {
        let stats = compute_stats(0, 0, 0, 0.1);

        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.gross_wpm, 0);
        assert_eq!(stats.net_wpm, 0);
    }

    #[test]
    fn test_one_minute_of_clean_typing() {
        // 250 chars in a minute = 50 words
        let stats = compute_stats(250, 0, 250, 1.0);

        assert_eq!(stats.gross_wpm, 50);
        assert_eq!(stats.net_wpm, 50);
        assert_eq!(stats.accuracy, 100);
    }

    #[test]
    fn test_errors_reduce_net_only() {
        let stats = compute_stats(250, 10, 240, 1.0);

        assert_eq!(stats.gross_wpm, 50);
        assert_eq!(stats.net_wpm, 40);
        assert_eq!(stats.accuracy, 96);
    }

    #[test]
    fn test_accuracy_rounds() {
        assert_eq!(compute_stats(3, 1, 2, 1.0).accuracy, 67);
        assert_eq!(compute_stats(3, 2, 1, 1.0).accuracy, 33);
    }

    #[test]
    fn test_net_wpm_floors_at_zero() {
        let stats = compute_stats(5, 5, 0, 1.0);

        assert_eq!(stats.gross_wpm, 1);
        assert_eq!(stats.net_wpm, 0);
        assert_eq!(stats.accuracy, 0);
    }

    #[test]
    fn test_zero_elapsed_is_clamped() {
        let stats = compute_stats(5, 0, 5, 0.0);

        // 1 word over the 0.01 minute floor
        assert_eq!(stats.gross_wpm, 100);
        assert_eq!(stats.net_wpm, 100);
    }

    #[test]
    fn test_elapsed_minutes_from_duration() {
        assert_eq!(elapsed_minutes(Duration::from_secs(30)), 0.5);
        assert_eq!(elapsed_minutes(Duration::ZERO), MIN_ELAPSED_MINUTES);
        assert_eq!(clamp_minutes(f64::NAN), MIN_ELAPSED_MINUTES);
        assert_eq!(clamp_minutes(-3.0), MIN_ELAPSED_MINUTES);
    }

    #[test]
    fn test_net_never_exceeds_gross_and_accuracy_is_bounded() {
        for total in 0..60usize {
            for errors in 0..=total {
                for minutes in [0.0, 0.005, 0.25, 1.0, 3.5] {
                    let stats = compute_stats(total, errors, total - errors, minutes);
                    assert!(stats.net_wpm <= stats.gross_wpm);
                    assert!(stats.accuracy <= 100);
                }
            }
        }
    }
}
