//! Time-based answer scoring
//!
//! A correct answer is worth [`BASE_POINTS`] plus a speed bonus:
//!
//! | elapsed      | bonus |
//! |--------------|-------|
//! | < 2s         | 5     |
//! | < 4s         | 3     |
//! | <= 7s        | 1     |
//! | otherwise    | 0     |

/// Points for any correct answer
pub const BASE_POINTS: u32 = 10;

/// Speed bonus for an answer given after `elapsed_secs` seconds.
///
/// Negative or NaN input counts as an instant answer.
pub fn compute_bonus(elapsed_secs: f64) -> u32 {
    let secs = if elapsed_secs.is_nan() {
        0.0
    } else {
        elapsed_secs.max(0.0)
    };

    if secs < 2.0 {
        5
    } else if secs < 4.0 {
        3
    } else if secs <= 7.0 {
        1
    } else {
        0
    }
}

/// Points awarded for one answer
pub fn compute_points(is_correct: bool, elapsed_secs: f64) -> u32 {
    if !is_correct {
        return 0;
    }
    BASE_POINTS + compute_bonus(elapsed_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_tiers() {
        assert_eq!(compute_bonus(0.0), 5);
        assert_eq!(compute_bonus(1.9), 5);
        assert_eq!(compute_bonus(2.0), 3);
        assert_eq!(compute_bonus(3.9), 3);
        assert_eq!(compute_bonus(4.0), 1);
        assert_eq!(compute_bonus(7.0), 1);
        assert_eq!(compute_bonus(7.1), 0);
        assert_eq!(compute_bonus(120.0), 0);
    }

    #[test]
    fn test_bonus_degenerate_input() {
        assert_eq!(compute_bonus(-3.0), 5);
        assert_eq!(compute_bonus(f64::NAN), 5);
        assert_eq!(compute_bonus(f64::INFINITY), 0);
    }

    #[test]
    fn test_points() {
        assert_eq!(compute_points(false, 0.5), 0);
        assert_eq!(compute_points(true, 1.0), 15);
        assert_eq!(compute_points(true, 3.0), 13);
        assert_eq!(compute_points(true, 5.0), 11);
        assert_eq!(compute_points(true, 8.0), 10);
    }
}
