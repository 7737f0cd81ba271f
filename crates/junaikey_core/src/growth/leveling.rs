//! Experience curve shared by every leveled entity.
//!
//! # Invariants
//! - `exp_to_next_level` is the only threshold formula in the crate.
//! - After `apply_exp`, `exp < exp_to_next_level(level)` always holds.
//! - Level 0 is normalized to 1, so the rollover loop always terminates.

/// Experience needed to advance from `level` to `level + 1`:
/// `floor(100 * level^1.5)`.
///
/// Computed as `100 * level * sqrt(level)`: `sqrt` is correctly rounded, so
/// perfect squares land exactly on their integer value (`4 -> 800`).
pub fn exp_to_next_level(level: u32) -> u64 {
    let level = f64::from(level);
    // Non-negative and inside u64 range for any u32 level.
    (100.0 * level * level.sqrt()).floor() as u64
}

/// Result of applying an award to one `(level, exp)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub exp: u64,
    pub levels_gained: u32,
}

/// Adds `amount` to `exp` and rolls over as many levels as it covers.
pub fn apply_exp(level: u32, exp: u64, amount: u64) -> LevelProgress {
    let start_level = level.max(1);
    let mut level = start_level;
    let mut exp = exp.saturating_add(amount);

    loop {
        let threshold = exp_to_next_level(level);
        if exp < threshold || level == u32::MAX {
            break;
        }
        exp -= threshold;
        level += 1;
    }

    LevelProgress {
        level,
        exp,
        levels_gained: level - start_level,
    }
}

/// Restores the `(level, exp)` invariant on possibly stale persisted data.
pub fn normalize(level: u32, exp: u64) -> LevelProgress {
    apply_exp(level, exp, 0)
}

/// Fraction of the current level already earned, in `[0, 1)`.
pub fn progress_ratio(level: u32, exp: u64) -> f64 {
    let threshold = exp_to_next_level(level.max(1));
    if threshold == 0 {
        return 0.0;
    }
    (exp as f64 / threshold as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::{apply_exp, exp_to_next_level, normalize, progress_ratio};

    #[test]
    fn thresholds_follow_the_curve() {
        assert_eq!(exp_to_next_level(1), 100);
        assert_eq!(exp_to_next_level(2), 282);
        assert_eq!(exp_to_next_level(3), 519);
        assert_eq!(exp_to_next_level(4), 800);
        assert_eq!(exp_to_next_level(9), 2700);
        assert_eq!(exp_to_next_level(10), 3162);
        assert_eq!(exp_to_next_level(100), 100_000);
    }

    #[test]
    fn single_award_can_span_several_levels() {
        let progress = apply_exp(1, 0, 1000);
        assert_eq!(progress.level, 4);
        assert_eq!(progress.exp, 99);
        assert_eq!(progress.levels_gained, 3);
    }

    #[test]
    fn exact_threshold_levels_up_with_zero_remainder() {
        let progress = apply_exp(1, 40, 60);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.exp, 0);
    }

    #[test]
    fn small_award_stays_on_level() {
        let progress = apply_exp(3, 10, 5);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.exp, 15);
        assert_eq!(progress.levels_gained, 0);
    }

    #[test]
    fn normalize_repairs_level_zero_and_overflowing_exp() {
        let progress = normalize(0, 150);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.exp, 50);
    }

    #[test]
    fn invariant_holds_over_many_awards() {
        let mut level = 1;
        let mut exp = 0;
        for step in 0..500u64 {
            let amount = (step * 7919) % 3001;
            let progress = apply_exp(level, exp, amount);
            level = progress.level;
            exp = progress.exp;
            assert!(exp < exp_to_next_level(level), "step {step}: {level}/{exp}");
        }
        assert!(level > 1);
    }

    #[test]
    fn progress_ratio_is_fractional() {
        assert!((progress_ratio(1, 50) - 0.5).abs() < f64::EPSILON);
        assert_eq!(progress_ratio(1, 0), 0.0);
    }
}
