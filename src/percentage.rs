/// Share of `numerator` in `denominator` as a whole-number percentage.
///
/// A zero, negative or non-finite denominator yields 0.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
        return 0.0;
    }
    round_half_up(numerator / denominator * 100.0, 0)
}

pub fn round_half_up(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places as i32);
    // f64::round rounds half away from zero, which is half-up for the
    // non-negative values this crate deals in.
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(3.0, f64::NAN), 0.0);
        assert_eq!(percentage(3.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percentage(1.0, 8.0), 13.0);
        assert_eq!(percentage(1.0, 3.0), 33.0);
        assert_eq!(percentage(2.0, 3.0), 67.0);
        assert_eq!(round_half_up(0.125, 2), 0.13);
        assert_eq!(round_half_up(1.004, 2), 1.0);
    }

    #[test]
    fn complementary_shares_stay_near_one_hundred() {
        for a in 0..25 {
            for b in 0..25 {
                let (a, b) = (a as f64 * 0.37, b as f64 * 0.91);
                if a + b == 0.0 {
                    continue;
                }
                let total = percentage(a, a + b) + percentage(b, a + b);
                assert!((total - 100.0).abs() <= 1.0, "{a} / {b} summed to {total}");
            }
        }
    }
}
