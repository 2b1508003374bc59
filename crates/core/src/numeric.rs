//! Rounding applied to every reported average, distance and change.

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.666_666), 2.67);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(0.5), 0.5);
    }
}
