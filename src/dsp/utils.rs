/// Floor below which a level is treated as silence.
pub const DB_EPS: f32 = 1e-8;

pub fn db_to_gain(db: f32) -> f32 {
    (10.0f32).powf(db / 20.0)
}

/// One-pole smoothing step size for a time constant in milliseconds.
///
/// Used as `y += coeff * (x - y)`; reaches ~63% of a step after `ms`.
pub fn one_pole_coeff(ms: f32, sample_rate: f32) -> f32 {
    1.0 - (-1.0 / (ms * 0.001 * sample_rate)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_gain_points() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-12.0) - 0.251_188_6).abs() < 1e-5);
        assert!((db_to_gain(-24.0) - 0.063_095_7).abs() < 1e-6);
    }

    #[test]
    fn test_one_pole_coeff_time_constant() {
        let sr = 48000.0;
        let c = one_pole_coeff(2.0, sr);
        let mut y = 0.0f32;
        for _ in 0..96 {
            y += c * (1.0 - y);
        }
        assert!((y - 0.632).abs() < 0.01, "y {}", y);
    }
}
