use nannou::math::*;

pub mod ext;
pub use ext::*;

/// Clamp [n] into the range \[0.0, 1.0\].
pub fn saturate(n: f64) -> f64 {
    n.clamp(0.0, 1.0)
}

pub fn map_clamp(val: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    map_range(val, in_min, in_max, out_min, out_max).clamp(out_min, out_max)
}

/// Step [value] by [delta] and keep the result within \[min, max\].
pub fn step_clamp(value: f64, delta: f64, min: f64, max: f64) -> f64 {
    (value + delta).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_clamps_to_unit_range() {
        assert_eq!(saturate(-0.5), 0.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(4.0), 1.0);
    }

    #[test]
    fn map_clamp_stays_in_output_range() {
        assert_eq!(map_clamp(5.0, 0.0, 10.0, 0.0, 1.0), 0.5);
        assert_eq!(map_clamp(20.0, 0.0, 10.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn step_clamp_bounds_result() {
        assert_eq!(step_clamp(95.0, 5.0, 0.0, 100.0), 100.0);
        assert_eq!(step_clamp(100.0, 5.0, 0.0, 100.0), 100.0);
        assert_eq!(step_clamp(0.0, -5.0, 0.0, 100.0), 0.0);
    }
}
