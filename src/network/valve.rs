/// The computed state of a single valve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValveData {
    pub input: f64,
    /// The share of the input routed by the valve percentage.
    pub output1: f64,
    /// The remainder of the input.
    pub output2: f64,
}

impl ValveData {
    pub fn new(input: f64, percent: f64) -> Self {
        let (output1, output2) = split(input, percent);

        Self {
            input,
            output1,
            output2,
        }
    }
}

/// Split [x] into two outputs, the first receiving [percent] of it. The percent is not clamped.
pub fn split(x: f64, percent: f64) -> (f64, f64) {
    let x1 = percent * x / 100.0;
    let x2 = x - x1;
    (x1, x2)
}
