use nannou::color::*;

/// Conversions from colorous scale samples into nannou colors.
pub trait ScaleColorExt {
    fn to_rgb(&self) -> Rgb<u8>;

    /// Convert to a translucent color, [alpha] in \[0.0, 1.0\].
    fn to_srgba(&self, alpha: f32) -> Srgba;
}

impl ScaleColorExt for colorous::Color {
    fn to_rgb(&self) -> Rgb<u8> {
        Rgb::from(self.as_tuple())
    }

    fn to_srgba(&self, alpha: f32) -> Srgba {
        let (r, g, b) = self.as_tuple();
        srgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, alpha)
    }
}
