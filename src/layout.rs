use nannou::geom::*;

use crate::diagram::Diagram;

/// Upper bound on the number of pixels per diagram unit, so small networks are not blown up.
const MAX_UNIT: f32 = 110.0;
/// The unit size at which node areas are drawn unscaled.
const REFERENCE_UNIT: f32 = 100.0;

/// Maps diagram units to window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// The window position of the diagram origin (the root valve).
    pub origin: Vec2,
    /// Pixels per diagram unit.
    pub unit: f32,
}

impl Layout {
    /// Fit the diagram into [area], leaving a margin of one unit on every side.
    pub fn fit(diagram: &Diagram, area: Rect) -> Self {
        let (min, max) = diagram.bounds().unwrap_or((Vec2::ZERO, Vec2::ZERO));

        let span = max - min + Vec2::splat(2.0);
        let unit = f32::min(area.w() / span.x, area.h() / span.y).min(MAX_UNIT);

        let center = (min + max) * 0.5;
        let origin = area.xy() - center * unit;

        Self { origin, unit }
    }

    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        self.origin + p * self.unit
    }

    pub fn to_diagram(&self, p: Vec2) -> Vec2 {
        (p - self.origin) / self.unit
    }

    /// Convert a node area into a drawing radius in pixels.
    pub fn node_radius(&self, size: f32) -> f32 {
        size.max(0.0).sqrt() * 0.5 * self.unit / REFERENCE_UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ValveNetwork;
    use approx::assert_relative_eq;

    fn diagram(num_layers: usize) -> Diagram {
        let mut network = ValveNetwork::new(1000.0, num_layers);
        network.process_flow();
        Diagram::new(&network)
    }

    #[test]
    fn fit_centers_diagram_in_area() {
        let area = Rect::from_x_y_w_h(100.0, 0.0, 800.0, 600.0);
        let layout = Layout::fit(&diagram(5), area);

        // Five layers plus the output row span 9 units wide and 5 units tall.
        assert_relative_eq!(layout.unit, f32::min(800.0 / 11.0, 600.0 / 7.0));

        let top = layout.to_screen(Vec2::ZERO);
        let bottom = layout.to_screen(Vec2::new(0.0, -5.0));
        assert_relative_eq!(top.x, 100.0);
        assert_relative_eq!((top.y + bottom.y) * 0.5, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn fit_caps_unit_for_small_networks() {
        let area = Rect::from_x_y_w_h(0.0, 0.0, 2000.0, 2000.0);
        let layout = Layout::fit(&diagram(1), area);

        assert_eq!(layout.unit, MAX_UNIT);
    }

    #[test]
    fn screen_and_diagram_coordinates_invert() {
        let layout = Layout {
            origin: Vec2::new(40.0, 200.0),
            unit: 80.0,
        };

        let p = Vec2::new(-1.5, -3.0);
        let back = layout.to_diagram(layout.to_screen(p));

        assert_relative_eq!(back.x, p.x);
        assert_relative_eq!(back.y, p.y);
    }

    #[test]
    fn node_radius_ignores_negative_sizes() {
        let layout = Layout {
            origin: Vec2::ZERO,
            unit: REFERENCE_UNIT,
        };

        assert_eq!(layout.node_radius(-50.0), 0.0);
        assert_relative_eq!(layout.node_radius(1600.0), 20.0);
    }
}
