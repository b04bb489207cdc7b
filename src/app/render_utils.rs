use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Uniform fit of the fixed logical viewport into the panel rect, centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ViewportFit {
    origin: Pos2,
    scale: f32,
}

impl ViewportFit {
    pub(super) fn new(rect: Rect, logical: Vec2) -> Self {
        let scale = (rect.width() / logical.x)
            .min(rect.height() / logical.y)
            .max(1e-3);
        Self {
            origin: rect.center() - logical * scale * 0.5,
            scale,
        }
    }

    pub(super) fn scale(&self) -> f32 {
        self.scale
    }

    pub(super) fn to_screen(&self, logical: Pos2) -> Pos2 {
        self.origin + logical.to_vec2() * self.scale
    }

    pub(super) fn to_logical(&self, screen: Pos2) -> Pos2 {
        ((screen - self.origin) / self.scale).to_pos2()
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Grid anchored at `origin` (screen position of world zero), so it moves
/// with pan and zoom.
pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 23, 42));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(71, 85, 105, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Filled disk shaded from `outer` at the rim to `inner` at the center.
pub(super) fn radial_disk(painter: &Painter, center: Pos2, radius: f32, inner: Color32, outer: Color32) {
    const BANDS: usize = 6;
    for band in 0..BANDS {
        let t = band as f32 / (BANDS - 1) as f32;
        let band_radius = radius * (1.0 - t * 0.7);
        painter.circle_filled(center, band_radius, blend_color(outer, inner, t));
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn fit_letterboxes_wide_rects() {
        let rect = Rect::from_min_size(pos2(100.0, 0.0), vec2(1600.0, 600.0));
        let fit = ViewportFit::new(rect, vec2(800.0, 600.0));

        assert_eq!(fit.scale(), 1.0);
        assert_eq!(fit.to_screen(pos2(0.0, 0.0)), pos2(500.0, 0.0));
        assert_eq!(fit.to_screen(pos2(400.0, 300.0)), rect.center());
    }

    #[test]
    fn fit_inverse_maps_back() {
        let rect = Rect::from_min_size(pos2(12.0, 40.0), vec2(500.0, 900.0));
        let fit = ViewportFit::new(rect, vec2(800.0, 600.0));
        let logical = pos2(123.0, 456.0);

        assert!((fit.to_logical(fit.to_screen(logical)) - logical).length() < 1e-3);
    }

    #[test]
    fn degenerate_rect_does_not_divide_by_zero() {
        let rect = Rect::from_min_size(pos2(10.0, 10.0), Vec2::ZERO);
        let fit = ViewportFit::new(rect, vec2(800.0, 600.0));
        let logical = fit.to_logical(pos2(10.0, 10.0));
        assert!(logical.x.is_finite() && logical.y.is_finite());
    }

    #[test]
    fn blend_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(a, b, 0.0), a);
        assert_eq!(blend_color(a, b, 1.0), b);
    }
}
