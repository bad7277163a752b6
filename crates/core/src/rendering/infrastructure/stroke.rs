//! Anti-alias-free outline rasterization onto a [`Frame`].
//!
//! Strokes are centered on the geometric outline; a pixel is painted when
//! its center lies within `width / 2` of the outline.

use crate::shared::frame::Frame;

/// Axis-aligned square outline with top-left (`x`, `y`) and side `size`.
pub fn stroke_rect(frame: &mut Frame, x: f32, y: f32, size: f32, width: f32, color: [u8; 3]) {
    let half = width / 2.0;
    let (x0, y0, x1, y1) = (x, y, x + size, y + size);

    paint_where(frame, (x0 - half, y0 - half, x1 + half, y1 + half), color, |px, py| {
        let outer = px >= x0 - half && px <= x1 + half && py >= y0 - half && py <= y1 + half;
        let inner = px > x0 + half && px < x1 - half && py > y0 + half && py < y1 - half;
        outer && !inner
    });
}

/// Circle outline centered at (`cx`, `cy`).
pub fn stroke_circle(frame: &mut Frame, cx: f32, cy: f32, radius: f32, width: f32, color: [u8; 3]) {
    let half = width / 2.0;
    let reach = radius + half;

    paint_where(frame, (cx - reach, cy - reach, cx + reach, cy + reach), color, |px, py| {
        let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
        (dist - radius).abs() <= half
    });
}

/// Paints every pixel inside `bounds` whose center satisfies `inside`.
fn paint_where<F>(frame: &mut Frame, bounds: (f32, f32, f32, f32), color: [u8; 3], inside: F)
where
    F: Fn(f32, f32) -> bool,
{
    let (w, h) = (frame.width() as i64, frame.height() as i64);
    let col_start = (bounds.0.floor() as i64).max(0);
    let row_start = (bounds.1.floor() as i64).max(0);
    let col_end = (bounds.2.ceil() as i64).min(w - 1);
    let row_end = (bounds.3.ceil() as i64).min(h - 1);
    if col_start > col_end || row_start > row_end {
        return;
    }

    let mut pixels = frame.as_ndarray_mut();
    for row in row_start..=row_end {
        for col in col_start..=col_end {
            if inside(col as f32 + 0.5, row as f32 + 0.5) {
                for (ch, &value) in color.iter().enumerate() {
                    pixels[[row as usize, col as usize, ch]] = value;
                }
            }
        }
    }
}
