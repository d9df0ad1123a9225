//! Dimension arithmetic for thumbnails. No I/O.

use super::params::Anchor;

/// Scale `original` so its longer edge is at most `long_edge`.
///
/// Images already within the limit keep their size (never upscaled).
/// The shorter edge is rounded and never drops below 1px.
///
/// # Examples
/// ```
/// # use chiaki_site::imaging::calculate_fit_dimensions;
/// // 2400x1600 landscape into 1200 → 1200x800
/// assert_eq!(calculate_fit_dimensions((2400, 1600), 1200), (1200, 800));
///
/// // Small images are left alone
/// assert_eq!(calculate_fit_dimensions((640, 480), 1200), (640, 480));
/// ```
pub fn calculate_fit_dimensions(original: (u32, u32), long_edge: u32) -> (u32, u32) {
    let (w, h) = original;
    let longer = w.max(h);
    if longer <= long_edge || longer == 0 {
        return (w, h);
    }
    let ratio = long_edge as f64 / longer as f64;
    if w >= h {
        (long_edge, ((h as f64 * ratio).round() as u32).max(1))
    } else {
        (((w as f64 * ratio).round() as u32).max(1), long_edge)
    }
}

/// Edge of the square small thumbnail: `small`, but never larger than the
/// image's shorter side.
pub fn calculate_square_edge(original: (u32, u32), small: u32) -> u32 {
    small.min(original.0).min(original.1).max(1)
}

/// Size to resample `source` to so that it covers `target` completely.
///
/// Aspect ratio is preserved: one edge matches the target and the other
/// overflows, ready for [`calculate_crop_offset`].
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let scale = f64::max(
        target.0 as f64 / source.0.max(1) as f64,
        target.1 as f64 / source.1.max(1) as f64,
    );
    let w = (source.0 as f64 * scale).round() as u32;
    let h = (source.1 as f64 * scale).round() as u32;
    (w.max(target.0), h.max(target.1))
}

/// Top-left corner of a `target` crop inside a `filled` image.
///
/// Horizontal overflow is always split evenly. Vertical overflow is split
/// evenly for [`Anchor::Center`]; [`Anchor::Top`] trims it all from the bottom.
pub fn calculate_crop_offset(filled: (u32, u32), target: (u32, u32), anchor: Anchor) -> (u32, u32) {
    let x = filled.0.saturating_sub(target.0) / 2;
    let y = match anchor {
        Anchor::Top => 0,
        Anchor::Center => filled.1.saturating_sub(target.1) / 2,
    };
    (x, y)
}
