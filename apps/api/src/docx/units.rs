//! Length conversions between typographic units and WordprocessingML units.
//!
//! Every point/centimetre conversion in the crate goes through this module so
//! rounding happens in exactly one place.
//!
//! - twips: twentieths of a point (paragraph spacing, indents, page geometry)
//! - half-points: run font sizes (`w:sz`)
//! - EMU: English Metric Units, 914400 per inch (DrawingML extents/offsets)

pub const TWIPS_PER_POINT: f32 = 20.0;
pub const TWIPS_PER_CM: f32 = 1440.0 / 2.54;
pub const EMU_PER_CM: i64 = 360_000;

/// Points → twips, rounded to the nearest whole twip.
pub fn pt_to_twips(pt: f32) -> i32 {
    (pt * TWIPS_PER_POINT).round() as i32
}

/// Points → half-points (`w:sz` / `w:szCs`).
pub fn pt_to_half_points(pt: f32) -> u32 {
    (pt * 2.0).round().max(0.0) as u32
}

/// Centimetres → twips.
pub fn cm_to_twips(cm: f32) -> i32 {
    (cm * TWIPS_PER_CM).round() as i32
}

/// Scales `height` so that a `width × height` box keeps its aspect ratio at `target_width`.
pub fn scale_to_width(width: u32, height: u32, target_width: i64) -> i64 {
    if width == 0 {
        return 0;
    }
    (target_width as f64 * height as f64 / width as f64).round() as i64
}
