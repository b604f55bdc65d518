//! Fixed-precision numeric conversion into PIE's textual number forms.
//!
//! PIE stores distances in 1/100 scene units and prints every number in the
//! shortest form the engine accepts: coordinates collapse to plain integers
//! when a rounded value sits close enough to one, UVs keep at least one
//! decimal digit (or wrap into 0-256 texel space for version 2), and
//! animation samples use dedicated fixed-point scales per channel.

use std::fmt;

/// Scene-unit to PIE-unit divisor for mesh vertex coordinates.
const VERTEX_DIVISOR: f64 = 0.01;

/// Integer-collapse tolerance for mesh and shadow vertex coordinates.
const VERTEX_SNAP: f64 = 0.000105;

/// Integer-collapse tolerance for connector positions.
const CONNECTOR_SNAP: f64 = 0.0001;

/// Fixed-point scale for sampled location components.
const LOCATION_SCALE: f64 = 100_000.0;

/// Radians to PIE angular units for sampled Euler components.
const ROTATION_SCALE: f64 = 57_295.755;

/// Snap tolerance for sampled scale components.
const SCALE_SNAP: f64 = 0.000149;

/// A quantized coordinate: collapsed to an integer, or kept as a 4-decimal
/// fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fixed {
    Int(i64),
    Frac(f64),
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Fixed::Int(v) => write!(f, "{v}"),
            Fixed::Frac(v) => {
                let mut s = format!("{v:.4}");
                trim_trailing_zeros(&mut s);
                f.write_str(&s)
            }
        }
    }
}

/// A decimal value that always prints with at least one fractional digit
/// ("1.0", never "1"), trimming the rest of the trailing zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dec {
    value: f64,
    places: usize,
}

impl Dec {
    pub fn new(value: f64, places: usize) -> Self {
        Self { value, places }
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = format!("{:.*}", self.places, self.value);
        while s.ends_with('0') && !s.ends_with(".0") {
            s.pop();
        }
        f.write_str(&s)
    }
}

fn trim_trailing_zeros(s: &mut String) {
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
}

fn round_to(x: f64, places: i32) -> f64 {
    let p = 10f64.powi(places);
    (x * p).round() / p
}

fn snap(v: f64, tolerance: f64) -> Fixed {
    let nearest = v.round();
    if (v - nearest).abs() <= tolerance {
        Fixed::Int(nearest as i64)
    } else {
        Fixed::Frac(v)
    }
}

/// Quantize a mesh or shadow vertex coordinate.
pub fn vertex_unit(x: f64) -> Fixed {
    snap(round_to(x / VERTEX_DIVISOR, 4), VERTEX_SNAP)
}

/// Quantize a connector position component. Connectors use a tighter
/// integer-collapse tolerance than vertex coordinates.
pub fn connector_unit(x: f64) -> Fixed {
    snap(round_to(x * 100.0, 4), CONNECTOR_SNAP)
}

/// Wrap a UV coordinate into the legacy 0-256 fixed-point texel space used
/// by version 2. The result is always an integer in [0, 256].
pub fn wrap_uv_texel(u: f64) -> i64 {
    let mut v = u * 256.0;
    while v < 0.0 {
        v += 256.0;
    }
    while v > 256.0 {
        v -= 256.0;
    }
    v.round() as i64
}

/// Round a corner UV for emission. The V axis is flipped as `1 - v` to
/// compensate for the vertical-axis convention mismatch with the engine.
pub fn uv_pair(u: f32, v: f32) -> (f64, f64) {
    let u6 = round_to(u as f64, 6);
    let v6 = round_to(v as f64, 6);
    (round_to(u6, 4), round_to(-v6 + 1.0, 4))
}

/// Quantize a sampled location component into fixed-point engine units.
pub fn anim_location(x: f64) -> i64 {
    (x * LOCATION_SCALE).round() as i64
}

/// Quantize a sampled Euler rotation component (radians) into PIE angular
/// units.
pub fn anim_rotation(x: f64) -> i64 {
    (x * ROTATION_SCALE).round() as i64
}

/// Quantize a sampled scale component: one decimal when the value is close
/// enough to that rounding, otherwise four.
pub fn anim_scale(x: f64) -> Dec {
    if (x - x.round()).abs() < SCALE_SNAP {
        Dec::new(round_to(x, 1), 1)
    } else {
        Dec::new(round_to(x, 4), 4)
    }
}

/// Left padding for one column of an animation sample line: the pad is
/// `|len - width|` spaces plus a fixed lead, so columns line up for the
/// field lengths the format expects.
pub fn column_pad(field: &str, width: usize, lead: usize) -> String {
    " ".repeat(field.len().abs_diff(width) + lead)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_unit_scales_by_hundred() {
        assert_eq!(vertex_unit(1.0), Fixed::Int(100));
        assert_eq!(vertex_unit(0.0), Fixed::Int(0));
        assert_eq!(vertex_unit(-0.25), Fixed::Int(-25));
    }

    #[test]
    fn vertex_unit_keeps_fractions() {
        let v = vertex_unit(0.012345);
        assert_eq!(v, Fixed::Frac(1.2345));
        assert_eq!(v.to_string(), "1.2345");
    }

    #[test]
    fn vertex_unit_collapses_near_integers() {
        // 100.0001 is within the 1.05e-4 vertex tolerance.
        assert_eq!(vertex_unit(1.000001), Fixed::Int(100));
    }

    #[test]
    fn connector_unit_scales_and_collapses() {
        assert_eq!(connector_unit(0.01), Fixed::Int(1));
        assert_eq!(connector_unit(0.012345).to_string(), "1.2345");
    }

    #[test]
    fn fixed_display_trims_zeros() {
        assert_eq!(Fixed::Frac(1.5).to_string(), "1.5");
        assert_eq!(Fixed::Frac(123.4567).to_string(), "123.4567");
        assert_eq!(Fixed::Int(-7).to_string(), "-7");
    }

    #[test]
    fn texel_wrap_stays_in_range() {
        for &u in &[-3.75, -1.0, -0.25, 0.0, 0.5, 1.0, 1.5, 2.0, 17.3] {
            let w = wrap_uv_texel(u);
            assert!((0..=256).contains(&w), "wrap({u}) = {w} out of range");
        }
    }

    #[test]
    fn texel_wrap_values() {
        assert_eq!(wrap_uv_texel(0.5), 128);
        assert_eq!(wrap_uv_texel(-0.25), 192);
        assert_eq!(wrap_uv_texel(1.5), 128);
        // 256 itself is in range and is not wrapped further.
        assert_eq!(wrap_uv_texel(1.0), 256);
        assert_eq!(wrap_uv_texel(2.0), 256);
    }

    #[test]
    fn uv_pair_flips_v() {
        assert_eq!(uv_pair(0.0, 0.0), (0.0, 1.0));
        assert_eq!(uv_pair(1.0, 1.0), (1.0, 0.0));
        assert_eq!(uv_pair(0.25, 0.75), (0.25, 0.25));
    }

    #[test]
    fn anim_location_fixed_point() {
        assert_eq!(anim_location(1.0), 100_000);
        assert_eq!(anim_location(-0.00001), -1);
    }

    #[test]
    fn anim_rotation_angular_units() {
        assert_eq!(anim_rotation(0.0), 0);
        assert_eq!(anim_rotation(std::f64::consts::PI), 180_000);
    }

    #[test]
    fn anim_scale_snaps_to_one_decimal() {
        assert_eq!(anim_scale(1.0).to_string(), "1.0");
        assert_eq!(anim_scale(1.00005).to_string(), "1.0");
        assert_eq!(anim_scale(0.9999).to_string(), "1.0");
        assert_eq!(anim_scale(1.2345).to_string(), "1.2345");
        assert_eq!(anim_scale(1.2).to_string(), "1.2");
    }

    #[test]
    fn column_pad_widths() {
        assert_eq!(column_pad("0", 3, 8).len(), 10);
        assert_eq!(column_pad("0", 8, 4).len(), 11);
        assert_eq!(column_pad("12345678", 8, 0).len(), 0);
        // Overlong fields still pad by the absolute difference.
        assert_eq!(column_pad("123456789", 8, 0).len(), 1);
    }
}
