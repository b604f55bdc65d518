//! Shared PIE format definitions
//!
//! Format-level types and numeric conversion used by the export tools:
//! version handling, the TYPE flag register, and the fixed-precision
//! quantizers that produce PIE's textual number forms.

pub mod flags;
pub mod quantize;
pub mod version;

pub use flags::TypeFlags;
pub use quantize::{column_pad, connector_unit, vertex_unit, wrap_uv_texel, Dec, Fixed};
pub use version::{PieVersion, UnsupportedVersion};

/// Polygon kind marker for a textured face.
pub const POLY_TEXTURED: u32 = 200;

/// Polygon kind marker for a face carrying texture animation. The four
/// tex-anim fields (image count, rate, width, height) follow the vertex
/// indices.
pub const POLY_TEXANIM: u32 = 4200;
