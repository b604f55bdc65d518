//! pie-export library
//!
//! Provides scene-to-PIE conversion for use by other tools: an in-memory
//! scene graph, a TOML manifest loader that builds it, and the serializer
//! that walks the hierarchy and emits PIE text documents.

pub mod document;
pub mod hierarchy;
pub mod manifest;
pub mod mesh;
pub mod sampler;
pub mod scene;
pub mod writer;

// Re-export format-level types from pie-common
pub use pie_common::{PieVersion, TypeFlags, UnsupportedVersion};

// Re-export key types for scene conversion
pub use document::{emit_object, PieDocument};
pub use manifest::{build_all, build_scene, load_manifest, SceneManifest};
pub use scene::{EvalContext, FrameGuard, Scene};
