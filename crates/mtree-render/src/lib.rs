//! # mtree-render
//! Pure rendering: evolution state in, vector document and metadata
//! envelope out. Byte-identical output for identical inputs.

pub mod metadata;
pub mod svg;

pub use metadata::{metadata_json, token_uri};
pub use svg::{render_svg, MarkerGlyph};
