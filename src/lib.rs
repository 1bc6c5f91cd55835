//! Asset ingestion core for the Prism rendering framework, rewritten in Rust.
//!
//! The crate exposes the two data-transformation pipelines the framework
//! relies on: a text-based mesh decoder (OBJ-style, with vertex dedup and
//! quad triangulation) and a binary truecolor image codec (TGA-style, with
//! red/blue channel swapping).  Rendering and platform integration are
//! intentionally kept outside of the crate so that the code remains testable
//! and easy to embed in headless tools: the rendering layer consumes the
//! decoded buffers through their accessors and supplies the byte streams the
//! decoders parse.
//!
//! Both pipelines are synchronous and keep all parsing state local to one
//! call; a decode either replaces the caller's target buffer in full or
//! fails and leaves it untouched.

use std::ffi::OsStr;
use std::path::Path;

pub mod error;
pub mod mesh;
pub mod obj;
pub mod texture;
pub mod tga;

pub use error::{AssetError, Result};
pub use mesh::{Mesh, MeshContents};
pub use obj::{load_obj_from_str, read_mesh_from_file, write_mesh_to_file};
pub use texture::{Texture, TextureFormat, MAX_IMAGE_DIMENSION};
pub use tga::{
    decode_tga, encode_tga, read_texture_from_file, write_texture_to_file, TgaHeader,
    TGA_HEADER_SIZE,
};

/// Lower-cased file extension used for decoder dispatch; empty when the path
/// has none.
pub(crate) fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_extension_is_lower_cased() {
        assert_eq!(file_extension(Path::new("mesh.OBJ")), "obj");
        assert_eq!(file_extension(Path::new("dir.d/capture.tga")), "tga");
        assert_eq!(file_extension(Path::new("noext")), "");
    }
}
