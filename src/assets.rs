// SPDX-License-Identifier: GPL-3.0-only

//! Embedded shader and palette assets
//!
//! WGSL sources and the palette lookup strips ship inside the binary and are
//! looked up by name. A missing or undecodable asset indicates a packaging
//! defect; lookups return errors that callers propagate uncaught.
//!
//! Shader programs are composed by concatenating a define preamble with one
//! or more WGSL fragments, so a single occlusion source serves both
//! compile-time occlusion modes.

use crate::errors::{AssetError, RenderResult};
use rust_embed::RustEmbed;
use std::fmt::Write as _;

/// Asset bundle embedded at compile time
#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Shared depth-decoding WGSL fragment, concatenated into every shader that
/// reads the two-channel camera depth texture
pub const DEPTH_COMMON_WGSL: &str = "depth_common.wgsl";
/// Camera-feed background shader
pub const BACKGROUND_CAMERA_WGSL: &str = "background_camera.wgsl";
/// Depth-visualization background shader
pub const BACKGROUND_DEPTH_WGSL: &str = "background_depth.wgsl";
/// Virtual-scene compositing shader
pub const OCCLUSION_WGSL: &str = "occlusion.wgsl";

/// Load a WGSL source from the embedded bundle by name
pub fn load_shader_source(name: &str) -> RenderResult<String> {
    let file = Assets::get(name).ok_or_else(|| AssetError::NotFound(name.to_string()))?;
    let source = std::str::from_utf8(&file.data)
        .map_err(|_| AssetError::InvalidSource(name.to_string()))?;
    Ok(source.to_string())
}

/// Load and decode a palette strip from the embedded bundle by name
///
/// The strip is expected to be a single-row RGBA image; any decodable image
/// is accepted and converted.
pub fn load_palette_image(name: &str) -> RenderResult<image::RgbaImage> {
    let file = Assets::get(name).ok_or_else(|| AssetError::NotFound(name.to_string()))?;
    let decoded = image::load_from_memory(&file.data)
        .map_err(|e| AssetError::DecodeFailed(format!("{}: {}", name, e)))?;
    Ok(decoded.to_rgba8())
}

/// String-keyed compile-time shader defines
///
/// Rendered as a preamble of WGSL `const` declarations ahead of the shader
/// body, so the body can branch on them and let constant folding strip the
/// unused path.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    entries: Vec<(String, String)>,
}

impl ShaderDefines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.set(name, "bool", if value { "true" } else { "false" })
    }

    pub fn set_f32(&mut self, name: &str, value: f32) -> &mut Self {
        self.set(name, "f32", &format!("{:?}", value))
    }

    pub fn set_u32(&mut self, name: &str, value: u32) -> &mut Self {
        self.set(name, "u32", &format!("{}u", value))
    }

    fn set(&mut self, name: &str, ty: &str, value: &str) -> &mut Self {
        let decl = format!("const {}: {} = {};", name, ty, value);
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = decl;
        } else {
            self.entries.push((name.to_string(), decl));
        }
        self
    }

    /// Render the preamble block (empty string when no defines are set)
    pub fn preamble(&self) -> String {
        let mut out = String::new();
        for (_, decl) in &self.entries {
            let _ = writeln!(out, "{}", decl);
        }
        out
    }
}

/// Compose a shader from a define preamble and named WGSL fragments, in order
pub fn compose_shader(defines: &ShaderDefines, fragment_names: &[&str]) -> RenderResult<String> {
    let mut parts = Vec::with_capacity(fragment_names.len() + 1);
    let preamble = defines.preamble();
    if !preamble.is_empty() {
        parts.push(preamble);
    }
    for name in fragment_names {
        parts.push(load_shader_source(name)?);
    }
    Ok(parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_errors() {
        let err = load_shader_source("no_such_shader.wgsl").unwrap_err();
        assert!(err.to_string().contains("no_such_shader.wgsl"));
    }

    #[test]
    fn test_defines_preamble() {
        let mut defines = ShaderDefines::new();
        defines.set_bool("USE_OCCLUSION", true);
        defines.set_f32("MAX_DEPTH_MM", 4000.0);
        let preamble = defines.preamble();
        assert!(preamble.contains("const USE_OCCLUSION: bool = true;"));
        assert!(preamble.contains("const MAX_DEPTH_MM: f32 = 4000.0;"));
    }

    #[test]
    fn test_defines_overwrite() {
        let mut defines = ShaderDefines::new();
        defines.set_bool("USE_OCCLUSION", true);
        defines.set_bool("USE_OCCLUSION", false);
        assert_eq!(
            defines.preamble().matches("USE_OCCLUSION").count(),
            1,
            "redefining a key must replace the previous value"
        );
        assert!(defines.preamble().contains("= false;"));
    }

    #[test]
    fn test_compose_prepends_defines() {
        let mut defines = ShaderDefines::new();
        defines.set_u32("PALETTE_WIDTH", 256);
        let composed = compose_shader(&defines, &[DEPTH_COMMON_WGSL]).unwrap();
        assert!(composed.starts_with("const PALETTE_WIDTH: u32 = 256u;"));
        assert!(composed.contains("fn depth_sample_to_mm"));
    }
}
