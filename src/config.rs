// SPDX-License-Identifier: GPL-3.0-only

//! Renderer options handling
//!
//! Startup options for the renderer and the demo binary, loadable from a
//! JSON file. The hosting application owns mode changes at runtime; these
//! options only seed the initial state.

use crate::constants::PaletteStyle;
use crate::errors::RenderResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Synthetic frame-source parameters for the demo binary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSceneOptions {
    /// Camera image resolution
    pub camera_width: u32,
    pub camera_height: u32,
    /// Depth image resolution (typically lower than the camera image)
    pub depth_width: u32,
    pub depth_height: u32,
    /// EIS expansion margin applied to the background screen quad
    /// (0.0 = no expansion)
    pub eis_expansion: f32,
}

impl Default for SyntheticSceneOptions {
    fn default() -> Self {
        Self {
            camera_width: 640,
            camera_height: 480,
            depth_width: 160,
            depth_height: 120,
            eis_expansion: 0.05,
        }
    }
}

/// Renderer startup options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Render the depth image instead of the camera feed
    pub depth_visualization: bool,
    /// Composite virtual content behind real-world geometry
    pub occlusion: bool,
    /// Palette used by the depth visualization
    pub palette: PaletteStyle,
    /// Synthetic source parameters (demo binary only)
    pub synthetic: SyntheticSceneOptions,
}

impl RendererOptions {
    /// Load options from a JSON file
    pub fn load(path: &Path) -> RenderResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save options as pretty-printed JSON
    pub fn save(&self, path: &Path) -> RenderResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = RendererOptions::default();
        assert!(!options.depth_visualization);
        assert!(!options.occlusion);
        assert_eq!(options.palette, PaletteStyle::Turbo);
        assert_eq!(options.synthetic.camera_width, 640);
    }

    #[test]
    fn test_options_partial_json() {
        // Missing fields fall back to defaults
        let options: RendererOptions = serde_json::from_str(r#"{"occlusion": true}"#).unwrap();
        assert!(options.occlusion);
        assert!(!options.depth_visualization);
    }
}
