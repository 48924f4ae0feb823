// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the background renderer

use std::fmt;

/// Result type alias using RenderError
pub type RenderResult<T> = Result<T, RenderError>;

/// Main renderer error type
#[derive(Debug, Clone)]
pub enum RenderError {
    /// Asset lookup or decoding errors
    Asset(AssetError),
    /// GPU adapter/device acquisition errors
    Gpu(String),
    /// Renderer options file errors
    Options(String),
    /// Generic error with message
    Other(String),
}

/// Embedded asset errors
#[derive(Debug, Clone)]
pub enum AssetError {
    /// Named asset is not present in the embedded bundle
    NotFound(String),
    /// Asset bytes are not valid UTF-8 shader source
    InvalidSource(String),
    /// Palette image could not be decoded
    DecodeFailed(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Asset(e) => write!(f, "Asset error: {}", e),
            RenderError::Gpu(msg) => write!(f, "GPU error: {}", msg),
            RenderError::Options(msg) => write!(f, "Options error: {}", msg),
            RenderError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(name) => write!(f, "asset not found in bundle: {}", name),
            AssetError::InvalidSource(name) => write!(f, "asset is not UTF-8 text: {}", name),
            AssetError::DecodeFailed(msg) => write!(f, "palette decode failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}
impl std::error::Error for AssetError {}

impl From<AssetError> for RenderError {
    fn from(err: AssetError) -> Self {
        RenderError::Asset(err)
    }
}

impl From<String> for RenderError {
    fn from(msg: String) -> Self {
        RenderError::Other(msg)
    }
}

impl From<&str> for RenderError {
    fn from(msg: &str) -> Self {
        RenderError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Options(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Options(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_display() {
        let err = RenderError::from(AssetError::NotFound("occlusion.wgsl".to_string()));
        assert_eq!(
            err.to_string(),
            "Asset error: asset not found in bundle: occlusion.wgsl"
        );
    }

    #[test]
    fn test_io_error_maps_to_options() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RenderError = io.into();
        assert!(matches!(err, RenderError::Options(_)));
    }
}
