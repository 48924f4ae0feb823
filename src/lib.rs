// SPDX-License-Identifier: GPL-3.0-only

//! ar-backdrop - background camera-feed rendering for augmented reality
//!
//! This library renders a live camera feed behind virtual content and
//! optionally composites the two with depth-based occlusion, the way an AR
//! sample application's background layer does.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`renderer`]: The background/occlusion renderer and its quad mesh,
//!   palette, and shader-program plumbing
//! - [`tracking`]: The tracking-runtime seam (display transform trait,
//!   image views) plus a deterministic synthetic implementation
//! - [`gpu`]: Device bootstrap and readback helpers
//! - [`assets`]: Embedded WGSL sources and palette strips
//! - [`config`]: Renderer startup options
//!
//! # Per-frame contract
//!
//! The hosting render loop calls, in order: geometry update, texture
//! updates, background draw, virtual-scene draw. All calls must happen on
//! the thread owning the GPU device.

pub mod assets;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gpu;
pub mod renderer;
pub mod tracking;

// Re-export commonly used types
pub use config::RendererOptions;
pub use constants::PaletteStyle;
pub use errors::{RenderError, RenderResult};
pub use renderer::{BackgroundKind, BackgroundRenderer, VirtualSceneFrame};
pub use tracking::{
    CameraImage, DepthImage, DisplayRotation, DisplayTransform, SyntheticTransform, TargetSpace,
};
