// SPDX-License-Identifier: GPL-3.0-only

//! Tracking-runtime seam
//!
//! The renderer never talks to an AR SDK directly; it consumes a per-frame
//! coordinate transform through the [`DisplayTransform`] trait and image
//! views through [`CameraImage`]/[`DepthImage`]. A deterministic synthetic
//! implementation drives the demo binary and the tests.

mod synthetic;
mod types;

pub use synthetic::SyntheticTransform;
pub use types::{CameraImage, DepthImage, DisplayRotation, DisplayTransform, TargetSpace};
