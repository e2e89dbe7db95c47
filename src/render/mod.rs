//! Icon rendering.
//!
//! Two renderers share one output type:
//! - [`IsometricCompositor`] fakes a cube or mob head from one texture with 2D skews
//! - [`ModelRenderer`] rasterizes the box elements of a resolved model
//!
//! [`RenderDispatcher`] picks between them and falls back in order.

pub mod camera;
pub mod canvas;
pub mod compositor;
pub mod dispatcher;
pub mod geometry;
pub mod model_renderer;
pub mod raster;
pub mod resources;

pub use camera::{CameraPreset, OrthoCamera};
pub use compositor::IsometricCompositor;
pub use dispatcher::{RenderDispatcher, RenderKind, RenderOutput, RenderPayload};
pub use model_renderer::ModelRenderer;
pub use resources::{ResourceKind, ResourceTracker};

use crate::error::{IconError, Result};
use crate::resource_pack::encode_png;
use image::RgbaImage;
use std::path::Path;

/// Largest edge, in pixels, of any canvas or raster surface.
pub const MAX_SURFACE_EDGE: u32 = 4096;

/// Reject empty surfaces and surfaces larger than [`MAX_SURFACE_EDGE`].
pub(crate) fn check_surface_edge(edge: u32) -> Result<()> {
    if edge == 0 || edge > MAX_SURFACE_EDGE {
        return Err(IconError::RenderFailure(format!(
            "surface edge {} outside 1..={}",
            edge, MAX_SURFACE_EDGE
        )));
    }
    Ok(())
}

/// Which technique produced an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStrategy {
    Head,
    Cube,
    Flat,
    /// 2D faces sized from a model's element bounds.
    ModelComposite,
    PipeModel,
    GenericModel,
}

impl RenderStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RenderStrategy::Head => "head",
            RenderStrategy::Cube => "cube",
            RenderStrategy::Flat => "flat",
            RenderStrategy::ModelComposite => "model-composite",
            RenderStrategy::PipeModel => "pipe-model",
            RenderStrategy::GenericModel => "generic-model",
        }
    }
}

impl From<CameraPreset> for RenderStrategy {
    fn from(preset: CameraPreset) -> Self {
        match preset {
            CameraPreset::Pipe => RenderStrategy::PipeModel,
            CameraPreset::Generic { .. } => RenderStrategy::GenericModel,
        }
    }
}

/// A rendered, PNG-encoded icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    pub strategy: RenderStrategy,
}

impl Icon {
    /// Encode a raster as an icon.
    pub fn from_image(image: &RgbaImage, strategy: RenderStrategy) -> Result<Self> {
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png: encode_png(image)?,
            strategy,
        })
    }

    /// Write the PNG bytes to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }
}
