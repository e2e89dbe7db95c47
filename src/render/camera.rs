//! Fixed orthographic cameras for icon rendering.

use glam::{Mat4, Vec3};

/// Camera setup for one kind of model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPreset {
    /// Pipe-like models with few textures: tight view, 45° yaw, 30° pitch.
    Pipe,
    /// Everything else; the view widens for models with many textures.
    Generic { wide: bool },
}

impl CameraPreset {
    /// Pick the preset for a model with `distinct_textures` textures.
    pub fn for_texture_count(distinct_textures: usize, pipe_limit: usize) -> Self {
        if distinct_textures <= pipe_limit {
            CameraPreset::Pipe
        } else {
            CameraPreset::Generic {
                wide: distinct_textures > 2,
            }
        }
    }

    /// Half the width of the orthographic view volume.
    pub fn half_extent(&self) -> f32 {
        match self {
            CameraPreset::Pipe => 0.5,
            CameraPreset::Generic { wide: true } => 0.84,
            CameraPreset::Generic { wide: false } => 0.67,
        }
    }

    /// Camera position; it always looks at the origin.
    pub fn eye(&self) -> Vec3 {
        match self {
            CameraPreset::Pipe => {
                let distance = 2.5_f32;
                let (yaw, pitch) = (45.0_f32.to_radians(), 30.0_f32.to_radians());
                Vec3::new(
                    distance * yaw.sin() * pitch.cos(),
                    distance * pitch.sin(),
                    distance * yaw.cos() * pitch.cos(),
                )
            }
            CameraPreset::Generic { .. } => Vec3::new(1.5, 1.2, 1.5),
        }
    }

    /// Uniform scale applied to the whole model.
    pub fn model_scale(&self) -> f32 {
        match self {
            CameraPreset::Pipe => 0.8,
            CameraPreset::Generic { .. } => 1.0,
        }
    }

    /// Texels with alpha at or below this are discarded.
    pub fn alpha_test(&self) -> f32 {
        match self {
            CameraPreset::Pipe => 0.0,
            CameraPreset::Generic { .. } => 0.1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CameraPreset::Pipe => "pipe",
            CameraPreset::Generic { .. } => "generic",
        }
    }
}

/// An orthographic camera looking at the origin.
#[derive(Debug, Clone, Copy)]
pub struct OrthoCamera {
    pub eye: Vec3,
    view_projection: Mat4,
}

impl OrthoCamera {
    pub fn from_preset(preset: CameraPreset) -> Self {
        let eye = preset.eye();
        let extent = preset.half_extent();
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::orthographic_rh(-extent, extent, -extent, extent, 0.1, 100.0);
        let model = Mat4::from_scale(Vec3::splat(preset.model_scale()));
        Self {
            eye,
            view_projection: projection * view * model,
        }
    }

    /// Project a model-space point to normalized device coordinates.
    pub fn project(&self, point: Vec3) -> Vec3 {
        let clip = self.view_projection * point.extend(1.0);
        clip.truncate() / clip.w
    }

    /// Whether a face with this normal points towards the camera.
    pub fn faces_camera(&self, normal: Vec3) -> bool {
        normal.dot(self.eye) > 0.0
    }
}
