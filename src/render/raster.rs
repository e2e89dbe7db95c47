//! Software rasterization of box meshes.

use super::camera::OrthoCamera;
use super::geometry::Mesh;
use super::check_surface_edge;
use crate::error::Result;
use crate::resource_pack::TextureData;
use glam::{Affine2, Vec2, Vec3};
use image::{Rgba, RgbaImage};
use std::rc::Rc;

/// Flat colour for faces whose texture failed to load.
pub const NEUTRAL_GREY: [u8; 4] = [0xcc, 0xcc, 0xcc, 0xff];

/// How one face is drawn. Lighting is a single white ambient light, so
/// colours are never shaded.
#[derive(Debug, Clone)]
pub enum Material {
    /// Nearest-neighbour textured.
    Textured {
        texture: Rc<TextureData>,
        uv_transform: Affine2,
        alpha_test: f32,
    },
    /// One flat colour.
    Solid([u8; 4]),
    /// Kept in the mesh but draws nothing.
    Invisible,
}

impl Material {
    fn shade(&self, uv: Vec2) -> Option<[u8; 4]> {
        match self {
            Material::Textured {
                texture,
                uv_transform,
                alpha_test,
            } => {
                let mapped = uv_transform.transform_point2(uv);
                // Texture space has v up; images are stored top-down
                let texel = texture.sample_nearest(mapped.x, 1.0 - mapped.y);
                (texel[3] as f32 / 255.0 > *alpha_test).then_some(texel)
            }
            Material::Solid(color) => Some(*color),
            Material::Invisible => None,
        }
    }
}

/// A colour buffer with a depth buffer.
#[derive(Debug)]
pub struct Surface {
    color: RgbaImage,
    depth: Vec<f32>,
}

impl Surface {
    /// A transparent surface. Edges must lie within
    /// [`MAX_SURFACE_EDGE`](super::MAX_SURFACE_EDGE).
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_surface_edge(width)?;
        check_surface_edge(height)?;
        Ok(Self {
            color: RgbaImage::new(width, height),
            depth: vec![f32::INFINITY; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.color
    }

    /// Draw a mesh; `materials` holds one entry per face group.
    pub fn draw_mesh(&mut self, mesh: &Mesh, materials: &[&Material], camera: &OrthoCamera) {
        for (group, material) in mesh.groups.iter().zip(materials) {
            if matches!(material, Material::Invisible) {
                continue;
            }
            if !camera.faces_camera(Vec3::from(group.direction.normal())) {
                continue;
            }

            let indices = &mesh.indices[group.start..group.start + group.count];
            for triangle in indices.chunks_exact(3) {
                let corners = [0, 1, 2].map(|i| {
                    let vertex = &mesh.vertices[triangle[i] as usize];
                    let ndc = camera.project(Vec3::from(vertex.position));
                    let screen = Vec2::new(
                        (ndc.x + 1.0) * 0.5 * self.width() as f32,
                        (1.0 - ndc.y) * 0.5 * self.height() as f32,
                    );
                    (screen, ndc.z, Vec2::from(vertex.uv))
                });
                self.fill_triangle(corners, material);
            }
        }
    }

    fn fill_triangle(&mut self, corners: [(Vec2, f32, Vec2); 3], material: &Material) {
        let [(p0, z0, uv0), (p1, z1, uv1), (p2, z2, uv2)] = corners;

        let area = edge(p0, p1, p2);
        if area.abs() < f32::EPSILON {
            return;
        }

        let (width, height) = (self.width() as i64, self.height() as i64);
        let min_x = (p0.x.min(p1.x).min(p2.x).floor() as i64).max(0);
        let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(width - 1);
        let min_y = (p0.y.min(p1.y).min(p2.y).floor() as i64).max(0);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(p1, p2, p) / area;
                let w1 = edge(p2, p0, p) / area;
                let w2 = edge(p0, p1, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * z0 + w1 * z1 + w2 * z2;
                let index = (y * width + x) as usize;
                if z >= self.depth[index] {
                    continue;
                }

                let uv = uv0 * w0 + uv1 * w1 + uv2 * w2;
                let Some(color) = material.shade(uv) else {
                    continue;
                };

                self.depth[index] = z;
                blend(self.color.get_pixel_mut(x as u32, y as u32), color, 1.0);
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Source-over blend of `src` scaled by `alpha` onto `dst`.
pub fn blend(dst: &mut Rgba<u8>, src: [u8; 4], alpha: f32) {
    let src_a = src[3] as f32 / 255.0 * alpha;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for channel in 0..3 {
        let s = src[channel] as f32 / 255.0;
        let d = dst[channel] as f32 / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        dst[channel] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera::CameraPreset;
    use crate::resource_pack::BoxElement;
    use indexmap::IndexMap;

    fn cube_mesh() -> Mesh {
        Mesh::from_element(&BoxElement {
            from: [0.0, 0.0, 0.0],
            to: [16.0, 16.0, 16.0],
            faces: IndexMap::new(),
        })
    }

    fn opaque_pixels(surface: &Surface) -> usize {
        surface.image().pixels().filter(|p| p[3] > 0).count()
    }

    #[test]
    fn test_blend_over_transparent() {
        let mut pixel = Rgba([0, 0, 0, 0]);
        blend(&mut pixel, [200, 100, 50, 255], 0.5);
        assert_eq!(pixel.0, [200, 100, 50, 128]);
    }

    #[test]
    fn test_blend_opaque_replaces() {
        let mut pixel = Rgba([10, 10, 10, 255]);
        blend(&mut pixel, [200, 100, 50, 255], 1.0);
        assert_eq!(pixel.0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_oversized_surface_is_rejected() {
        let err = Surface::new(65536, 65536).unwrap_err();
        assert!(matches!(err, crate::error::IconError::RenderFailure(_)));
        assert!(Surface::new(0, 16).is_err());
        assert!(Surface::new(16, crate::render::MAX_SURFACE_EDGE + 1).is_err());

        let surface = Surface::new(16, 4).unwrap();
        assert_eq!(surface.depth.len(), 64);
    }

    #[test]
    fn test_solid_cube_covers_centre() {
        let camera = OrthoCamera::from_preset(CameraPreset::Generic { wide: false });
        let mut surface = Surface::new(32, 32).unwrap();
        let red = Material::Solid([255, 0, 0, 255]);
        surface.draw_mesh(&cube_mesh(), &[&red; 6], &camera);

        assert_eq!(surface.image().get_pixel(16, 16).0, [255, 0, 0, 255]);
        // Corners of the view stay transparent
        assert_eq!(surface.image().get_pixel(0, 0).0[3], 0);
        assert!(opaque_pixels(&surface) > 200);
    }

    #[test]
    fn test_invisible_faces_draw_nothing() {
        let camera = OrthoCamera::from_preset(CameraPreset::Pipe);
        let mut surface = Surface::new(16, 16).unwrap();
        surface.draw_mesh(&cube_mesh(), &[&Material::Invisible; 6], &camera);
        assert_eq!(opaque_pixels(&surface), 0);
    }

    #[test]
    fn test_top_face_is_visible() {
        let camera = OrthoCamera::from_preset(CameraPreset::Generic { wide: false });
        let mut surface = Surface::new(32, 32).unwrap();

        let green = Material::Solid([0, 255, 0, 255]);
        let mut materials = [&Material::Invisible; 6];
        // BOX_ORDER index 2 is up
        materials[2] = &green;
        surface.draw_mesh(&cube_mesh(), &materials, &camera);

        // The top face lies in the upper half of the icon
        let upper = (0..16).any(|y| surface.image().get_pixel(16, y)[1] == 255);
        let lower = (24..32).any(|y| surface.image().get_pixel(16, y)[1] == 255);
        assert!(upper);
        assert!(!lower);
    }

    #[test]
    fn test_alpha_test_discards_transparent_texels() {
        let camera = OrthoCamera::from_preset(CameraPreset::Generic { wide: false });
        let mut surface = Surface::new(16, 16).unwrap();
        let clear = Material::Textured {
            texture: Rc::new(TextureData::solid(2, 2, [255, 255, 255, 10])),
            uv_transform: Affine2::IDENTITY,
            alpha_test: 0.1,
        };
        surface.draw_mesh(&cube_mesh(), &[&clear; 6], &camera);
        assert_eq!(opaque_pixels(&surface), 0);
    }
}
