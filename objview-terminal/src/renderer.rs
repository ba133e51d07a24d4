/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use objview_core::{Camera, Material, Matrix4, Mesh, Vector3};
use std::io::Write;

use crate::backend::SoftwareBackend;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// ASCII renderer that draws uploaded meshes as terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Option<Color>>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![None; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(None);
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Draw every group of `mesh` from the buffers it uploaded to `backend`
    pub fn render_mesh(&mut self, mesh: &Mesh, backend: &SoftwareBackend, camera: &Camera, model: &Matrix4) {
        let Some(vertices) = mesh.vertex_buffer().and_then(|vbo| backend.vertices(vbo.id())) else {
            log::warn!("mesh has no vertex buffer to draw");
            return;
        };
        let num_verts = mesh.num_verts();
        if vertices.len() != 2 * num_verts {
            log::warn!("vertex buffer holds {} elements, expected {}", vertices.len(), 2 * num_verts);
            return;
        }
        let (positions, normals) = vertices.split_at(num_verts);

        let mvp = camera.model_view_projection(model);
        let rotation = model.untranslate();

        for group in mesh.groups() {
            let Some(indices) = group.index_buffer().and_then(|ibo| backend.indices(ibo.id())) else {
                continue;
            };
            let tint = tint(&group.material);
            for triangle in indices.chunks_exact(3) {
                let corners = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
                if corners.iter().any(|&i| i >= num_verts) {
                    continue;
                }
                let normal = corners
                    .iter()
                    .fold(Vector3::with_w(0.0, 0.0, 0.0, 0.0), |sum, &i| sum + normals[i]);
                self.render_triangle(
                    corners.map(|i| positions[i]),
                    Vector3::with_w(normal.x, normal.y, normal.z, 0.0),
                    &mvp,
                    &rotation,
                    camera,
                    tint,
                );
            }
        }
    }

    fn render_triangle(
        &mut self,
        corners: [Vector3; 3],
        normal: Vector3,
        mvp: &Matrix4,
        rotation: &Matrix4,
        camera: &Camera,
        tint: Option<Color>,
    ) {
        // Project vertices to screen space
        let mut screen_coords = Vec::with_capacity(3);
        for corner in corners {
            match camera.project_to_screen(corner, mvp, self.width as u32, self.height as u32) {
                Some(coords) => screen_coords.push(coords),
                None => return, // Triangle is clipped
            }
        }

        // Shade by the averaged vertex normal in world space
        let normal = (*rotation * normal).normalize();
        let light_dir = Vector3::new(0.0, 0.0, 1.0);
        let brightness = normal.dot(&light_dir).max(0.0);

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character, tint);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char, tint: Option<Color>) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    // Either winding counts; culling is left to the depth test
                    let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                    if inside {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = tint;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Material color if there is one, otherwise by intensity
                let color = self.color_buffer[idx].unwrap_or(match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                });

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Terminal color for a material's diffuse color; `None` for black/unset
fn tint(material: &Material) -> Option<Color> {
    let [r, g, b] = material.diffuse;
    if r <= 0.0 && g <= 0.0 && b <= 0.0 {
        return None;
    }
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Some(Color::Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    })
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
