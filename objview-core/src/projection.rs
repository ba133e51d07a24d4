/// Camera and projection utilities
use crate::transform::Matrix4;
use crate::vector::Vector3;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering.
///
/// The camera only translates: `offset` is its position, moved by
/// keyboard input. The view matrix is the camera's own transform; it is
/// inverted when building the model-view-projection matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    pub offset: Vector3,
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            offset: Vector3::default(),
            fovy: 60.0,
            aspect: 1.0,
            near: 1.0,
            far: 10000.0,
            mode: ProjectionMode::Perspective,
        };
        camera.resize(width, height);
        camera
    }

    /// Track a new viewport size; a zero height is treated as 1
    pub fn resize(&mut self, width: u32, height: u32) {
        let height = height.max(1);
        self.aspect = width as f32 / height as f32;
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.offset += Vector3::new(dx, dy, dz);
    }

    /// The camera's transform in world space
    pub fn view_matrix(&self) -> Matrix4 {
        *Matrix4::identity().translate_by(self.offset)
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        let mut m = Matrix4::identity();
        match self.mode {
            ProjectionMode::Perspective => {
                m.perspective(self.fovy, self.aspect, self.near, self.far);
            }
            ProjectionMode::Orthographic => {
                m.orthographic(-self.aspect, self.aspect, -1.0, 1.0, -self.far, self.far);
            }
        }
        m
    }

    /// `projection * view^-1 * model`
    pub fn model_view_projection(&self, model: &Matrix4) -> Matrix4 {
        let model_view = self.view_matrix().inverse() * *model;
        self.projection_matrix() * model_view
    }

    /// Project a point to screen space using a precomputed model-view-projection matrix.
    ///
    /// Returns `(x, y, depth)` with `y` growing downward, or `None` when the
    /// point is behind the camera or outside the viewport.
    pub fn project_to_screen(
        &self,
        point: Vector3,
        mvp: &Matrix4,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = *mvp * point;

        // Prevent division by near-zero w values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Clip test
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
