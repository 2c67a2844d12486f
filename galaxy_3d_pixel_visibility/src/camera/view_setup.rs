/// ViewSetup - camera snapshot for one rendered view.
///
/// The engine owns its cameras. For each view it renders it hands the
/// visibility cache a ViewSetup built from the view and projection
/// matrices; the eye position and basis vectors are derived once here.

use glam::{Mat4, Vec3, Vec4};

/// Clip-space w below which a point is treated as behind the eye
const BEHIND_EYE_W: f32 = 0.001;

/// Camera snapshot for one rendered view.
#[derive(Debug, Clone)]
pub struct ViewSetup {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection: Mat4,
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    viewport_height: f32,
}

impl ViewSetup {
    /// Build from a right-handed view matrix (camera looks down -Z) and a
    /// projection matrix.
    ///
    /// # Arguments
    ///
    /// * `view` - World to view transform
    /// * `projection` - Perspective or orthographic projection
    /// * `viewport_height` - Height of the render target in pixels
    pub fn new(view: Mat4, projection: Mat4, viewport_height: f32) -> Self {
        let camera_to_world = view.inverse();
        Self {
            view_matrix: view,
            projection_matrix: projection,
            view_projection: projection * view,
            origin: camera_to_world.w_axis.truncate(),
            forward: (-camera_to_world.z_axis.truncate()).normalize_or_zero(),
            right: camera_to_world.x_axis.truncate().normalize_or_zero(),
            up: camera_to_world.y_axis.truncate().normalize_or_zero(),
            viewport_height,
        }
    }

    /// Perspective view looking from `eye` toward `target`.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_radians: f32,
        aspect_ratio: f32,
        viewport_height: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, up);
        let projection = Mat4::perspective_rh(fov_y_radians, aspect_ratio, 0.1, 10_000.0);
        Self::new(view, projection, viewport_height)
    }

    // ===== GETTERS =====

    /// World to view transform.
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix.
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Eye position in world space.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit screen-right direction in world space.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit screen-up direction in world space.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Render target height in pixels.
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Set the render target height.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    /// On-screen diameter, in pixels, of a sphere at `center`.
    ///
    /// Projects the two points `center ± up * radius` and measures their
    /// vertical distance in normalized device coordinates.
    pub fn pixel_diameter_of_sphere(&self, center: Vec3, radius: f32) -> f32 {
        let top = self.view_projection * (center + self.up * radius).extend(1.0);
        let bottom = self.view_projection * (center - self.up * radius).extend(1.0);
        let dy = projected_y(bottom) - projected_y(top);
        // NDC y spans [-1, 1]: half the viewport per unit
        self.viewport_height * dy.abs() * 0.5
    }
}

fn projected_y(clip: Vec4) -> f32 {
    if clip.w >= BEHIND_EYE_W {
        clip.y / clip.w
    } else {
        clip.y * 1000.0
    }
}

#[cfg(test)]
#[path = "view_setup_tests.rs"]
mod tests;
