/// Camera, view presets, and screen projection for the terminal frontend
use meshview_core::Aabb;
use nalgebra::{Matrix4, Point3, Vector3};

/// Named view orientations, matching the viewer's toolbar of old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    /// Looking down the Z axis at the XY plane.
    Xy,
    /// Looking along the Y axis at the XZ plane.
    Xz,
    /// Looking along the X axis at the YZ plane.
    Yz,
    /// The default oblique view.
    Oblique,
}

impl ViewPreset {
    /// Unit direction from the target toward the eye, and the up vector.
    pub(crate) fn eye_direction(self) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            Self::Xy => (Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 0.0)),
            Self::Xz => (Vector3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
            Self::Yz => (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
            Self::Oblique => (
                Vector3::new(1.0, -1.0, 0.8).normalize(),
                Vector3::new(0.0, 0.0, 1.0),
            ),
        }
    }
}

/// Interactive rotation applied on top of the current preset (radians).
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));
        rz * ry * rx
    }
}

/// Perspective camera framed on the scene's bounding box.
pub struct Camera {
    pub target: Point3<f64>,
    pub distance: f64,
    pub preset: ViewPreset,
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    /// Frame the scene bounds inside a width x height cell viewport.
    ///
    /// Without bounds (empty scene) the camera falls back to a unit-sized
    /// framing of the origin.
    pub fn framing(bounds: Option<&Aabb>, width: u32, height: u32) -> Self {
        let (target, extent) = match bounds {
            Some(b) => (b.center(), b.max_extent().max(1e-9)),
            None => (Point3::origin(), 1.0),
        };
        let distance = extent * 2.5;
        Self {
            target,
            distance,
            preset: ViewPreset::Oblique,
            fov: std::f64::consts::PI / 4.0, // 45 degrees
            // Terminal cells are roughly twice as tall as they are wide.
            aspect: f64::from(width) / (f64::from(height) * 2.0),
            near: distance * 0.01,
            far: distance * 100.0,
        }
    }

    fn eye_and_up(&self) -> (Point3<f64>, Vector3<f64>) {
        let (direction, up) = self.preset.eye_direction();
        (self.target + direction * self.distance, up)
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        let (eye, up) = self.eye_and_up();
        Matrix4::look_at_rh(&eye, &self.target, &up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a point to cell coordinates plus a depth in [-1, 1].
    ///
    /// `None` when the point is behind the camera or outside the depth
    /// range; points off the sides are still returned so that line segments
    /// crossing the viewport edge can be clipped per cell.
    pub fn project_to_screen(
        &self,
        point: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        width: u32,
        height: u32,
    ) -> Option<(f64, f64, f64)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        if clip.w.abs() < 1e-9 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc_x = clip.x * inv_w;
        let ndc_y = clip.y * inv_w;
        let ndc_z = clip.z * inv_w;

        if !(-1.0..=1.0).contains(&ndc_z) {
            return None;
        }

        let screen_x = (ndc_x + 1.0) * 0.5 * f64::from(width);
        let screen_y = (1.0 - ndc_y) * 0.5 * f64::from(height);
        Some((screen_x, screen_y, ndc_z))
    }
}
