/// ASCII rasterizer for solid and wireframe scene rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::Scene;
use nalgebra::{Matrix4, Point3};
use std::io::Write;

use crate::camera::Camera;

/// Character luminosity ramp for solid shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character used for wireframe edge segments
const WIRE_CHAR: char = '#';

/// Depth bias so edges win over the faces they border
const WIRE_DEPTH_BIAS: f64 = 1e-3;

/// How much of the derived mesh data gets drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Solid,
    Wireframe,
    SolidWireframe,
}

impl RenderMode {
    pub fn cycle(self) -> Self {
        match self {
            Self::Solid => Self::Wireframe,
            Self::Wireframe => Self::SolidWireframe,
            Self::SolidWireframe => Self::Solid,
        }
    }

    pub fn draws_solid(self) -> bool {
        matches!(self, Self::Solid | Self::SolidWireframe)
    }

    pub fn draws_wireframe(self) -> bool {
        matches!(self, Self::Wireframe | Self::SolidWireframe)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Wireframe => "wireframe",
            Self::SolidWireframe => "solid + wireframe",
        }
    }
}

/// ASCII renderer that converts scene geometry to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f64>,
    char_buffer: Vec<char>,
    wire_buffer: Vec<bool>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f64::INFINITY; size],
            char_buffer: vec![' '; size],
            wire_buffer: vec![false; size],
        }
    }

    pub fn clear(&mut self) {
        for i in 0..self.depth_buffer.len() {
            self.depth_buffer[i] = f64::INFINITY;
            self.char_buffer[i] = ' ';
            self.wire_buffer[i] = false;
        }
    }

    /// Draw every mesh in the scene: solid polygons first, then wireframe
    /// edges biased toward the viewer so they stay visible on top.
    pub fn render_scene(
        &mut self,
        scene: &Scene,
        mode: RenderMode,
        model_matrix: &Matrix4<f64>,
        camera: &Camera,
    ) {
        for mesh in scene.meshes() {
            if mode.draws_solid() {
                for polygon in mesh.expand_faces() {
                    self.rasterize_polygon(&polygon, model_matrix, camera);
                }
            }
            if mode.draws_wireframe() {
                for (a, b) in mesh.edges() {
                    self.draw_edge(&a, &b, model_matrix, camera);
                }
            }
        }
    }

    fn rasterize_polygon(
        &mut self,
        polygon: &[Point3<f64>],
        model_matrix: &Matrix4<f64>,
        camera: &Camera,
    ) {
        if polygon.len() < 3 {
            return;
        }

        let mut screen_coords = Vec::with_capacity(polygon.len());
        for point in polygon {
            match camera.project_to_screen(
                point,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => screen_coords.push(coords),
                None => return, // Polygon is clipped
            }
        }

        // Shade from the world-space facet normal against the eye direction.
        let normal = facet_normal(&polygon[0], &polygon[1], &polygon[2]);
        let normal = model_matrix.transform_vector(&normal);
        let (view_dir, _) = camera.preset.eye_direction();
        let brightness = normal.dot(&view_dir).abs().min(1.0);

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f64) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        // Fan-split the polygon; faces are polygons of any size, not just
        // triangles.
        for k in 1..screen_coords.len() - 1 {
            self.rasterize_triangle(
                screen_coords[0],
                screen_coords[k],
                screen_coords[k + 1],
                character,
            );
        }
    }

    fn rasterize_triangle(
        &mut self,
        v0: (f64, f64, f64),
        v1: (f64, f64, f64),
        v2: (f64, f64, f64),
        character: char,
    ) {
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = f64::from(x) + 0.5;
                let py = f64::from(y) + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, false);
                    }
                }
            }
        }
    }

    fn draw_edge(
        &mut self,
        a: &Point3<f64>,
        b: &Point3<f64>,
        model_matrix: &Matrix4<f64>,
        camera: &Camera,
    ) {
        let (width, height) = (self.width as u32, self.height as u32);
        let Some(p0) = camera.project_to_screen(a, model_matrix, width, height) else {
            return;
        };
        let Some(p1) = camera.project_to_screen(b, model_matrix, width, height) else {
            return;
        };

        let dx = p1.0 - p0.0;
        let dy = p1.1 - p0.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        let count = steps as usize;

        for i in 0..=count {
            let t = i as f64 / steps;
            let x = (p0.0 + dx * t).round() as i32;
            let y = (p0.1 + dy * t).round() as i32;
            let depth = p0.2 + (p1.2 - p0.2) * t - WIRE_DEPTH_BIAS;
            self.plot(x, y, depth, WIRE_CHAR, true);
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f64, character: char, wire: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.wire_buffer[idx] = wire;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                let color = if self.wire_buffer[idx] {
                    Color::Blue
                } else {
                    match c {
                        ' ' | '.' | ':' => Color::DarkGrey,
                        '-' | '=' => Color::Grey,
                        '+' | '*' => Color::White,
                        '#' | '%' | '@' => Color::Cyan,
                        _ => Color::White,
                    }
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Count of cells holding something other than background.
    pub fn filled_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }
}

fn facet_normal(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> nalgebra::Vector3<f64> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > f64::EPSILON {
        n / len
    } else {
        nalgebra::Vector3::zeros()
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-12 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
