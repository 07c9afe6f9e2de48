/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point3;
use shapeview_core::{Camera, ProjectionMode, RenderingEngine, Result, Surface, Transform, Vec3, VertexFlags, Visual};
use std::io::Write;
use tracing::{info, warn};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Ambient share of the shading, so faces turned away stay visible
const AMBIENT: f32 = 0.2;

/// Geometry of one slot, uploaded once
struct SurfaceBuffers {
    positions: Vec<Point3<f32>>,
    normals: Vec<Vec3>,
    triangles: Vec<u32>,
    lines: Vec<u32>,
}

impl SurfaceBuffers {
    fn upload(surface: &dyn Surface) -> Self {
        let flags = VertexFlags::NORMALS;
        let vertices = surface.generate_vertices(flags);
        let (positions, normals) = vertices
            .chunks_exact(flags.floats_per_vertex())
            .map(|v| (Point3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5])))
            .unzip();

        Self {
            positions,
            normals,
            triangles: surface.generate_triangle_indices(),
            lines: surface.generate_line_indices(),
        }
    }
}

/// A projected vertex in screen cells, plus its depth
#[derive(Clone, Copy)]
struct ScreenPoint {
    x: f32,
    y: f32,
    depth: f32,
}

/// Screen rectangle in cells: left, top, right (exclusive), bottom (exclusive)
#[derive(Clone, Copy)]
struct Rect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

/// ASCII renderer that draws every visual into its own viewport of the
/// character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    cell_aspect: f32,
    projection: ProjectionMode,
    wireframe: bool,
    light: Vec3,
    surfaces: Vec<SurfaceBuffers>,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Vec3>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, cell_aspect: f32, projection: ProjectionMode) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            cell_aspect,
            projection,
            wireframe: false,
            light: Vec3::new(0.25, 0.25, 1.0).normalize(),
            surfaces: Vec::new(),
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Vec3::zeros(); size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Vec3::zeros(); size];
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Vec3::zeros());
    }

    /// Character at column `x`, row `y`
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// The character grid as text rows
    pub fn rows(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    fn render_visual(&mut self, slot: usize, visual: &Visual) {
        let size = visual.viewport_size;
        if size.x <= 0 || size.y <= 0 {
            return;
        }
        // Viewports are y-up from the bottom edge; rows grow downwards
        let rect = Rect {
            left: visual.lower_left.x,
            top: self.height as i32 - (visual.lower_left.y + size.y),
            right: visual.lower_left.x + size.x,
            bottom: self.height as i32 - visual.lower_left.y,
        };

        let camera = Camera::for_viewport(size, self.cell_aspect, self.projection);
        let model_view = Transform::model_view(&visual.orientation);
        let buffers = &self.surfaces[slot];

        let projected: Vec<Option<ScreenPoint>> = buffers
            .positions
            .iter()
            .map(|p| {
                camera.project(p, &model_view, size).map(|v| ScreenPoint {
                    x: v.x + rect.left as f32,
                    y: v.y + rect.top as f32,
                    depth: v.z,
                })
            })
            .collect();

        if self.wireframe {
            let lines = buffers.lines.clone();
            for pair in lines.chunks_exact(2) {
                if let (Some(a), Some(b)) = (projected[pair[0] as usize], projected[pair[1] as usize]) {
                    self.rasterize_line(a, b, rect, visual.color);
                }
            }
            return;
        }

        let mut faces = Vec::with_capacity(buffers.triangles.len() / 3);
        for tri in buffers.triangles.chunks_exact(3) {
            let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(a), Some(b), Some(c)) = (projected[corners[0]], projected[corners[1]], projected[corners[2]])
            else {
                continue;
            };
            let normal = corners.iter().map(|&i| buffers.normals[i]).sum::<Vec3>();
            let normal = visual.orientation.rotate_vector(&normal);
            // Two-sided lighting: open surfaces show their inside
            let brightness = match normal.try_normalize(1e-6) {
                Some(n) => n.dot(&self.light).abs(),
                None => 0.0,
            };
            faces.push(([a, b, c], brightness));
        }

        for (corners, brightness) in faces {
            let index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
            let character = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];
            let color = visual.color * (AMBIENT + (1.0 - AMBIENT) * brightness);
            self.rasterize_triangle(corners, rect, character, color);
        }
    }

    fn clip(&self, rect: Rect) -> Rect {
        Rect {
            left: rect.left.max(0),
            top: rect.top.max(0),
            right: rect.right.min(self.width as i32),
            bottom: rect.bottom.min(self.height as i32),
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Vec3) {
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    fn rasterize_triangle(&mut self, coords: [ScreenPoint; 3], rect: Rect, character: char, color: Vec3) {
        let [v0, v1, v2] = coords;
        let bounds = self.clip(rect);

        // Bounding box, clipped to the viewport
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(bounds.left);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(bounds.right - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(bounds.top);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(bounds.bottom - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    /// Bresenham between two projected endpoints, with interpolated depth
    fn rasterize_line(&mut self, a: ScreenPoint, b: ScreenPoint, rect: Rect, color: Vec3) {
        let bounds = self.clip(rect);
        let (x0, y0) = (a.x.floor() as i32, a.y.floor() as i32);
        let (x1, y1) = (b.x.floor() as i32, b.y.floor() as i32);
        let character = line_char(x1 - x0, y1 - y0);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;

        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        let mut step = 0.0;
        loop {
            if x >= bounds.left && x < bounds.right && y >= bounds.top && y < bounds.bottom {
                let depth = a.depth + (b.depth - a.depth) * (step / steps);
                self.plot(x, y, depth, character, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    /// Write the frame, one terminal row at a time
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];
                if c != ' ' {
                    let color = to_terminal_color(&self.color_buffer[idx]);
                    if current != Some(color) {
                        writer.queue(SetForegroundColor(color))?;
                        current = Some(color);
                    }
                }
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderingEngine for AsciiRenderer {
    fn initialize(&mut self, surfaces: &[Box<dyn Surface>]) -> Result<()> {
        self.surfaces = surfaces.iter().map(|s| SurfaceBuffers::upload(s.as_ref())).collect();
        info!(
            surfaces = self.surfaces.len(),
            triangles = self.surfaces.iter().map(|s| s.triangles.len() / 3).sum::<usize>(),
            "uploaded geometry"
        );
        Ok(())
    }

    fn render(&mut self, visuals: &[Visual]) {
        self.clear();
        if visuals.len() > self.surfaces.len() {
            warn!(
                visuals = visuals.len(),
                surfaces = self.surfaces.len(),
                "more visuals than uploaded surfaces"
            );
        }
        for (slot, visual) in visuals.iter().enumerate().take(self.surfaces.len()) {
            self.render_visual(slot, visual);
        }
    }
}

fn to_terminal_color(color: &Vec3) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color.x),
        g: channel(color.y),
        b: channel(color.z),
    }
}

fn line_char(dx: i32, dy: i32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay * 2 < ax {
        '-'
    } else if ax * 2 < ay {
        '|'
    } else if (dx > 0) == (dy > 0) {
        // Rows grow downwards
        '\\'
    } else {
        '/'
    }
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
