/// Engine configuration.
///
/// Loaded from TOML; every field has a default, so an empty file yields the
/// stock six-shape viewer.
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::math::Vec3;
use crate::mesh::MeshSurface;
use crate::parametric::ParametricSurface;
use crate::render::ResourceManager;
use crate::shapes::{Cone, KleinBottle, MobiusStrip, Sphere, Torus, TrefoilKnot};
use crate::surface::Surface;
use crate::{obj, stl};

/// One entry of the surface list, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceSpec {
    Cone { height: f32, radius: f32 },
    Sphere { radius: f32 },
    Torus { major_radius: f32, minor_radius: f32 },
    TrefoilKnot { scale: f32 },
    MobiusStrip { scale: f32 },
    KleinBottle { scale: f32 },
    /// Axis-aligned cube with edge length `size`
    Cube { size: f32 },
    /// Wavefront OBJ file, resolved against the resource directory
    Obj { file: String },
    /// STL file, resolved against the resource directory
    Stl { file: String },
}

impl SurfaceSpec {
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceSpec::Cone { .. } => "cone",
            SurfaceSpec::Sphere { .. } => "sphere",
            SurfaceSpec::Torus { .. } => "torus",
            SurfaceSpec::TrefoilKnot { .. } => "trefoil_knot",
            SurfaceSpec::MobiusStrip { .. } => "mobius_strip",
            SurfaceSpec::KleinBottle { .. } => "klein_bottle",
            SurfaceSpec::Cube { .. } => "cube",
            SurfaceSpec::Obj { .. } => "obj",
            SurfaceSpec::Stl { .. } => "stl",
        }
    }

    /// Create the surface, reading mesh files through `resources`
    pub fn build(&self, resources: &dyn ResourceManager) -> Result<Box<dyn Surface>> {
        let surface: Box<dyn Surface> = match *self {
            SurfaceSpec::Cone { height, radius } => Box::new(ParametricSurface::new(Cone { height, radius })),
            SurfaceSpec::Sphere { radius } => Box::new(ParametricSurface::new(Sphere { radius })),
            SurfaceSpec::Torus {
                major_radius,
                minor_radius,
            } => Box::new(ParametricSurface::new(Torus {
                major_radius,
                minor_radius,
            })),
            SurfaceSpec::TrefoilKnot { scale } => Box::new(ParametricSurface::new(TrefoilKnot { scale })),
            SurfaceSpec::MobiusStrip { scale } => Box::new(ParametricSurface::new(MobiusStrip { scale })),
            SurfaceSpec::KleinBottle { scale } => Box::new(ParametricSurface::new(KleinBottle { scale })),
            SurfaceSpec::Cube { size } => Box::new(MeshSurface::cube(size)),
            SurfaceSpec::Obj { ref file } => {
                let data = read_resource(resources, file)?;
                let text = String::from_utf8_lossy(&data);
                Box::new(obj::parse_obj(&text)?)
            }
            SurfaceSpec::Stl { ref file } => {
                let data = read_resource(resources, file)?;
                Box::new(stl::parse_stl(&data)?)
            }
        };
        debug!(
            kind = self.name(),
            vertices = surface.vertex_count(),
            triangles = surface.triangle_index_count() / 3,
            "built surface"
        );
        Ok(surface)
    }
}

fn read_resource(resources: &dyn ResourceManager, name: &str) -> Result<Vec<u8>> {
    let path = resources.resolve(name);
    std::fs::read(&path).map_err(|source| Error::Resource { path, source })
}

/// Colours of the four visual states, RGB in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Palette {
    #[serde(default = "default_button_color")]
    pub button: [f32; 3],
    #[serde(default = "default_white")]
    pub button_pressed: [f32; 3],
    #[serde(default = "default_white")]
    pub spinning: [f32; 3],
    #[serde(default = "default_idle_color")]
    pub idle: [f32; 3],
}

impl Palette {
    pub fn color(rgb: [f32; 3]) -> Vec3 {
        Vec3::from(rgb)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            button: default_button_color(),
            button_pressed: default_white(),
            spinning: default_white(),
            idle: default_idle_color(),
        }
    }
}

/// Construction-time settings of the interaction engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Length of the swap transition in seconds (default: 0.3)
    #[serde(default = "default_animation_duration")]
    pub animation_duration: f32,
    /// Index of the surface shown full-screen at start (default: 3)
    #[serde(default = "default_initial_surface")]
    pub initial_surface: usize,
    /// Button height divided by button width (default: 1.0)
    #[serde(default = "default_button_aspect")]
    pub button_aspect: f32,
    #[serde(default)]
    pub palette: Palette,
    /// Surfaces in slot order; one is shown, the rest become buttons
    #[serde(default = "default_surfaces")]
    pub surfaces: Vec<SurfaceSpec>,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), surfaces = config.surfaces.len(), "loaded engine config");
        Ok(config)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn button_count(&self) -> usize {
        self.surfaces.len().saturating_sub(1)
    }

    /// Reject settings the engine would refuse at construction
    pub fn validate(&self) -> Result<()> {
        if self.surfaces.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "need at least 2 surfaces, got {}",
                self.surfaces.len()
            )));
        }
        if self.initial_surface >= self.surfaces.len() {
            return Err(Error::InvalidConfig(format!(
                "initial_surface {} out of range for {} surfaces",
                self.initial_surface,
                self.surfaces.len()
            )));
        }
        if !self.animation_duration.is_finite() || self.animation_duration < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "animation_duration must be a non-negative number, got {}",
                self.animation_duration
            )));
        }
        if !self.button_aspect.is_finite() || self.button_aspect <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "button_aspect must be positive, got {}",
                self.button_aspect
            )));
        }
        Ok(())
    }

    pub fn build_surfaces(&self, resources: &dyn ResourceManager) -> Result<Vec<Box<dyn Surface>>> {
        let surfaces = self
            .surfaces
            .iter()
            .map(|spec| spec.build(resources))
            .collect::<Result<Vec<_>>>()?;
        info!(count = surfaces.len(), "built surfaces");
        Ok(surfaces)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animation_duration: default_animation_duration(),
            initial_surface: default_initial_surface(),
            button_aspect: default_button_aspect(),
            palette: Palette::default(),
            surfaces: default_surfaces(),
        }
    }
}

fn default_animation_duration() -> f32 {
    0.3
}
fn default_initial_surface() -> usize {
    3
}
fn default_button_aspect() -> f32 {
    1.0
}
fn default_button_color() -> [f32; 3] {
    [0.75, 0.75, 0.75]
}
fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_idle_color() -> [f32; 3] {
    [0.0, 1.0, 1.0]
}

fn default_surfaces() -> Vec<SurfaceSpec> {
    vec![
        SurfaceSpec::Cone {
            height: 3.0,
            radius: 1.0,
        },
        SurfaceSpec::Sphere { radius: 1.4 },
        SurfaceSpec::Torus {
            major_radius: 1.4,
            minor_radius: 0.3,
        },
        SurfaceSpec::TrefoilKnot { scale: 1.8 },
        SurfaceSpec::KleinBottle { scale: 0.2 },
        SurfaceSpec::MobiusStrip { scale: 1.0 },
    ]
}
