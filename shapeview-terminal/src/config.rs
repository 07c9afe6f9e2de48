/// Terminal front-end settings: the engine section plus display options
use serde::{Deserialize, Serialize};
use shapeview_core::{EngineConfig, Error, ProjectionMode, Result};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub wireframe: bool,
    /// Width of a terminal cell divided by its height
    #[serde(default = "default_cell_aspect")]
    pub cell_aspect: f32,
    #[serde(default)]
    pub projection: ProjectionMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            wireframe: false,
            cell_aspect: default_cell_aspect(),
            projection: ProjectionMode::default(),
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_cell_aspect() -> f32 {
    0.5
}

impl TerminalConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.engine.validate()?;
        config.display.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Resource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::InvalidConfig("fps must be at least 1".to_string()));
        }
        if !self.cell_aspect.is_finite() || self.cell_aspect <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "cell_aspect must be positive, got {}",
                self.cell_aspect
            )));
        }
        Ok(())
    }
}
