/// Collaborator contracts: the rendering backend and resource lookup
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::surface::Surface;
use crate::visual::Visual;

/// A backend that draws one surface per slot.
///
/// Slot `i` of every `render` call corresponds to `surfaces[i]` from
/// `initialize`.
pub trait RenderingEngine {
    /// Upload geometry. Called once before the first frame.
    fn initialize(&mut self, surfaces: &[Box<dyn Surface>]) -> Result<()>;

    fn render(&mut self, visuals: &[Visual]);
}

/// Locates files that surfaces are loaded from
pub trait ResourceManager {
    fn resource_path(&self) -> &Path;

    fn resolve(&self, name: &str) -> PathBuf {
        self.resource_path().join(name)
    }
}

/// Resources stored under a single directory
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceManager for DirectoryResources {
    fn resource_path(&self) -> &Path {
        &self.root
    }
}
