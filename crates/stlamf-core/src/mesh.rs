use crate::error::ParseError;
use crate::geom::{BBox3, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a mesh came from: its position on the command line and its path.
///
/// Both parts form the identity used for profile lookup, so the same file can
/// be listed twice with different profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshSource {
    pub index: usize,
    pub path: PathBuf,
}

impl MeshSource {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("object{}", self.index))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
    pub normal: Option<Vec3>,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            vertices: [a, b, c],
            normal: None,
        }
    }

    pub fn with_normal(a: Vec3, b: Vec3, c: Vec3, normal: Vec3) -> Self {
        Self {
            vertices: [a, b, c],
            normal: (!normal.is_zero()).then_some(normal),
        }
    }

    pub fn normal(&self) -> Vec3 {
        if let Some(n) = self.normal {
            return n;
        }
        let [a, b, c] = self.vertices;
        b.sub(a).cross(c.sub(a)).normalized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    source: MeshSource,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(source: MeshSource, triangles: Vec<Triangle>) -> Result<Self, ParseError> {
        if triangles.is_empty() {
            return Err(ParseError::EmptyMesh);
        }
        Ok(Self { source, triangles })
    }

    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> BBox3 {
        let mut bbox = BBox3::empty();
        for t in &self.triangles {
            for v in t.vertices {
                bbox.include_point(v);
            }
        }
        bbox
    }
}
