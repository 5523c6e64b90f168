use crate::amf::index_vertices;
use crate::document::{Document, Unit};
use crate::geom::BBox3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReport {
    pub id: u32,
    pub name: String,
    pub source: PathBuf,
    pub triangle_count: usize,
    pub vertex_count: usize,
    pub bounds: BBox3,
    pub material_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialReport {
    pub id: u32,
    pub profile: String,
    pub setting_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub unit: Unit,
    pub generator: String,
    pub objects: Vec<ObjectReport>,
    pub materials: Vec<MaterialReport>,
}

impl ConversionReport {
    pub fn from_document(document: &Document) -> Self {
        let objects = document
            .objects
            .iter()
            .map(|o| {
                let (vertices, _) = index_vertices(o);
                ObjectReport {
                    id: o.id,
                    name: o.name.clone(),
                    source: o.mesh.source().path.clone(),
                    triangle_count: o.mesh.triangle_count(),
                    vertex_count: vertices.len(),
                    bounds: o.mesh.bounds(),
                    material_id: o.material_id,
                }
            })
            .collect();
        let materials = document
            .materials
            .iter()
            .map(|m| MaterialReport {
                id: m.id,
                profile: m.profile.name.clone(),
                setting_count: m.profile.settings.len(),
            })
            .collect();
        Self {
            unit: document.unit,
            generator: document.generator.clone(),
            objects,
            materials,
        }
    }

    pub fn total_triangles(&self) -> usize {
        self.objects.iter().map(|o| o.triangle_count).sum()
    }
}
