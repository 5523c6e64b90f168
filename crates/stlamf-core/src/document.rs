use crate::error::BuildError;
use crate::mesh::Mesh;
use crate::profile::{Profile, ProfileAssignment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GENERATOR: &str = concat!("stlamf ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Millimeter,
    Inch,
    Feet,
    Meter,
    Micron,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Millimeter => "millimeter",
            Unit::Inch => "inch",
            Unit::Feet => "feet",
            Unit::Meter => "meter",
            Unit::Micron => "micron",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit {0:?} (expected millimeter, inch, feet, meter or micron)")]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "millimeter" | "mm" => Ok(Unit::Millimeter),
            "inch" | "in" => Ok(Unit::Inch),
            "feet" | "ft" => Ok(Unit::Feet),
            "meter" | "m" => Ok(Unit::Meter),
            "micron" | "um" => Ok(Unit::Micron),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: u32,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmfObject {
    pub id: u32,
    pub name: String,
    pub mesh: Mesh,
    pub material_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    pub id: u32,
    pub object_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub unit: Unit,
    pub generator: String,
    pub materials: Vec<Material>,
    pub objects: Vec<AmfObject>,
    pub constellation: Option<Constellation>,
}

impl Document {
    pub fn material(&self, id: u32) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    unit: Unit,
    generator: String,
    constellation: bool,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            unit: Unit::default(),
            generator: DEFAULT_GENERATOR.to_string(),
            constellation: false,
        }
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    pub fn constellation(mut self, enabled: bool) -> Self {
        self.constellation = enabled;
        self
    }

    /// Objects keep the order of `meshes`. Object ids run from 0; material and
    /// constellation ids continue from the same counter.
    pub fn build(
        &self,
        meshes: Vec<Mesh>,
        assignment: &ProfileAssignment,
    ) -> Result<Document, BuildError> {
        if meshes.is_empty() {
            return Err(BuildError::EmptyInput);
        }

        let mut ids = IdCounter::default();
        let object_ids: Vec<u32> = meshes.iter().map(|_| ids.alloc()).collect();

        let mut materials: Vec<Material> = Vec::new();
        let mut objects = Vec::with_capacity(meshes.len());
        for (mesh, id) in meshes.into_iter().zip(object_ids.iter().copied()) {
            let material_id = match assignment.profile_for(mesh.source()) {
                None => None,
                Some(profile) => {
                    match materials.iter().find(|m| m.profile.name == profile.name) {
                        Some(existing) => Some(existing.id),
                        None => {
                            let material = Material {
                                id: ids.alloc(),
                                profile: profile.clone(),
                            };
                            debug!(profile = %profile.name, id = material.id, "registered material");
                            let id = material.id;
                            materials.push(material);
                            Some(id)
                        }
                    }
                }
            };
            objects.push(AmfObject {
                id,
                name: mesh.source().display_name(),
                mesh,
                material_id,
            });
        }

        let constellation = self.constellation.then(|| Constellation {
            id: ids.alloc(),
            object_ids,
        });

        Ok(Document {
            unit: self.unit,
            generator: self.generator.clone(),
            materials,
            objects,
            constellation,
        })
    }
}

pub fn build(
    meshes: Vec<Mesh>,
    assignment: &ProfileAssignment,
    unit: Unit,
) -> Result<Document, BuildError> {
    DocumentBuilder::new().unit(unit).build(meshes, assignment)
}

#[derive(Debug, Default)]
struct IdCounter {
    next: u32,
}

impl IdCounter {
    fn alloc(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}
