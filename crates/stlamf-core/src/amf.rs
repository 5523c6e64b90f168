use crate::document::{AmfObject, Constellation, Document, Material};
use crate::error::WriteError;
use crate::geom::Vec3;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Write;

type XmlResult = Result<(), quick_xml::Error>;

pub fn render(document: &Document) -> String {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    // A Vec sink never fails, so the markup is always complete.
    let _ = write_document(&mut writer, document);
    let mut out = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    out.push('\n');
    out
}

pub fn write_amf<W: Write>(document: &Document, mut sink: W) -> Result<(), WriteError> {
    sink.write_all(render(document).as_bytes())?;
    sink.flush()?;
    Ok(())
}

fn write_document<W: Write>(writer: &mut Writer<W>, document: &Document) -> XmlResult {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut amf = BytesStart::new("amf");
    amf.push_attribute(("unit", document.unit.as_str()));
    amf.push_attribute(("version", "1.1"));
    writer.write_event(Event::Start(amf))?;
    metadata(writer, "producer", &document.generator)?;

    for material in &document.materials {
        write_material(writer, material)?;
    }
    for object in &document.objects {
        write_object(writer, object)?;
    }
    if let Some(constellation) = &document.constellation {
        write_constellation(writer, constellation)?;
    }

    writer.write_event(Event::End(BytesEnd::new("amf")))
}

fn write_material<W: Write>(writer: &mut Writer<W>, material: &Material) -> XmlResult {
    let mut start = BytesStart::new("material");
    start.push_attribute(("id", material.id.to_string().as_str()));
    writer.write_event(Event::Start(start))?;
    metadata(writer, "name", &material.profile.name)?;
    for (key, value) in &material.profile.settings {
        metadata(writer, key, &value.to_string())?;
    }
    writer.write_event(Event::End(BytesEnd::new("material")))
}

fn write_object<W: Write>(writer: &mut Writer<W>, object: &AmfObject) -> XmlResult {
    let (vertices, triangles) = index_vertices(object);

    let mut start = BytesStart::new("object");
    start.push_attribute(("id", object.id.to_string().as_str()));
    writer.write_event(Event::Start(start))?;
    metadata(writer, "name", &object.name)?;
    writer.write_event(Event::Start(BytesStart::new("mesh")))?;

    writer.write_event(Event::Start(BytesStart::new("vertices")))?;
    for v in &vertices {
        writer.write_event(Event::Start(BytesStart::new("vertex")))?;
        writer.write_event(Event::Start(BytesStart::new("coordinates")))?;
        leaf(writer, "x", &coord(v.x))?;
        leaf(writer, "y", &coord(v.y))?;
        leaf(writer, "z", &coord(v.z))?;
        writer.write_event(Event::End(BytesEnd::new("coordinates")))?;
        writer.write_event(Event::End(BytesEnd::new("vertex")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("vertices")))?;

    let mut volume = BytesStart::new("volume");
    if let Some(id) = object.material_id {
        volume.push_attribute(("materialid", id.to_string().as_str()));
    }
    writer.write_event(Event::Start(volume))?;
    for [v1, v2, v3] in triangles {
        writer.write_event(Event::Start(BytesStart::new("triangle")))?;
        leaf(writer, "v1", &v1.to_string())?;
        leaf(writer, "v2", &v2.to_string())?;
        leaf(writer, "v3", &v3.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("triangle")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("volume")))?;

    writer.write_event(Event::End(BytesEnd::new("mesh")))?;
    writer.write_event(Event::End(BytesEnd::new("object")))
}

fn write_constellation<W: Write>(writer: &mut Writer<W>, constellation: &Constellation) -> XmlResult {
    let mut start = BytesStart::new("constellation");
    start.push_attribute(("id", constellation.id.to_string().as_str()));
    writer.write_event(Event::Start(start))?;
    for id in &constellation.object_ids {
        let mut instance = BytesStart::new("instance");
        instance.push_attribute(("objectid", id.to_string().as_str()));
        writer.write_event(Event::Start(instance))?;
        for tag in ["deltax", "deltay", "deltaz", "rx", "ry", "rz"] {
            leaf(writer, tag, "0")?;
        }
        writer.write_event(Event::End(BytesEnd::new("instance")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("constellation")))
}

fn metadata<W: Write>(writer: &mut Writer<W>, kind: &str, value: &str) -> XmlResult {
    let mut start = BytesStart::new("metadata");
    start.push_attribute(("type", kind));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))
}

fn leaf<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

/// Per-object vertex list, deduplicated on exact coordinate equality, plus
/// index triples in source winding order.
pub fn index_vertices(object: &AmfObject) -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let mesh = &object.mesh;
    let mut lookup: HashMap<[u64; 3], usize> = HashMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::with_capacity(mesh.triangle_count());

    for t in mesh.triangles() {
        let mut idx = [0usize; 3];
        for (slot, v) in idx.iter_mut().zip(t.vertices) {
            *slot = *lookup.entry(v.exact_key()).or_insert_with(|| {
                vertices.push(v);
                vertices.len() - 1
            });
        }
        triangles.push(idx);
    }
    (vertices, triangles)
}

fn coord(v: f64) -> String {
    // Shortest representation that parses back to the same f64.
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}
