use std::io::{self, Write};
use stlamf_core::mesh::Mesh;

const BINARY_HEADER: &[u8] = b"stlamf binary STL";

pub fn write_binary_stl<W: Write>(mesh: &Mesh, mut sink: W) -> io::Result<()> {
    let mut header = [0u8; 80];
    header[..BINARY_HEADER.len()].copy_from_slice(BINARY_HEADER);
    sink.write_all(&header)?;

    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many triangles for binary STL"))?;
    sink.write_all(&count.to_le_bytes())?;

    for t in mesh.triangles() {
        let n = t.normal();
        for value in [n.x, n.y, n.z] {
            sink.write_all(&(value as f32).to_le_bytes())?;
        }
        for v in t.vertices {
            for value in [v.x, v.y, v.z] {
                sink.write_all(&(value as f32).to_le_bytes())?;
            }
        }
        sink.write_all(&0u16.to_le_bytes())?;
    }
    sink.flush()
}

pub fn write_ascii_stl<W: Write>(mesh: &Mesh, name: &str, mut sink: W) -> io::Result<()> {
    writeln!(sink, "solid {name}")?;
    for t in mesh.triangles() {
        let n = t.normal();
        writeln!(sink, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(sink, "    outer loop")?;
        for v in t.vertices {
            writeln!(sink, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(sink, "    endloop")?;
        writeln!(sink, "  endfacet")?;
    }
    writeln!(sink, "endsolid {name}")?;
    sink.flush()
}
