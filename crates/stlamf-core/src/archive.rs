use crate::amf::render;
use crate::document::Document;
use crate::error::WriteError;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn write_zipped<W: Write + Seek>(
    document: &Document,
    sink: W,
    entry_name: &str,
) -> Result<(), WriteError> {
    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options)?;
    zip.write_all(render(document).as_bytes())?;
    let mut inner = zip.finish()?;
    inner.flush()?;
    Ok(())
}
