use stlamf_core::error::ParseError;
use stlamf_core::geom::Vec3;
use stlamf_core::mesh::{Mesh, MeshSource, Triangle};
use tracing::debug;

mod write;

pub use write::{write_ascii_stl, write_binary_stl};

const HEADER_SIZE: usize = 80;
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;
const RECORD_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

pub fn read_stl(source: MeshSource) -> Result<Mesh, ParseError> {
    let bytes = std::fs::read(&source.path).map_err(|e| ParseError::Io {
        path: source.path.clone(),
        source: e,
    })?;
    parse_stl(&bytes, source)
}

pub fn parse_stl(bytes: &[u8], source: MeshSource) -> Result<Mesh, ParseError> {
    let (format, triangles) = decode(bytes)?;
    debug!(
        path = ?source.path,
        ?format,
        triangles = triangles.len(),
        "decoded STL"
    );
    Mesh::new(source, triangles)
}

/// A `solid` prefix means ASCII first unless the file size matches the binary
/// layout exactly. If the first attempt fails or finds no facets, the other
/// encoding is tried. Other files of at least 84 bytes are binary only.
pub fn decode(bytes: &[u8]) -> Result<(StlFormat, Vec<Triangle>), ParseError> {
    let solid = starts_with_solid(bytes);
    if !solid && bytes.len() >= PREAMBLE_SIZE {
        return decode_binary(bytes).map(|t| (StlFormat::Binary, t));
    }

    let order = if solid && binary_size_matches(bytes) {
        [StlFormat::Binary, StlFormat::Ascii]
    } else {
        [StlFormat::Ascii, StlFormat::Binary]
    };

    let first_err = match attempt(order[0], bytes) {
        Ok(triangles) if !triangles.is_empty() => return Ok((order[0], triangles)),
        // A header that reads as an empty solid may still carry binary records.
        Ok(_) => {
            return match attempt(order[1], bytes) {
                Ok(triangles) if !triangles.is_empty() => Ok((order[1], triangles)),
                _ => Ok((order[0], Vec::new())),
            };
        }
        Err(e) => e,
    };
    debug!(format = ?order[0], error = %first_err, "STL decode attempt failed, trying the other encoding");
    let second_err = match attempt(order[1], bytes) {
        Ok(triangles) => return Ok((order[1], triangles)),
        Err(e) => e,
    };

    let (ascii, binary) = match order[0] {
        StlFormat::Ascii => (first_err, second_err),
        StlFormat::Binary => (second_err, first_err),
    };
    Err(ParseError::UnrecognizedFormat {
        ascii: Box::new(ascii),
        binary: Box::new(binary),
    })
}

fn attempt(format: StlFormat, bytes: &[u8]) -> Result<Vec<Triangle>, ParseError> {
    match format {
        StlFormat::Ascii => {
            let text = std::str::from_utf8(bytes).map_err(|e| ParseError::NotText {
                offset: e.valid_up_to(),
            })?;
            decode_ascii(text)
        }
        StlFormat::Binary => decode_binary(bytes),
    }
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let rest = &bytes[start..];
    if rest.len() < 5 || !rest[..5].eq_ignore_ascii_case(b"solid") {
        return false;
    }
    rest.get(5).map_or(true, |b| b.is_ascii_whitespace())
}

fn binary_size_matches(bytes: &[u8]) -> bool {
    if bytes.len() < PREAMBLE_SIZE {
        return false;
    }
    let declared = read_u32(bytes, HEADER_SIZE) as usize;
    declared > 0
        && declared
            .checked_mul(RECORD_SIZE)
            .and_then(|n| n.checked_add(PREAMBLE_SIZE))
            == Some(bytes.len())
}

pub fn decode_binary(bytes: &[u8]) -> Result<Vec<Triangle>, ParseError> {
    if bytes.len() < PREAMBLE_SIZE {
        return Err(ParseError::TruncatedHeader { len: bytes.len() });
    }

    let declared = read_u32(bytes, HEADER_SIZE);
    let available = (bytes.len() - PREAMBLE_SIZE) / RECORD_SIZE;
    let mut triangles = Vec::with_capacity((declared as usize).min(available));

    let mut offset = PREAMBLE_SIZE;
    for i in 0..declared {
        if offset + RECORD_SIZE > bytes.len() {
            return Err(ParseError::TruncatedFile {
                declared,
                complete: i,
                offset,
            });
        }

        let normal = read_vec3(bytes, offset);
        let mut corners = [Vec3::zero(); 3];
        for (k, corner) in corners.iter_mut().enumerate() {
            let at = offset + 12 + k * 12;
            let v = read_vec3(bytes, at);
            if !v.is_finite() {
                return Err(ParseError::NonFiniteCoordinate { offset: at });
            }
            *corner = v;
        }
        // Attribute byte count (2 bytes) is ignored.
        offset += RECORD_SIZE;

        let normal = if normal.is_finite() { normal } else { Vec3::zero() };
        let [a, b, c] = corners;
        triangles.push(Triangle::with_normal(a, b, c, normal));
    }

    if offset < bytes.len() {
        debug!(
            trailing = bytes.len() - offset,
            "ignoring bytes after the declared triangle records"
        );
    }
    Ok(triangles)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_vec3(bytes: &[u8], at: usize) -> Vec3 {
    Vec3::new(
        f64::from(read_f32(bytes, at)),
        f64::from(read_f32(bytes, at + 4)),
        f64::from(read_f32(bytes, at + 8)),
    )
}

pub fn decode_ascii(text: &str) -> Result<Vec<Triangle>, ParseError> {
    let mut tokens = Tokens::new(text);
    let mut triangles = Vec::new();
    let mut in_solid = false;

    match tokens.peek() {
        Some((_, tok)) if tok.eq_ignore_ascii_case("solid") => {}
        Some((line, tok)) => {
            return Err(malformed(line, format!("expected `solid`, found {tok:?}")));
        }
        None => return Err(malformed(1, "empty input".to_string())),
    }

    while let Some((line, tok)) = tokens.bump() {
        if tok.eq_ignore_ascii_case("solid") {
            if in_solid {
                return Err(malformed(line, "`solid` inside an open solid".to_string()));
            }
            tokens.skip_name(line);
            in_solid = true;
        } else if tok.eq_ignore_ascii_case("endsolid") {
            if !in_solid {
                return Err(malformed(line, "`endsolid` without `solid`".to_string()));
            }
            tokens.skip_name(line);
            in_solid = false;
        } else if tok.eq_ignore_ascii_case("facet") {
            if !in_solid {
                return Err(malformed(line, "`facet` outside of a solid".to_string()));
            }
            triangles.push(parse_facet(&mut tokens, line)?);
        } else {
            return Err(malformed(line, format!("unexpected token {tok:?}")));
        }
    }

    if in_solid {
        debug!("ASCII STL ended without `endsolid`");
    }
    Ok(triangles)
}

fn parse_facet(tokens: &mut Tokens<'_>, facet_line: usize) -> Result<Triangle, ParseError> {
    let mut normal = Vec3::zero();
    if tokens.next_is("normal") {
        tokens.bump();
        normal = parse_vec3(tokens)?;
    }

    tokens.expect("outer")?;
    tokens.expect("loop")?;

    let mut corners = Vec::with_capacity(3);
    while tokens.next_is("vertex") {
        let (line, _) = tokens.bump().unwrap_or((facet_line, ""));
        if corners.len() == 3 {
            return Err(malformed(line, "facet has more than 3 vertices".to_string()));
        }
        corners.push(parse_vec3(tokens)?);
    }
    if corners.len() != 3 {
        return Err(malformed(
            tokens.line(),
            format!("facet has {} vertices, expected 3", corners.len()),
        ));
    }

    tokens.expect("endloop")?;
    tokens.expect("endfacet")?;

    Ok(Triangle::with_normal(corners[0], corners[1], corners[2], normal))
}

fn parse_vec3(tokens: &mut Tokens<'_>) -> Result<Vec3, ParseError> {
    let x = parse_number(tokens)?;
    let y = parse_number(tokens)?;
    let z = parse_number(tokens)?;
    Ok(Vec3::new(x, y, z))
}

fn parse_number(tokens: &mut Tokens<'_>) -> Result<f64, ParseError> {
    let Some((line, tok)) = tokens.bump() else {
        return Err(malformed(tokens.line(), "unexpected end of input".to_string()));
    };
    let value: f64 = tok
        .parse()
        .map_err(|_| malformed(line, format!("invalid number {tok:?}")))?;
    if !value.is_finite() {
        return Err(malformed(line, format!("non-finite number {tok:?}")));
    }
    Ok(value)
}

fn malformed(line: usize, reason: String) -> ParseError {
    ParseError::MalformedFacet { line, reason }
}

struct Tokens<'a> {
    items: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, l)| l.split_whitespace().map(move |t| (i + 1, t)))
            .collect();
        Self { items, pos: 0 }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.items.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, &'a str)> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn next_is(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|(_, tok)| tok.eq_ignore_ascii_case(keyword))
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.items.last().copied())
            .map_or(1, |(line, _)| line)
    }

    fn skip_name(&mut self, line: usize) {
        while let Some((l, tok)) = self.peek() {
            let keyword = ["solid", "endsolid", "facet"]
                .iter()
                .any(|k| tok.eq_ignore_ascii_case(k));
            if l != line || keyword {
                break;
            }
            self.pos += 1;
        }
    }

    fn expect(&mut self, keyword: &str) -> Result<(), ParseError> {
        match self.bump() {
            Some((_, tok)) if tok.eq_ignore_ascii_case(keyword) => Ok(()),
            Some((line, tok)) => Err(malformed(
                line,
                format!("missing `{keyword}` (found {tok:?})"),
            )),
            None => Err(malformed(
                self.line(),
                format!("missing `{keyword}` (end of input)"),
            )),
        }
    }
}
