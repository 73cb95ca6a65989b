//! PLY header and body parsing.

use std::path::Path;

use gridtrace_geom::Triangle;
use gridtrace_math::{Point3, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{PlyError, Result};

/// How mesh coordinates are mapped into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshPlacement {
    /// Map the mesh bounding box onto the unit cube first, per axis.
    pub normalize: bool,
    /// Uniform scale applied after normalization.
    pub scale: f64,
    /// Offset added last.
    pub translate: Vec3,
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            normalize: false,
            scale: 1.0,
            translate: Vec3::zeros(),
        }
    }
}

/// Read triangles from a PLY file on disk.
pub fn read_ply(path: impl AsRef<Path>, placement: &MeshPlacement) -> Result<Vec<Triangle>> {
    let text = std::fs::read_to_string(path)?;
    read_ply_from_str(&text, placement)
}

/// Read triangles from PLY text.
pub fn read_ply_from_str(text: &str, placement: &MeshPlacement) -> Result<Vec<Triangle>> {
    let mut lines = text.lines().enumerate().map(|(n, l)| (n + 1, l.trim()));
    let header = parse_header(&mut lines)?;

    let mut vertices: Vec<Point3> = Vec::new();
    let mut faces: Vec<(usize, Vec<usize>)> = Vec::new();

    for element in &header.elements {
        let role = header.role(element);
        for _ in 0..element.count {
            let (line_no, line) = next_data_line(&mut lines)?;
            let values = parse_row(line_no, line, &element.properties)?;
            match role {
                Role::Vertex([x, y, z]) => {
                    vertices.push(Point3::new(values[x].scalar(), values[y].scalar(), values[z].scalar()));
                }
                Role::Face(list) => faces.push((line_no, indices(line_no, &values[list])?)),
                Role::Other => {}
            }
        }
    }

    place(&mut vertices, placement);

    let mut triangles = Vec::with_capacity(faces.len());
    for (face, (line_no, ids)) in faces.iter().enumerate() {
        if ids.len() < 3 {
            warn!("PLY line {line_no}: skipping face with {} vertices", ids.len());
            continue;
        }
        let corner = |index: usize| -> Result<Point3> {
            vertices.get(index).copied().ok_or(PlyError::IndexOutOfRange {
                face,
                index,
                vertices: vertices.len(),
            })
        };
        let apex = corner(ids[0])?;
        for pair in ids[1..].windows(2) {
            triangles.push(Triangle::new(apex, corner(pair[0])?, corner(pair[1])?));
        }
    }

    debug!(
        "read {} triangles from {} vertices and {} faces",
        triangles.len(),
        vertices.len(),
        faces.len()
    );
    Ok(triangles)
}

#[derive(Debug, Clone, PartialEq)]
enum Property {
    Scalar(String),
    List(String),
}

impl Property {
    fn name(&self) -> &str {
        match self {
            Property::Scalar(name) | Property::List(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug)]
struct Header {
    elements: Vec<Element>,
}

/// What the reader does with an element's rows.
#[derive(Debug, Clone, Copy)]
enum Role {
    /// Property positions of x, y and z.
    Vertex([usize; 3]),
    /// Position of the vertex index list.
    Face(usize),
    Other,
}

impl Header {
    fn role(&self, element: &Element) -> Role {
        let position = |name: &str| element.properties.iter().position(|p| p.name() == name);
        match element.name.as_str() {
            "vertex" => match (position("x"), position("y"), position("z")) {
                (Some(x), Some(y), Some(z)) => Role::Vertex([x, y, z]),
                _ => Role::Other,
            },
            "face" => element
                .properties
                .iter()
                .position(|p| matches!(p, Property::List(_)))
                .map_or(Role::Other, Role::Face),
            _ => Role::Other,
        }
    }
}

fn parse_header<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> Result<Header> {
    match lines.next() {
        Some((_, "ply")) => {}
        Some((n, _)) => return Err(PlyError::header(n, "file does not start with 'ply'")),
        None => return Err(PlyError::header(1, "empty file")),
    }

    let mut elements: Vec<Element> = Vec::new();
    let mut saw_format = false;
    for (n, line) in lines.by_ref() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            None | Some("comment") | Some("obj_info") => {}
            Some("format") => {
                match tokens.next() {
                    Some("ascii") => {}
                    Some(other) => return Err(PlyError::Unsupported(format!("{other} format"))),
                    None => return Err(PlyError::header(n, "missing format type")),
                }
                saw_format = true;
            }
            Some("element") => {
                let (Some(name), Some(count)) = (tokens.next(), tokens.next()) else {
                    return Err(PlyError::header(n, "element needs a name and a count"));
                };
                let count = count
                    .parse()
                    .map_err(|_| PlyError::header(n, format!("bad element count '{count}'")))?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let Some(element) = elements.last_mut() else {
                    return Err(PlyError::header(n, "property before any element"));
                };
                let rest: Vec<&str> = tokens.collect();
                let property = match rest.as_slice() {
                    ["list", _, _, name] => Property::List(name.to_string()),
                    [_, name] => Property::Scalar(name.to_string()),
                    _ => return Err(PlyError::header(n, format!("malformed property '{line}'"))),
                };
                element.properties.push(property);
            }
            Some("end_header") => {
                if !saw_format {
                    return Err(PlyError::header(n, "missing format line"));
                }
                let header = Header { elements };
                check_elements(n, &header)?;
                return Ok(header);
            }
            Some(other) => return Err(PlyError::header(n, format!("unknown keyword '{other}'"))),
        }
    }
    Err(PlyError::header(0, "missing end_header"))
}

fn check_elements(line: usize, header: &Header) -> Result<()> {
    for element in &header.elements {
        match (element.name.as_str(), header.role(element)) {
            ("vertex", Role::Other) => {
                return Err(PlyError::header(line, "vertex element lacks x, y or z"));
            }
            ("face", Role::Other) => {
                return Err(PlyError::header(line, "face element lacks a vertex index list"));
            }
            _ => {}
        }
    }
    Ok(())
}

fn next_data_line<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> Result<(usize, &'a str)> {
    lines
        .find(|(_, l)| !l.is_empty())
        .ok_or_else(|| PlyError::body(0, "unexpected end of file"))
}

/// One parsed property value of a row.
#[derive(Debug, Clone)]
enum Value {
    Scalar(f64),
    List(Vec<f64>),
}

impl Value {
    fn scalar(&self) -> f64 {
        match self {
            Value::Scalar(v) => *v,
            Value::List(v) => v.first().copied().unwrap_or(0.0),
        }
    }
}

fn parse_row(line_no: usize, line: &str, properties: &[Property]) -> Result<Vec<Value>> {
    let mut tokens = line.split_whitespace();
    let mut number = |what: &str| -> Result<f64> {
        let token = tokens
            .next()
            .ok_or_else(|| PlyError::body(line_no, format!("missing {what}")))?;
        token
            .parse::<f64>()
            .map_err(|_| PlyError::body(line_no, format!("bad number '{token}'")))
    };

    let mut values = Vec::with_capacity(properties.len());
    for property in properties {
        match property {
            Property::Scalar(name) => values.push(Value::Scalar(number(name.as_str())?)),
            Property::List(name) => {
                let len = number("list length")?;
                if !(len >= 0.0 && len.fract() == 0.0) {
                    return Err(PlyError::body(line_no, format!("bad list length {len}")));
                }
                let items = (0..len as usize).map(|_| number(name.as_str())).collect::<Result<Vec<_>>>()?;
                values.push(Value::List(items));
            }
        }
    }
    Ok(values)
}

fn indices(line_no: usize, value: &Value) -> Result<Vec<usize>> {
    let Value::List(items) = value else {
        return Err(PlyError::body(line_no, "expected a vertex index list"));
    };
    items
        .iter()
        .map(|&v| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(PlyError::body(line_no, format!("bad vertex index {v}")))
            }
        })
        .collect()
}

fn place(vertices: &mut [Point3], placement: &MeshPlacement) {
    if placement.normalize && !vertices.is_empty() {
        let mut lo = vertices[0];
        let mut hi = vertices[0];
        for v in vertices.iter() {
            lo = lo.inf(v);
            hi = hi.sup(v);
        }
        let extent = hi - lo;
        for v in vertices.iter_mut() {
            for axis in 0..3 {
                v[axis] = if extent[axis] > 0.0 {
                    (v[axis] - lo[axis]) / extent[axis]
                } else {
                    0.0
                };
            }
        }
    }
    for v in vertices.iter_mut() {
        *v = Point3::from(v.coords * placement.scale + placement.translate);
    }
}
