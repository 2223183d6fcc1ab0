use glam::{Vec2, Vec3};
use std::path::Path;

/// Errors from mesh loading.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

fn parse_error(line: usize, message: impl Into<String>) -> MeshError {
    MeshError::Parse {
        line,
        message: message.into(),
    }
}

/// One corner of a face. Indices are 0-based into the mesh's attribute lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// A polygon as written in the source, corners in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub corners: Vec<FaceCorner>,
}

/// A four-cornered face with the global position index of each corner.
///
/// The indices are what navigation uses to detect shared edges; comparing
/// positions would be unreliable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadFace {
    pub indices: [usize; 4],
    pub positions: [Vec3; 4],
}

/// A parsed mesh.
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub faces: Vec<Face>,
}

impl ObjMesh {
    /// Fan-triangulate every face into corner positions.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        let mut out = Vec::with_capacity(self.faces.len() * 2);
        for face in &self.faces {
            let Some((first, rest)) = face.corners.split_first() else {
                continue;
            };
            let anchor = self.positions[first.position];
            for pair in rest.windows(2) {
                out.push([
                    anchor,
                    self.positions[pair[0].position],
                    self.positions[pair[1].position],
                ]);
            }
        }
        out
    }

    /// All four-cornered faces. Faces of any other arity are skipped with a
    /// warning.
    pub fn quads(&self) -> Vec<QuadFace> {
        let mut out = Vec::with_capacity(self.faces.len());
        for (i, face) in self.faces.iter().enumerate() {
            let [a, b, c, d] = face.corners.as_slice() else {
                tracing::warn!(
                    face = i,
                    corners = face.corners.len(),
                    "skipping non-quad navigation face"
                );
                continue;
            };
            let indices = [a.position, b.position, c.position, d.position];
            out.push(QuadFace {
                indices,
                positions: indices.map(|idx| self.positions[idx]),
            });
        }
        out
    }

    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.corners.len().saturating_sub(2))
            .sum()
    }
}

/// Read and parse a mesh file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjMesh, MeshError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mesh = parse_obj(&text)?;
    tracing::debug!(path = %path.display(), "loaded mesh file");
    Ok(mesh)
}

/// Parse mesh text.
///
/// Face indices are 1-based, or negative to count back from the most
/// recently declared attribute. Every index must refer to an attribute
/// declared earlier in the text.
pub fn parse_obj(text: &str) -> Result<ObjMesh, MeshError> {
    let mut mesh = ObjMesh::default();

    for (n, raw) in text.lines().enumerate() {
        let line_no = n + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                mesh.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                mesh.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                mesh.texcoords.push(parse_texcoord(&mut tokens, line_no)?);
            }
            "f" => {
                let corners = tokens
                    .map(|tok| parse_corner(tok, &mesh, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(parse_error(
                        line_no,
                        format!("face needs at least 3 corners, got {}", corners.len()),
                    ));
                }
                mesh.faces.push(Face { corners });
            }
            other => {
                tracing::trace!(line = line_no, directive = other, "ignoring directive");
            }
        }
    }

    tracing::debug!(
        positions = mesh.positions.len(),
        normals = mesh.normals.len(),
        texcoords = mesh.texcoords.len(),
        faces = mesh.faces.len(),
        "parsed mesh"
    );
    Ok(mesh)
}

fn parse_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N], MeshError> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let tok = tokens
            .next()
            .ok_or_else(|| parse_error(line, format!("expected {} components", N)))?;
        *slot = tok
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number {tok:?}")))?;
    }
    // A fourth `w` component on `v`/`vt` is legal and ignored.
    Ok(out)
}

/// `u` is required; `v` defaults to 0. A trailing `w` is ignored.
fn parse_texcoord<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec2, MeshError> {
    let [u] = parse_floats::<1>(tokens, line)?;
    let v = match tokens.next() {
        Some(tok) => tok
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number {tok:?}")))?,
        None => 0.0,
    };
    Ok(Vec2::new(u, v))
}

fn parse_corner(token: &str, mesh: &ObjMesh, line: usize) -> Result<FaceCorner, MeshError> {
    let mut parts = token.split('/');
    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, mesh.positions.len(), line)?,
        _ => return Err(parse_error(line, format!("missing position in {token:?}"))),
    };
    let texcoord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, mesh.texcoords.len(), line)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, mesh.normals.len(), line)?),
        _ => None,
    };
    Ok(FaceCorner {
        position,
        texcoord,
        normal,
    })
}

fn resolve_index(token: &str, declared: usize, line: usize) -> Result<usize, MeshError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line, format!("invalid index {token:?}")))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => declared.checked_sub(r.unsigned_abs() as usize),
    };
    match resolved {
        Some(idx) if idx < declared => Ok(idx),
        _ => Err(parse_error(
            line,
            format!("index {raw} out of range ({declared} declared)"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STRIP: &str = "\
# two quads sharing the edge 2-3
o strip
v 0 0 0
v 0 0 1
v 1 0 1
v 1 0 0
v 2 0 1
v 2 0 0
vn 0 1 0
vt 0 0
f 1/1/1 2/1/1 3/1/1 4/1/1
f 4//1 3//1 5//1 6//1
";

    #[test]
    fn parses_attributes_and_faces() {
        let mesh = parse_obj(STRIP).unwrap();
        assert_eq!(mesh.positions.len(), 6);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.texcoords.len(), 1);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(
            mesh.faces[0].corners[0],
            FaceCorner {
                position: 0,
                texcoord: Some(0),
                normal: Some(0)
            }
        );
        assert_eq!(mesh.faces[1].corners[1].texcoord, None);
    }

    #[test]
    fn quads_keep_global_indices() {
        let mesh = parse_obj(STRIP).unwrap();
        let quads = mesh.quads();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].indices, [0, 1, 2, 3]);
        assert_eq!(quads[1].indices, [3, 2, 4, 5]);
        assert_eq!(quads[1].positions[2], Vec3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn quads_fan_into_two_triangles() {
        let mesh = parse_obj(STRIP).unwrap();
        let tris = mesh.triangles();
        assert_eq!(tris.len(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(tris[1][0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(tris[1][2], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn triangles_are_not_quads() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 0 1\nf 1 2 3\n").unwrap();
        assert!(mesh.quads().is_empty());
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn negative_indices_are_relative() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 0 1\nf -3 -2 -1\n").unwrap();
        let positions: Vec<usize> = mesh.faces[0].corners.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 3, .. }));
    }

    #[test]
    fn zero_index_is_an_error() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
    }

    #[test]
    fn bad_number_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        match err {
            MeshError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("zero"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn texcoord_components_are_optional() {
        let mesh = parse_obj("vt 0.5\nvt 0.25 0.75\nvt 0.1 0.2 0.3\n").unwrap();
        assert_eq!(
            mesh.texcoords,
            vec![
                Vec2::new(0.5, 0.0),
                Vec2::new(0.25, 0.75),
                Vec2::new(0.1, 0.2)
            ]
        );
        assert!(parse_obj("vt\n").is_err());
        assert!(parse_obj("vt 0.5 nope\n").is_err());
    }

    #[test]
    fn short_face_is_an_error() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").is_err());
    }

    #[test]
    fn unknown_directives_and_comments_are_skipped() {
        let text = "mtllib cave.mtl\ng walls\ns off\nusemtl rock\nv 0 0 0 # origin\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn load_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(STRIP.as_bytes()).unwrap();
        let mesh = load_obj(tmp.path()).unwrap();
        assert_eq!(mesh.faces.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_obj(dir.path().join("absent.obj")).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
