use std::sync::Arc;

use crate::error::RenderError;
use crate::hittable::HittableList;
use crate::material::Material;
use crate::math::Point3;
use crate::shapes::Triangle;

/// Parses a Wavefront OBJ file's `v`/`f` records into a flat [`HittableList`]
/// of triangles, all sharing `material`. `vt`/`vn` records are read (so line
/// numbers stay in sync with malformed-face errors) but otherwise ignored —
/// shading uses the geometric face normal, not interpolated vertex normals.
/// Quad faces (`f a b c d`) are triangulated as `(a,b,c) + (a,c,d)`.
pub fn load_obj(source: &str, material: Arc<dyn Material>) -> Result<HittableList, RenderError> {
    let mut vertices: Vec<Point3> = Vec::new();
    let mut mesh = HittableList::new();

    for (line_no, line) in source.lines().enumerate() {
        let line_number = line_no + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = tokens.first() else { continue };

        match first {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&tokens[1..], line_number)?;
                vertices.push(Point3::new(x, y, z));
            }
            "vt" | "vn" => {
                // Texture/normal coordinates are parsed for line validation only;
                // shading falls back to the flat face normal.
            }
            "f" => {
                if tokens.len() < 4 {
                    return Err(RenderError::ObjParse {
                        line: line_number,
                        message: "face record needs at least 3 vertices".to_string(),
                    });
                }
                let indices: Vec<usize> = tokens[1..]
                    .iter()
                    .map(|t| parse_face_index(t, &vertices, line_number))
                    .collect::<Result<_, _>>()?;

                let v0 = vertices[indices[0]];
                for window in 1..indices.len() - 1 {
                    let v1 = vertices[indices[window]];
                    let v2 = vertices[indices[window + 1]];
                    mesh.add(Arc::new(Triangle::new(v0, v1, v2, material.clone())));
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

fn parse_floats<const N: usize>(tokens: &[&str], line: usize) -> Result<[f64; N], RenderError> {
    if tokens.len() < N {
        return Err(RenderError::ObjParse {
            line,
            message: format!("expected {N} numeric fields, found {}", tokens.len()),
        });
    }
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = tokens[i].parse().map_err(|_| RenderError::ObjParse {
            line,
            message: format!("could not parse '{}' as a number", tokens[i]),
        })?;
    }
    Ok(out)
}

/// Parses one `f` record's `v/vt/vn` field, using only the vertex index
/// (texture/normal indices are discarded, matching the loader's shading
/// model). OBJ indices are 1-based.
fn parse_face_index(token: &str, vertices: &[Point3], line: usize) -> Result<usize, RenderError> {
    let vertex_part = token.split('/').next().unwrap_or(token);
    let one_based: i64 = vertex_part.parse().map_err(|_| RenderError::ObjParse {
        line,
        message: format!("could not parse vertex index '{token}'"),
    })?;
    let index = if one_based < 0 {
        vertices.len() as i64 + one_based
    } else {
        one_based - 1
    };
    if index < 0 || index as usize >= vertices.len() {
        return Err(RenderError::ObjParse {
            line,
            message: format!("vertex index {one_based} out of range"),
        });
    }
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Hittable;
    use crate::material::Lambertian;
    use crate::math::Color;

    fn mat() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn triangle_face_produces_one_triangle() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj(obj, mat()).unwrap();
        assert_eq!(mesh.objects.len(), 1);
    }

    #[test]
    fn quad_face_triangulates_into_two() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = load_obj(obj, mat()).unwrap();
        assert_eq!(mesh.objects.len(), 2);
    }

    #[test]
    fn face_with_texture_and_normal_indices_uses_vertex_index_only() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
        let mesh = load_obj(obj, mat()).unwrap();
        assert_eq!(mesh.objects.len(), 1);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(load_obj(obj, mat()).is_err());
    }
}
