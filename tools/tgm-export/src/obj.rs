//! Wavefront OBJ/MTL output

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tgm_decode::{DecodeOutput, Decoder, Mesh, PrimitiveRecord, TracingSink, Vertex};

use crate::config::{ExportConfig, ObjOptions};

/// Counts reported after a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub lines: usize,
    pub surfaces: usize,
    pub warnings: usize,
}

fn material_name(surface_id: u16) -> String {
    format!("surface_{surface_id}")
}

/// One `f` corner, 1-based, in the form matching the emitted attributes
fn face_corner(index: u16, options: &ObjOptions) -> String {
    let i = u32::from(index) + 1;
    match (options.include_uvs, options.include_normals) {
        (true, true) => format!("{i}/{i}/{i}"),
        (true, false) => format!("{i}/{i}"),
        (false, true) => format!("{i}//{i}"),
        (false, false) => format!("{i}"),
    }
}

/// `v` record fields after the keyword
fn position_fields(vertex: &Vertex, options: &ObjOptions) -> String {
    let [x, y, z] = vertex.position.map(|c| c * options.scale);
    let mut fields = format!("{x:.6} {y:.6} {z:.6}");
    if options.vertex_colors {
        let [r, g, b, _] = vertex.color.to_be_bytes().map(|c| f32::from(c) / 255.0);
        fields.push_str(&format!(" {r:.6} {g:.6} {b:.6}"));
    }
    fields
}

fn write_primitive<W: Write>(
    writer: &mut W,
    primitive: &PrimitiveRecord,
    options: &ObjOptions,
) -> std::io::Result<()> {
    for [a, b, c] in primitive.triangles() {
        writeln!(
            writer,
            "f {} {} {}",
            face_corner(a, options),
            face_corner(b, options),
            face_corner(c, options)
        )?;
    }
    for [a, b] in primitive.line_segments() {
        writeln!(writer, "l {} {}", u32::from(a) + 1, u32::from(b) + 1)?;
    }
    Ok(())
}

/// Write a mesh as OBJ text.
///
/// `material_library` is the file name written in the `mtllib` record.
pub fn write_obj<W: Write>(
    writer: &mut W,
    mesh: &Mesh,
    object_name: &str,
    options: &ObjOptions,
    material_library: Option<&str>,
) -> Result<()> {
    writeln!(writer, "# Exported by tgm-export")?;
    writeln!(writer, "# vertices: {}", mesh.vertices.len())?;
    writeln!(writer, "# triangles: {}", mesh.triangle_count())?;
    writeln!(writer, "# surfaces: {}", mesh.surfaces.len())?;
    if let Some(mtl) = material_library {
        writeln!(writer, "mtllib {mtl}")?;
    }
    writeln!(writer, "o {object_name}")?;

    for v in &mesh.vertices {
        writeln!(writer, "v {}", position_fields(v, options))?;
    }
    if options.include_uvs {
        for v in &mesh.vertices {
            let [u, t] = v.uv;
            let t = if options.flip_v { 1.0 - t } else { t };
            writeln!(writer, "vt {u:.6} {t:.6}")?;
        }
    }
    if options.include_normals {
        for v in &mesh.vertices {
            let [x, y, z] = v.normal;
            writeln!(writer, "vn {x:.6} {y:.6} {z:.6}")?;
        }
    }

    for surface in &mesh.surfaces {
        writeln!(writer, "usemtl {}", material_name(surface.id))?;
        for primitive in mesh.primitives_for_surface(surface.id) {
            write_primitive(writer, primitive, options)?;
        }
    }

    Ok(())
}

/// Write one material per surface.
pub fn write_mtl<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<()> {
    writeln!(writer, "# Exported by tgm-export")?;
    for surface in &mesh.surfaces {
        writeln!(writer)?;
        writeln!(writer, "newmtl {}", material_name(surface.id))?;
        writeln!(
            writer,
            "# kind {}, texture {}, flags 0x{:04X}",
            surface.kind, surface.texture_id, surface.flags
        )?;
        writeln!(writer, "Kd 0.800000 0.800000 0.800000")?;
        writeln!(writer, "d {}", if surface.has_alpha { "0.5" } else { "1.0" })?;
        if surface.texture_id >= 0 {
            writeln!(writer, "map_Kd texture_{}.tga", surface.texture_id)?;
        }
    }
    Ok(())
}

/// Decode a 3GM file and write it as OBJ (plus MTL unless disabled).
pub fn convert_file(input: &Path, output: &Path, config: &ExportConfig) -> Result<ConvertSummary> {
    let decoded = decode_input(input, config)?;
    write_outputs(input, &decoded, output, &config.export)
}

/// Read and decode `input`, forwarding warnings to the log
pub fn decode_input(input: &Path, config: &ExportConfig) -> Result<DecodeOutput> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read input: {:?}", input))?;

    let mut decoder = Decoder::new(config.decoder.clone());
    decoder
        .decode_with_sink(&data, &mut TracingSink)
        .with_context(|| format!("Failed to decode {:?}", input))
}

/// Write the OBJ (and MTL) for an already decoded `input`.
pub fn write_outputs(
    input: &Path,
    decoded: &DecodeOutput,
    output: &Path,
    options: &ObjOptions,
) -> Result<ConvertSummary> {
    options.validate()?;
    let mesh = &decoded.mesh;
    let object_name = options.object_name.clone().unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string()
    });

    let mtl_path = output.with_extension("mtl");
    let mtl_name = mtl_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);
    write_obj(
        &mut writer,
        mesh,
        &object_name,
        options,
        mtl_name.as_deref().filter(|_| options.material_library),
    )?;
    writer
        .flush()
        .with_context(|| format!("Failed to write output: {:?}", output))?;

    if options.material_library {
        let file = File::create(&mtl_path)
            .with_context(|| format!("Failed to create material library: {:?}", mtl_path))?;
        let mut writer = BufWriter::new(file);
        write_mtl(&mut writer, mesh)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write material library: {:?}", mtl_path))?;
    }

    let summary = ConvertSummary {
        vertices: mesh.vertices.len(),
        triangles: mesh.triangle_count(),
        lines: mesh
            .primitives
            .iter()
            .map(|p| p.line_segments().len())
            .sum(),
        surfaces: mesh.surfaces.len(),
        warnings: decoded.warnings.len(),
    };
    tracing::info!(
        "Converted 3GM model: {} vertices, {} triangles, {} surfaces, {} warnings",
        summary.vertices,
        summary.triangles,
        summary.surfaces,
        summary.warnings
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgm_decode::{PrimitiveKind, Surface, Vertex};

    fn sample_mesh() -> Mesh {
        Mesh {
            vertices: vec![
                Vertex::from_position([0.0, 0.0, 0.0]),
                Vertex::from_position([25.0, 0.0, 0.0]),
                Vertex::from_position([0.0, 25.0, 0.0]),
            ],
            primitives: vec![
                PrimitiveRecord {
                    kind: PrimitiveKind::TriangleStrip,
                    surface_id: 1,
                    texture_id: 0,
                    flags: 0,
                    indices: vec![0, 1, 2],
                },
                PrimitiveRecord {
                    kind: PrimitiveKind::LineStrip,
                    surface_id: 2,
                    texture_id: -1,
                    flags: 0,
                    indices: vec![0, 2],
                },
            ],
            surfaces: vec![
                Surface {
                    id: 1,
                    kind: PrimitiveKind::TriangleStrip,
                    texture_id: 0,
                    flags: 0,
                    has_alpha: true,
                },
                Surface {
                    id: 2,
                    kind: PrimitiveKind::LineStrip,
                    texture_id: -1,
                    flags: 0,
                    has_alpha: false,
                },
            ],
        }
    }

    fn render_obj(options: &ObjOptions, mtl: Option<&str>) -> String {
        let mut out = Vec::new();
        write_obj(&mut out, &sample_mesh(), "sample", options, mtl).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_obj_full_attributes() {
        let text = render_obj(&ObjOptions::default(), Some("sample.mtl"));

        assert!(text.contains("# vertices: 3\n"));
        assert!(text.contains("# triangles: 1\n"));
        assert!(text.contains("mtllib sample.mtl\n"));
        assert!(text.contains("o sample\n"));
        assert!(text.contains("v 25.000000 0.000000 0.000000\n"));
        assert!(text.contains("vt 1.000000 0.500000\n"));
        assert!(text.contains("vn 0.000000 1.000000 0.000000\n"));
        assert!(text.contains("usemtl surface_1\nf 1/1/1 2/2/2 3/3/3\n"));
        assert!(text.contains("usemtl surface_2\nl 1 3\n"));
    }

    #[test]
    fn test_obj_face_forms() {
        let positions_only = ObjOptions {
            include_normals: false,
            include_uvs: false,
            ..Default::default()
        };
        let text = render_obj(&positions_only, None);
        assert!(text.contains("f 1 2 3\n"));
        assert!(!text.contains("vt "));
        assert!(!text.contains("vn "));
        assert!(!text.contains("mtllib"));

        let normals_only = ObjOptions {
            include_uvs: false,
            ..Default::default()
        };
        assert!(render_obj(&normals_only, None).contains("f 1//1 2//2 3//3\n"));

        let uvs_only = ObjOptions {
            include_normals: false,
            ..Default::default()
        };
        assert!(render_obj(&uvs_only, None).contains("f 1/1 2/2 3/3\n"));
    }

    #[test]
    fn test_mtl_alpha() {
        let mut out = Vec::new();
        write_mtl(&mut out, &sample_mesh()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("newmtl surface_1\n# kind TriangleStrip, texture 0, flags 0x0000\n"));
        assert!(text.contains("newmtl surface_2\n"));

        let blocks: Vec<&str> = text.split("newmtl").skip(1).collect();
        assert!(blocks[0].contains("d 0.5"));
        assert!(blocks[1].contains("d 1.0"));
        assert!(blocks[0].contains("map_Kd texture_0.tga\n"));
        assert!(!blocks[1].contains("map_Kd"));
    }

    #[test]
    fn test_obj_flip_v() {
        let flipped = render_obj(&ObjOptions::default(), None);
        assert!(flipped.contains("vt 0.500000 0.000000\n"));

        let unflipped = ObjOptions {
            flip_v: false,
            ..Default::default()
        };
        assert!(render_obj(&unflipped, None).contains("vt 0.500000 1.000000\n"));
    }

    #[test]
    fn test_obj_scale_and_colors() {
        let options = ObjOptions {
            scale: 0.1,
            vertex_colors: true,
            ..Default::default()
        };
        let text = render_obj(&options, None);

        assert!(text.contains("v 2.500000 0.000000 0.000000 1.000000 1.000000 1.000000\n"));
        // Normals and UVs come from the unscaled position
        assert!(text.contains("vt 1.000000 0.500000\n"));
        assert!(text.contains("vn 1.000000 0.000000 0.000000\n"));
    }
}
