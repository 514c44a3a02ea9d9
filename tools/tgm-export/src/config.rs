//! Export configuration
//!
//! Parses `tgm-export.toml`:
//!
//! ```toml
//! [decoder]
//! max_surfaces = 4000
//!
//! [export]
//! material_library = true
//! include_normals = false
//! flip_v = false
//! scale = 0.1
//! object_name = "crate"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use tgm_decode::DecoderConfig;

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "tgm-export.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub export: ObjOptions,
}

/// What the OBJ writer emits
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjOptions {
    /// Write a `.mtl` next to the `.obj`
    #[serde(default = "default_true")]
    pub material_library: bool,
    #[serde(default = "default_true")]
    pub include_normals: bool,
    #[serde(default = "default_true")]
    pub include_uvs: bool,
    /// Write `vt u 1-v` for tools with a top-left texture origin
    #[serde(default = "default_true")]
    pub flip_v: bool,
    /// Append the vertex color to each `v` record
    #[serde(default)]
    pub vertex_colors: bool,
    /// Position multiplier, must be positive
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// `o` record name, defaults to the input file stem
    #[serde(default)]
    pub object_name: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            material_library: true,
            include_normals: true,
            include_uvs: true,
            flip_v: true,
            vertex_colors: false,
            scale: default_scale(),
            object_name: None,
        }
    }
}

impl ObjOptions {
    /// Reject settings the writer cannot honor
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.scale.is_finite() && self.scale > 0.0,
            "Scale factor must be positive, got {}",
            self.scale
        );
        Ok(())
    }
}

/// Load and parse a config file
pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    let config: ExportConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {:?}", path))?;
    Ok(config)
}

/// Explicit path if given, else `tgm-export.toml` if present, else defaults
pub fn resolve_config(explicit: Option<&Path>) -> Result<ExportConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file() {
        tracing::debug!("Using {}", DEFAULT_CONFIG_FILE);
        return load_config(fallback);
    }

    Ok(ExportConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: ExportConfig = toml::from_str(
            r#"
            [decoder]
            max_textures = 64
            max_surfaces = 128

            [decoder.vertex_bounds]
            dot2 = 5000.0

            [export]
            material_library = false
            include_uvs = false
            flip_v = false
            vertex_colors = true
            scale = 0.5
            object_name = "barrel"
            "#,
        )
        .unwrap();

        assert_eq!(config.decoder.max_textures, 64);
        assert_eq!(config.decoder.max_surfaces, 128);
        assert_eq!(config.decoder.vertex_bounds.dot2, 5000.0);
        assert_eq!(config.decoder.vertex_bounds.fdot, 1.0e4);
        assert!(!config.export.material_library);
        assert!(config.export.include_normals);
        assert!(!config.export.include_uvs);
        assert!(!config.export.flip_v);
        assert!(config.export.vertex_colors);
        assert_eq!(config.export.scale, 0.5);
        assert_eq!(config.export.object_name.as_deref(), Some("barrel"));
    }

    #[test]
    fn test_export_defaults() {
        let options = ObjOptions::default();
        assert!(options.flip_v);
        assert!(!options.vertex_colors);
        assert_eq!(options.scale, 1.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        for scale in [0.0, -2.0, f32::NAN] {
            let options = ObjOptions {
                scale,
                ..Default::default()
            };
            let err = options.validate().unwrap_err();
            assert!(err.to_string().contains("Scale factor must be positive"));
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ExportConfig = toml::from_str("").unwrap();
        assert_eq!(config.decoder, DecoderConfig::default());
        assert_eq!(config.export, ObjOptions::default());
    }

    #[test]
    fn test_unknown_field_type_is_error() {
        let result: Result<ExportConfig, _> = toml::from_str("[export]\ninclude_uvs = \"yes\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/tgm-export.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
