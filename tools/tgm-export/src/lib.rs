//! tgm-export library
//!
//! Conversion and reporting functions behind the `tgm-export` binary.

pub mod config;
pub mod inspect;
pub mod obj;

pub use config::{ExportConfig, ObjOptions, load_config, resolve_config};
pub use obj::{ConvertSummary, convert_file, decode_input, write_mtl, write_obj, write_outputs};
