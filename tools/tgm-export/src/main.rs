//! tgm-export - 3GM model export tool
//!
//! Decodes 3GM model files and writes Wavefront OBJ/MTL, or prints their
//! structure.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tgm_export::{config, inspect, obj};

#[derive(Parser)]
#[command(name = "tgm-export")]
#[command(about = "3GM model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a 3GM file to OBJ
    Convert {
        /// Input .3GM file
        input: PathBuf,

        /// Output .obj file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: tgm-export.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the .mtl material library
        #[arg(long)]
        no_mtl: bool,

        /// Skip vertex normals
        #[arg(long)]
        no_normals: bool,

        /// Skip texture coordinates
        #[arg(long, visible_alias = "no-texcoords")]
        no_uvs: bool,

        /// Keep texture V as stored instead of writing 1-v
        #[arg(long)]
        no_flip_y: bool,

        /// Append vertex colors to `v` records
        #[arg(long)]
        vertex_colors: bool,

        /// Multiply all positions by FACTOR
        #[arg(long, value_name = "FACTOR", value_parser = parse_scale)]
        scale: Option<f32>,

        /// Print the decode report (header, chunks, counts, warnings)
        #[arg(short, long)]
        debug: bool,
    },

    /// Decode a 3GM file and print header, chunks, counts and warnings
    Info {
        /// Input .3GM file
        input: PathBuf,

        /// Config file (default: tgm-export.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the chunks of a 3GM file without decoding them
    Chunks {
        /// Input .3GM file
        input: PathBuf,
    },
}

fn parse_scale(s: &str) -> Result<f32, String> {
    let scale: f32 = s.parse().map_err(|_| format!("invalid scale factor '{s}'"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("scale factor must be positive, got {s}"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            no_mtl,
            no_normals,
            no_uvs,
            no_flip_y,
            vertex_colors,
            scale,
            debug,
        } => {
            let mut settings = config::resolve_config(config.as_deref())?;
            settings.export.material_library &= !no_mtl;
            settings.export.include_normals &= !no_normals;
            settings.export.include_uvs &= !no_uvs;
            settings.export.flip_v &= !no_flip_y;
            settings.export.vertex_colors |= vertex_colors;
            if let Some(scale) = scale {
                settings.export.scale = scale;
            }
            settings.export.validate()?;

            let output = output.unwrap_or_else(|| input.with_extension("obj"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let decoded = obj::decode_input(&input, &settings)?;
            if debug {
                print!("{}", inspect::format_report(&decoded));
            }
            obj::write_outputs(&input, &decoded, &output, &settings.export)?;
            tracing::info!("Done!");
        }

        Commands::Info { input, config } => {
            let settings = config::resolve_config(config.as_deref())?;
            let decoded = inspect::decode_file(&input, &settings.decoder)?;
            print!("{}", inspect::format_report(&decoded));
        }

        Commands::Chunks { input } => {
            let (header, chunks) = inspect::read_chunk_table(&input)?;
            println!("{}", inspect::format_header(&header));
            print!("{}", inspect::format_chunk_table(&chunks));
        }
    }

    Ok(())
}
