//! dicesmith CLI - Command-line interface for dice asset generation

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dicesmith_engine::die::pip_layout;
use dicesmith_engine::{DiceConfig, DiceFactory, Variant, inspect};
use dicesmith_layout::{FACES, pip_offsets};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "dicesmith")]
#[command(about = "Procedural six-sided dice exported as glTF", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dice and write one glTF per color
    Generate {
        /// TOML config file (unset keys come from its variant's preset)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preset to start from when no config file is given
        #[arg(short, long, default_value = "cracked")]
        preset: Variant,

        /// Project root the models directory is created under
        #[arg(long)]
        project: Option<PathBuf>,

        /// Only build these colors (comma separated)
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,

        /// Surface extraction cells along each axis (1 to 1024)
        #[arg(short, long)]
        resolution: Option<u32>,

        /// Leave the body surface smooth
        #[arg(long)]
        no_cracks: bool,

        /// Skip the preview scene
        #[arg(long)]
        no_preview: bool,
    },

    /// Print the pip table and the pip heights of a preset
    Layout {
        #[arg(short, long, default_value = "cracked")]
        preset: Variant,
    },

    /// Summarize a written glTF/GLB file
    Inspect {
        /// File to read
        file: PathBuf,
    },

    /// Write a preset as a TOML config file to start editing from
    InitConfig {
        #[arg(short, long, default_value = "cracked")]
        preset: Variant,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            preset,
            project,
            colors,
            resolution,
            no_cracks,
            no_preview,
        } => {
            let mut config = match config {
                Some(path) => DiceConfig::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => DiceConfig::preset(preset),
            };
            if let Some(project) = project {
                config.output.project_dir = project;
            }
            if !colors.is_empty() {
                config.select_colors(&colors)?;
            }
            if let Some(resolution) = resolution {
                config.geometry.resolution = resolution;
            }
            if no_cracks {
                config.cracks.enabled = false;
            }
            if no_preview {
                config.output.write_preview = false;
            }
            run_generate(config)?;
        }
        Commands::Layout { preset } => {
            print_layout(&DiceConfig::preset(preset))?;
        }
        Commands::Inspect { file } => {
            run_inspect(&file)?;
        }
        Commands::InitConfig { preset, output } => {
            run_init_config(preset, output.as_deref())?;
        }
    }

    Ok(())
}

fn run_generate(config: DiceConfig) -> Result<()> {
    let mut factory = DiceFactory::new(config)?;
    let report = factory.run()?;

    print!("{report}");

    let missing = report.missing().count();
    if missing > 0 {
        info!("{} dice were not found in the scene", missing);
    }
    if report.exported().next().is_none() {
        bail!("No dice were exported");
    }

    Ok(())
}

fn print_layout(config: &DiceConfig) -> Result<()> {
    let layout = pip_layout(config);

    println!("Face  Normal       Rotation           Pips");
    for face in &FACES {
        let offsets = pip_offsets(face.value, 1.0)?
            .iter()
            .map(|o| format!("({:+},{:+})", o.x, o.y))
            .collect::<Vec<_>>()
            .join(" ");
        let n = face.normal;
        let [rx, ry, rz] = face.rotation;
        println!(
            "{:>4}  ({:+},{:+},{:+})   ({:>4},{:>4},{:>4})   {}",
            face.value, n.x, n.y, n.z, rx, ry, rz, offsets
        );
    }

    println!();
    println!("Die size:       {}", layout.dice_size);
    println!("Pip spacing:    {}", layout.pip_spacing);
    println!("Cutter height:  {}", layout.cutter_height());
    println!("Fill height:    {}", layout.fill_height());
    println!("Total pips:     {}", layout.pip_count());

    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let summary = inspect(file)?;
    println!("{}", file.display());
    println!("{summary}");
    Ok(())
}

fn run_init_config(preset: Variant, output: Option<&Path>) -> Result<()> {
    let text = DiceConfig::preset(preset).to_toml()?;
    match output {
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} preset to {}", preset, path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
