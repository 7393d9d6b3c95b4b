//! Command-line front end for the diffraction volume generator.
//!
//! ```bash
//! # Compute a volume from a config file, writing raw samples and PNG previews
//! diffraction-volume generate --config configs/circular.toml
//!
//! # Reflectance of an air/glass interface at 45 degrees
//! diffraction-volume interface --n1 1.0 --n2 1.5 --angle 45 --polarization p
//! ```

use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use diffraction_volume::config::Config;
use diffraction_volume::export::write_volume;
use diffraction_volume::interface::{self, Interaction, Polarization};
use diffraction_volume::visualisation::VolumeVisualiser;
use diffraction_volume::{Generator, SliceProgress};

/// Fresnel diffraction volume generator
#[derive(Parser, Debug)]
#[command(name = "diffraction-volume")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logging filter (e.g. "info", "debug", "diffraction_volume=trace")
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Propagate the configured aperture and write the normalized volume
    Generate {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the output directory from the config
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compute slices on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// Snell refraction and Fresnel reflectance at a flat interface
    Interface {
        /// Refractive index of the incident medium
        #[arg(long, default_value = "1.0")]
        n1: f64,

        /// Refractive index of the transmitting medium
        #[arg(long, default_value = "1.5")]
        n2: f64,

        /// Incidence angle in degrees
        #[arg(short, long)]
        angle: f64,

        #[arg(short, long, value_enum, default_value = "s")]
        polarization: PolarizationArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolarizationArg {
    S,
    P,
}

impl From<PolarizationArg> for Polarization {
    fn from(arg: PolarizationArg) -> Self {
        match arg {
            PolarizationArg::S => Polarization::S,
            PolarizationArg::P => Polarization::P,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    match cli.command {
        Commands::Generate {
            config,
            output,
            parallel,
        } => run_generate(config, output, parallel),
        Commands::Interface {
            n1,
            n2,
            angle,
            polarization,
        } => run_interface(n1, n2, angle, polarization.into()),
    }
}

fn run_generate(config_path: PathBuf, output: Option<PathBuf>, parallel: bool) -> Result<()> {
    let mut config = Config::from_file(&config_path)?;
    if let Some(dir) = output {
        config.output.directory = dir;
    }
    if parallel {
        config.generation.parallel = true;
    }
    config.log_summary();

    let spec = config.aperture.spec();
    let sampling = config.depth.sampling();
    let generator = Generator::new(config.generation.options());

    let observer = |progress: &SliceProgress| {
        info!(
            "Computed {}/{} slices ({:.0}%), last z={:.4} m",
            progress.completed,
            progress.total,
            progress.fraction() * 100.0,
            progress.depth
        );
        ControlFlow::Continue(())
    };
    let volume = generator
        .generate_with(&spec, &sampling, &observer)
        .context("Volume generation failed")?;

    let out = &config.output;
    if out.write_raw {
        let files = write_volume(&volume, &spec, &out.directory, &out.stem)
            .context("Failed to write volume")?;
        info!("Header: {}", files.header.display());
    }

    if out.render_section || !out.render_slices.is_empty() {
        let visualiser = VolumeVisualiser::new(&out.directory, out.image_width, out.image_height)
            .with_context(|| format!("Cannot create {}", out.directory.display()))?;
        for &z in &out.render_slices {
            visualiser
                .plot_slice(&volume, z, &out.stem)
                .map_err(|e| anyhow!("Failed to render slice {}: {}", z, e))?;
        }
        if out.render_section {
            let centre = spec.grid().centre();
            visualiser
                .plot_section(&volume, centre, &out.stem)
                .map_err(|e| anyhow!("Failed to render section: {}", e))?;
        }
    }

    if volume.raw_max() == 0.0 {
        warn!("Volume is entirely dark; nothing was normalized");
    }
    info!("Done");
    Ok(())
}

fn run_interface(n1: f64, n2: f64, angle_deg: f64, polarization: Polarization) -> Result<()> {
    if n1 <= 0.0 || n2 <= 0.0 {
        return Err(anyhow!(
            "Refractive indices must be positive (n1={}, n2={})",
            n1,
            n2
        ));
    }

    let result = interface::interact(n1, n2, angle_deg.to_radians());
    match result {
        Interaction::TotalInternalReflection => {
            println!("Total internal reflection (R = 1, T = 0)");
        }
        Interaction::Refracted { theta_t, r_s, r_p } => {
            println!("Transmitted angle: {:.4} deg", theta_t.to_degrees());
            println!("R_s = {:.4}, R_p = {:.4}", r_s, r_p);
        }
    }
    println!(
        "{:?}-polarized: R = {:.4}, T = {:.4}",
        polarization,
        result.reflectance(polarization),
        result.transmittance(polarization)
    );
    Ok(())
}
