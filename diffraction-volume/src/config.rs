use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aperture::{ApertureShape, ApertureSpec};
use crate::generator::GenerationOptions;
use crate::volume::DepthSampling;

/// Aperture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApertureConfig {
    #[serde(default)]
    pub shape: ApertureShape,
    pub radius: f64,     // Hole radius or slit half-height (m)
    pub samples: usize,  // Grid points per side
    pub extent: f64,     // Window width (m)
    #[serde(default = "default_wavelength")]
    pub wavelength: f64, // (m)
}

fn default_wavelength() -> f64 {
    632.8e-9
}

impl ApertureConfig {
    fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(anyhow!("Aperture samples must be positive"));
        }
        if self.radius <= 0.0 || self.extent <= 0.0 || self.wavelength <= 0.0 {
            return Err(anyhow!(
                "Aperture values must be positive (radius={}, extent={}, wavelength={})",
                self.radius,
                self.extent,
                self.wavelength
            ));
        }
        if self.shape == ApertureShape::Circular && 2.0 * self.radius > self.extent {
            warn!(
                "Aperture diameter {} m exceeds the window {} m; the hole will be clipped",
                2.0 * self.radius,
                self.extent
            );
        }
        Ok(())
    }

    pub fn spec(&self) -> ApertureSpec {
        ApertureSpec::circular(self.radius, self.samples, self.extent, self.wavelength)
            .with_shape(self.shape)
    }
}

/// Depth sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthConfig {
    pub z_min: f64,
    pub z_max: f64,
    pub num_z: usize,
}

impl DepthConfig {
    fn validate(&self) -> Result<()> {
        if self.num_z < 2 {
            return Err(anyhow!("num_z must be at least 2, got {}", self.num_z));
        }
        if self.z_min < 0.0 || self.z_max <= self.z_min {
            return Err(anyhow!(
                "Depth range must satisfy 0 <= z_min < z_max (z_min={}, z_max={})",
                self.z_min,
                self.z_max
            ));
        }
        Ok(())
    }

    pub fn sampling(&self) -> DepthSampling {
        DepthSampling::new(self.z_min, self.z_max, self.num_z)
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_yield_every")]
    pub yield_every: usize,
}

fn default_yield_every() -> usize {
    10
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            yield_every: default_yield_every(),
        }
    }
}

impl GenerationConfig {
    fn validate(&self) -> Result<()> {
        if self.yield_every == 0 {
            return Err(anyhow!("yield_every must be positive"));
        }
        Ok(())
    }

    pub fn options(&self) -> GenerationOptions {
        GenerationOptions {
            parallel: self.parallel,
            yield_every: self.yield_every,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_stem")]
    pub stem: String,
    #[serde(default = "default_true")]
    pub write_raw: bool,
    #[serde(default)]
    pub render_slices: Vec<usize>,
    #[serde(default = "default_true")]
    pub render_section: bool,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_stem() -> String {
    "fresnel_diffraction_intensity_normalized".to_string()
}

fn default_true() -> bool {
    true
}

fn default_image_width() -> u32 {
    800
}

fn default_image_height() -> u32 {
    600
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            stem: default_stem(),
            write_raw: true,
            render_slices: Vec::new(),
            render_section: true,
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

impl OutputConfig {
    fn validate(&self, num_z: usize) -> Result<()> {
        if self.stem.is_empty() {
            return Err(anyhow!("Output stem must not be empty"));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(anyhow!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width,
                self.image_height
            ));
        }
        if let Some(&bad) = self.render_slices.iter().find(|&&z| z >= num_z) {
            return Err(anyhow!(
                "Slice {} requested for rendering but only {} slices exist",
                bad,
                num_z
            ));
        }
        Ok(())
    }
}

/// Complete generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aperture: ApertureConfig,
    pub depth: DepthConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        // Validate before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.aperture.validate()?;
        self.depth.validate()?;
        self.generation.validate()?;
        self.output.validate(self.depth.num_z)?;

        let points = self.aperture.samples * self.aperture.samples * self.depth.num_z;
        if points > 64 * 1024 * 1024 {
            warn!(
                "Volume has {} samples ({} MiB as f32); generation will be slow",
                points,
                points * 4 / (1024 * 1024)
            );
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("=== Diffraction Configuration ===");
        info!(
            "Aperture: {:?}, radius={} m, window={} m, {}x{} samples (dx={:.3e} m)",
            self.aperture.shape,
            self.aperture.radius,
            self.aperture.extent,
            self.aperture.samples,
            self.aperture.samples,
            self.aperture.extent / self.aperture.samples as f64
        );
        info!("Wavelength: {} m", self.aperture.wavelength);
        info!(
            "Depth: {} slices over [{}, {}] m",
            self.depth.num_z, self.depth.z_min, self.depth.z_max
        );
        info!(
            "Generation: {}, reporting every {} slices",
            if self.generation.parallel { "parallel" } else { "serial" },
            self.generation.yield_every
        );
        info!(
            "Output: {}/{} (raw={}, slices={:?}, section={})",
            self.output.directory.display(),
            self.output.stem,
            self.output.write_raw,
            self.output.render_slices,
            self.output.render_section
        );
        info!("=================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [aperture]
        radius = 0.0009
        samples = 256
        extent = 0.0036

        [depth]
        z_min = 0.05
        z_max = 0.6
        num_z = 100
    "#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.aperture.shape, ApertureShape::Circular);
        assert_eq!(config.aperture.wavelength, 632.8e-9);
        assert_eq!(config.generation.yield_every, 10);
        assert!(!config.generation.parallel);
        assert_eq!(config.output.directory, PathBuf::from("output"));
        assert!(config.output.write_raw);

        let spec = config.aperture.spec();
        assert_eq!(spec.n, 256);
        assert!(spec.validate().is_ok());
        assert_eq!(config.depth.sampling().num_z, 100);
    }

    #[test]
    fn slit_shape_parses() {
        let text = MINIMAL.replace("radius = 0.0009", "radius = 0.0002\nshape = \"horizontal_slit\"");
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.aperture.shape, ApertureShape::HorizontalSlit);
    }

    #[test]
    fn rejects_single_slice() {
        let text = MINIMAL.replace("num_z = 100", "num_z = 1");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_inverted_depth_range() {
        let text = MINIMAL.replace("z_max = 0.6", "z_max = 0.01");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_out_of_range_render_slice() {
        let text = format!("{MINIMAL}\n[output]\nrender_slices = [0, 100]\n");
        let err = Config::from_toml(&text).unwrap_err();
        assert!(err.to_string().contains("Slice 100"));
    }

    #[test]
    fn rejects_zero_wavelength() {
        let text = MINIMAL.replace("extent = 0.0036", "extent = 0.0036\nwavelength = 0.0");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::from_file("does/not/exist.toml").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.toml"));
    }
}
