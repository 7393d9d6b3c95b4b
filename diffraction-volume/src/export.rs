//! Raw volume files for external renderers.
//!
//! `<stem>.raw` holds little-endian `f32` samples in buffer order
//! (`z * N * N + x * N + y`); `<stem>.toml` records the shape and the physical
//! parameters needed to place the volume in a scene.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::aperture::ApertureSpec;
use crate::error::{DiffractionError, Result};
use crate::volume::{IntensityVolume, VolumeShape};

/// Sidecar written next to the raw samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHeader {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub extent: f64,
    pub wavelength: f64,
    pub raw_max: f32, // Peak intensity the samples were divided by
    pub depths: Vec<f64>,
}

impl VolumeHeader {
    pub fn new(volume: &IntensityVolume, spec: &ApertureSpec) -> Self {
        let shape = volume.dims();
        let depths = volume.depths();
        Self {
            width: shape.width,
            height: shape.height,
            depth: shape.depth,
            z_min: depths.first().copied().unwrap_or_default(),
            z_max: depths.last().copied().unwrap_or_default(),
            extent: spec.extent,
            wavelength: spec.wavelength,
            raw_max: volume.raw_max(),
            depths: depths.to_vec(),
        }
    }

    pub fn shape(&self) -> VolumeShape {
        VolumeShape {
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }
}

/// Paths of an exported volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFiles {
    pub raw: PathBuf,
    pub header: PathBuf,
}

impl VolumeFiles {
    pub fn new(directory: impl AsRef<Path>, stem: &str) -> Self {
        let directory = directory.as_ref();
        Self {
            raw: directory.join(format!("{stem}.raw")),
            header: directory.join(format!("{stem}.toml")),
        }
    }
}

pub fn write_volume(
    volume: &IntensityVolume,
    spec: &ApertureSpec,
    directory: impl AsRef<Path>,
    stem: &str,
) -> Result<VolumeFiles> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;
    let files = VolumeFiles::new(directory, stem);

    let mut writer = BufWriter::new(fs::File::create(&files.raw)?);
    for sample in volume.as_slice() {
        writer.write_all(&sample.to_le_bytes())?;
    }
    writer.flush()?;

    let header = VolumeHeader::new(volume, spec);
    let text = toml::to_string_pretty(&header).map_err(|e| DiffractionError::Format(e.to_string()))?;
    fs::write(&files.header, text)?;

    info!(
        "Wrote {} samples to {} ({}x{}x{})",
        volume.as_slice().len(),
        files.raw.display(),
        header.width,
        header.height,
        header.depth
    );
    Ok(files)
}

/// Load a volume written by [`write_volume`].
///
/// The raw file must hold exactly `width * height * depth` samples.
pub fn read_volume(files: &VolumeFiles) -> Result<(VolumeHeader, IntensityVolume)> {
    let text = fs::read_to_string(&files.header)?;
    let header: VolumeHeader =
        toml::from_str(&text).map_err(|e| DiffractionError::Format(e.to_string()))?;
    let shape = header.shape();
    let expected = shape
        .checked_len()
        .and_then(|len| len.checked_mul(4))
        .ok_or_else(|| DiffractionError::Format(format!("volume dimensions overflow: {shape:?}")))?;

    let bytes = fs::read(&files.raw)?;
    if bytes.len() != expected {
        return Err(DiffractionError::ShapeMismatch {
            expected,
            got: bytes.len(),
        });
    }

    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let volume = IntensityVolume::from_raw(shape, data, header.depths.clone(), header.raw_max)?;
    Ok((header, volume))
}
