use log::info;
use ndarray::Array2;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::volume::IntensityVolume;

pub struct VolumeVisualiser {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    gradient: Box<dyn colorgrad::Gradient>,
}

impl VolumeVisualiser {
    pub fn new(output_dir: impl AsRef<Path>, width: u32, height: u32) -> std::io::Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;

        let gradient = Box::new(colorgrad::preset::inferno());

        Ok(Self {
            output_dir,
            width,
            height,
            gradient,
        })
    }

    /// Transverse intensity at depth index `z`
    pub fn plot_slice(
        &self,
        volume: &IntensityVolume,
        z: usize,
        stem: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let depth = volume.depths()[z];
        let title = format!("Intensity at z = {:.3} m (slice {})", depth, z);
        let path = self.output_dir.join(format!("{}_slice_{:04}.png", stem, z));
        self.plot_map(&volume.slice(z), &path, &title, "X (grid points)", "Y (grid points)")?;
        Ok(path)
    }

    /// Longitudinal `xz` cut at row `y`, depth along the horizontal axis
    pub fn plot_section(
        &self,
        volume: &IntensityVolume,
        y: usize,
        stem: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        // Section is indexed [z, x]: z runs along the chart's x axis
        let section = volume.xz_section(y);
        let title = format!("xz plane at y index {}", y);
        let path = self.output_dir.join(format!("{}_section_xz.png", stem));
        self.plot_map(&section, &path, &title, "Z (slice)", "X (grid points)")?;
        Ok(path)
    }

    fn plot_map(
        &self,
        data: &Array2<f32>,
        path: &Path,
        title: &str,
        x_desc: &str,
        y_desc: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (nu, nv) = data.dim();
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(0..nu, 0..nv)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(data.indexed_iter().map(|((u, v), &value)| {
            Rectangle::new([(u, v), (u + 1, v + 1)], self.value_to_color(value).filled())
        }))?;

        root.present()?;
        info!("Saved image: {}", path.display());
        Ok(())
    }

    fn value_to_color(&self, value: f32) -> RGBColor {
        // Volumes are already normalized to [0, 1]
        let color_rgba = self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8();
        RGBColor(color_rgba[0], color_rgba[1], color_rgba[2])
    }
}
