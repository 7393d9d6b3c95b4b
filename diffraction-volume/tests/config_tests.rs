use std::path::PathBuf;

use diffraction_volume::config::Config;
use diffraction_volume::ApertureShape;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("configs")
        .join(name)
}

#[test]
fn circular_config_loads() {
    let config = Config::from_file(shipped("circular.toml")).unwrap();
    assert_eq!(config.aperture.shape, ApertureShape::Circular);
    assert_eq!(config.aperture.samples, 256);
    assert_eq!(config.depth.num_z, 100);
    assert!(config.generation.parallel);
    assert_eq!(config.output.render_slices, vec![0, 50, 99]);

    let spec = config.aperture.spec();
    assert!(spec.validate().is_ok());
    assert!(config.depth.sampling().validate().is_ok());
}

#[test]
fn slit_config_loads_with_defaults() {
    let config = Config::from_file(shipped("slit.toml")).unwrap();
    assert_eq!(config.aperture.shape, ApertureShape::HorizontalSlit);
    assert_eq!(config.generation.yield_every, 10);
    assert!(!config.generation.parallel);
    assert!(config.output.render_section);
    assert_eq!(config.output.image_width, 800);
}
