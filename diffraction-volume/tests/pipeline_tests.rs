use std::f64::consts::PI;

use approx::assert_relative_eq;
use diffraction_volume::{
    initialize, ApertureSpec, ComplexField, DepthSampling, FresnelPropagator, GenerationOptions,
    Generator, IntensityVolume,
};
use rustfft::num_complex::Complex64;

const WAVELENGTH: f64 = 632.8e-9;

fn scenario() -> (ApertureSpec, DepthSampling) {
    (
        ApertureSpec::circular(0.00025, 64, 0.001, WAVELENGTH),
        DepthSampling::new(0.01, 0.05, 5),
    )
}

/// Share of a slice's energy falling outside `radius` of the axis
fn energy_outside(volume: &IntensityVolume, spec: &ApertureSpec, z: usize) -> f64 {
    let grid = spec.grid();
    let slice = volume.slice(z);
    let mut inside = 0.0;
    let mut total = 0.0;
    for ((i, j), &v) in slice.indexed_iter() {
        let (x, y) = (grid.coord(i), grid.coord(j));
        total += v as f64;
        if x * x + y * y <= spec.radius * spec.radius {
            inside += v as f64;
        }
    }
    1.0 - inside / total
}

#[test]
fn example_scenario_produces_normalized_slices() {
    let (spec, sampling) = scenario();
    let volume = Generator::default().generate(&spec, &sampling).unwrap();

    let dims = volume.dims();
    assert_eq!((dims.width, dims.height, dims.depth), (64, 64, 5));
    assert_eq!(volume.as_slice().len(), 64 * 64 * 5);
    assert_relative_eq!(volume.max(), 1.0, epsilon = 1e-6);
    assert!(volume.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));

    for (got, want) in volume.depths().iter().zip([0.01, 0.02, 0.03, 0.04, 0.05]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn light_spreads_with_depth() {
    let (spec, sampling) = scenario();
    let volume = Generator::default().generate(&spec, &sampling).unwrap();

    let near = energy_outside(&volume, &spec, 0);
    let far = energy_outside(&volume, &spec, 4);
    assert!(far > near, "outside share near={near}, far={far}");
}

#[test]
fn repeated_runs_are_identical() {
    let (spec, sampling) = scenario();
    let generator = Generator::default();
    let first = generator.generate(&spec, &sampling).unwrap();
    let second = generator.generate(&spec, &sampling).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parallel_generation_matches_serial() {
    let (spec, sampling) = scenario();
    let serial = Generator::default().generate(&spec, &sampling).unwrap();
    let parallel = Generator::new(GenerationOptions {
        parallel: true,
        yield_every: 2,
    })
    .generate(&spec, &sampling)
    .unwrap();

    for (a, b) in serial.as_slice().iter().zip(parallel.as_slice()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn centred_circular_aperture_gives_symmetric_slices() {
    // Radius kept off the sample lattice so no point sits exactly on the rim
    let (_, sampling) = scenario();
    let spec = ApertureSpec::circular(0.00026, 64, 0.001, WAVELENGTH);
    let volume = Generator::default().generate(&spec, &sampling).unwrap();
    let c = spec.grid().centre() as isize;
    let at = |slice: &ndarray::Array2<f32>, a: isize, b: isize| {
        slice[[(c + a) as usize, (c + b) as usize]]
    };

    for z in 0..sampling.num_z {
        let slice = volume.slice(z);
        for a in -20..=20 {
            for b in -20..=20 {
                let v = at(&slice, a, b);
                // quarter turns and mirrors about the axis
                assert_relative_eq!(v, at(&slice, -b, a), epsilon = 1e-5);
                assert_relative_eq!(v, at(&slice, -a, -b), epsilon = 1e-5);
                assert_relative_eq!(v, at(&slice, b, a), epsilon = 1e-5);
            }
        }
    }
}

#[test]
fn zero_distance_conserves_aperture_energy() {
    let (spec, _) = scenario();
    let aperture = initialize(&spec).unwrap();
    let mut propagator = FresnelPropagator::new(spec.grid(), spec.wavelength);
    let field = propagator.propagate(&aperture, 0.0);
    assert_relative_eq!(
        field.total_intensity(),
        aperture.total_intensity(),
        max_relative = 1e-10
    );
}

#[test]
fn gaussian_beam_halves_on_axis_at_rayleigh_distance() {
    // w0 = 0.2 mm sampled at ~31 um inside a 4 mm window
    let w0 = 0.0002;
    let grid = diffraction_volume::Grid::new(128, 0.004);
    let beam = ComplexField::from_fn(grid, |x, y| {
        Complex64::new((-(x * x + y * y) / (w0 * w0)).exp(), 0.0)
    });
    let rayleigh = PI * w0 * w0 / WAVELENGTH;

    let mut propagator = FresnelPropagator::new(grid, WAVELENGTH);
    let field = propagator.propagate(&beam, rayleigh);
    let c = grid.centre();

    let on_axis = field.values[[c, c]].norm_sqr();
    assert_relative_eq!(on_axis, 0.5, epsilon = 1e-3);

    // The profile stays Gaussian with radius w0 * sqrt(2)
    let w = w0 * 2f64.sqrt();
    let offset = (w / grid.dx()).round() as usize;
    let r = offset as f64 * grid.dx();
    let expected = on_axis * (-2.0 * r * r / (w * w)).exp();
    assert_relative_eq!(field.values[[c + offset, c]].norm_sqr(), expected, max_relative = 1e-2);
}
