/// Square sampling grid centred on the optical axis.
///
/// Sample `i` sits at `-extent/2 + i * dx`, so index `n / 2` is the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub n: usize,      // Number of samples per side
    pub extent: f64,   // Physical width of the window (meters)
}

impl Grid {
    pub fn new(n: usize, extent: f64) -> Self {
        Grid { n, extent }
    }

    /// Sample spacing, always derived from the current `n` and `extent`
    pub fn dx(&self) -> f64 {
        self.extent / self.n as f64
    }

    pub fn coord(&self, i: usize) -> f64 {
        // Convert grid index to physical coordinate
        -0.5 * self.extent + i as f64 * self.dx()
    }

    pub fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n
    }

    pub fn centre(&self) -> usize {
        self.n / 2
    }

    /// Spatial frequency of FFT bin `i` (cycles per meter).
    ///
    /// The FFT puts zero frequency at bin 0; shifting by `n/2` gives the
    /// centred index `c`, and the frequency is `(c - n/2) / (n * dx)`.
    pub fn frequency(&self, i: usize) -> f64 {
        let half = self.n / 2;
        let centred = (i + half) % self.n;
        (centred as f64 - half as f64) / (self.n as f64 * self.dx())
    }

    /// Frequencies for every bin, in FFT order
    pub fn frequencies(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.frequency(i)).collect()
    }
}
