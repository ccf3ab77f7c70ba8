/// Uniform 1D grid of `len` samples covering `[0, length)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    /// Number of samples (`N`)
    pub points: usize,
    /// Physical length (`L`)
    pub length: f64,
}

impl Grid {
    pub fn new(points: usize, length: f64) -> Self {
        Self { points, length }
    }

    pub fn len(&self) -> usize {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// `dz = L / N`
    pub fn spacing(&self) -> f64 {
        self.length / self.points as f64
    }

    pub fn position(&self, index: usize) -> f64 {
        index as f64 * self.spacing()
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = f64> + Clone + use<> {
        let spacing = self.spacing();
        (0..self.points).map(move |index| index as f64 * spacing)
    }

    /// Index of the sample closest to `position`, if it lies on the grid.
    pub fn index_of(&self, position: f64) -> Option<usize> {
        if !(0.0..self.length).contains(&position) {
            return None;
        }
        let index = (position / self.spacing()).round() as usize;
        Some(index.min(self.points.saturating_sub(1)))
    }

    pub fn is_interior(&self, index: usize) -> bool {
        index > 0 && index + 1 < self.points
    }
}
