use std::ops::{
    Index,
    IndexMut,
};

use crate::{
    fdtd::Resolution,
    material::PhysicalConstants,
};

/// Buffer holding 2 values.
///
/// One value is the current value, the other one is the value from the previous
/// step. Which one is which depends on the [`SwapBufferIndex`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SwapBuffer<T> {
    buffer: [T; 2],
}

impl<T> From<[T; 2]> for SwapBuffer<T> {
    fn from(value: [T; 2]) -> Self {
        Self { buffer: value }
    }
}

impl<T> SwapBuffer<T> {
    pub fn from_fn(mut f: impl FnMut(SwapBufferIndex) -> T) -> Self {
        Self::from(std::array::from_fn::<T, 2, _>(|index| {
            f(SwapBufferIndex { index })
        }))
    }

    /// Returns the value at `index` and the other one.
    pub fn pair_mut(&mut self, index: SwapBufferIndex) -> (&mut T, &mut T) {
        let [first, second] = &mut self.buffer;
        if index.index == 0 {
            (first, second)
        }
        else {
            (second, first)
        }
    }
}

impl<T> Index<SwapBufferIndex> for SwapBuffer<T> {
    type Output = T;

    fn index(&self, index: SwapBufferIndex) -> &Self::Output {
        &self.buffer[index.index]
    }
}

impl<T> IndexMut<SwapBufferIndex> for SwapBuffer<T> {
    fn index_mut(&mut self, index: SwapBufferIndex) -> &mut Self::Output {
        &mut self.buffer[index.index]
    }
}

/// Index into a [`SwapBuffer`].
///
/// This can be derived from the simulation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapBufferIndex {
    index: usize,
}

impl SwapBufferIndex {
    pub fn from_tick(tick: usize) -> Self {
        Self { index: tick % 2 }
    }

    pub fn other(&self) -> Self {
        Self {
            index: (self.index + 1) % 2,
        }
    }
}

/// Per-sample coefficients of the leapfrog update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UpdateCoefficients {
    /// `(c dt / (n dz))^2`
    pub courant_squared: f64,
    /// `c^2 dt sigma mu_0 / epsilon_r`
    pub loss: f64,
}

impl UpdateCoefficients {
    pub fn new(
        resolution: &Resolution,
        physical_constants: &PhysicalConstants,
        wave_speed: f64,
        relative_permittivity: f64,
        electrical_conductivity: f64,
    ) -> Self {
        let courant = wave_speed * resolution.temporal / resolution.spatial;
        let courant_squared = courant * courant / relative_permittivity;

        // (c dt)^2 / epsilon * sigma mu_0 / dt
        let loss = wave_speed * wave_speed * resolution.temporal * electrical_conductivity
            * physical_constants.vacuum_permeability
            / relative_permittivity;

        Self {
            courant_squared,
            loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{
        fdtd::{
            Resolution,
            util::{
                SwapBuffer,
                SwapBufferIndex,
                UpdateCoefficients,
            },
        },
        material::PhysicalConstants,
    };

    #[test]
    fn it_alternates_buffers() {
        let mut buffer = SwapBuffer::from([1, 2]);
        let current = SwapBufferIndex::from_tick(0);
        let next = current.other();
        assert_eq!(buffer[current], 1);
        assert_eq!(buffer[next], 2);
        assert_eq!(SwapBufferIndex::from_tick(1), next);

        let (a, b) = buffer.pair_mut(next);
        *a = 20;
        *b = 10;
        assert_eq!(buffer[current], 10);
        assert_eq!(buffer[next], 20);
    }

    #[test]
    fn it_computes_courant_number() {
        let resolution = Resolution {
            spatial: 2.0,
            temporal: 2.0 / (2.0 * 3e8),
        };
        let coefficients =
            UpdateCoefficients::new(&resolution, &PhysicalConstants::SI, 3e8, 4.0, 0.0);

        // (0.5 / 2)^2
        assert_relative_eq!(coefficients.courant_squared, 0.0625, max_relative = 1e-12);
        assert_eq!(coefficients.loss, 0.0);
    }

    #[test]
    fn it_computes_loss() {
        let resolution = Resolution {
            spatial: 1.0,
            temporal: 1.0,
        };
        let coefficients =
            UpdateCoefficients::new(&resolution, &PhysicalConstants::REDUCED, 2.0, 2.0, 0.5);
        assert_relative_eq!(coefficients.loss, 1.0);
    }
}
