//! Injectable random source for every stochastic decision in the simulation.
//!
//! Kills, witness rolls, sabotage picks, role shuffles, task sampling, idle
//! durations, wander targets, discussion lines and votes all draw from a single
//! [`RandomSource`] owned by the engine. Seeding it makes a whole round
//! reproducible.

/// Source of uniformly distributed random numbers.
///
/// Only [`next_u32`](RandomSource::next_u32) is required; the remaining
/// helpers derive from it.
pub trait RandomSource: Send {
    /// Generate the next 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Bernoulli trial that succeeds with probability `p`.
    ///
    /// `p <= 0` never succeeds and `p >= 1` always does.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in `[0, len)`. Returns 0 for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f64() * len as f64) as usize % len
    }

    /// Uniform value in `[min, max]` inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (u64::from(self.next_u32()) % span) as u32
    }
}

/// Pick a uniformly random element, or `None` for an empty slice.
pub fn pick<'a, T, R: RandomSource + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.index(items.len()))
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64 bits of state, 32 bits of output per step.
/// Same seed, same sequence.
#[derive(Clone, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }
}
