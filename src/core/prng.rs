// Small seeded PRNG used as a stand-in policy: demo runs, benches and
// layout-sweep tests draw random actions from it.
//
// Not cryptographically secure.

use crate::mask::DiscreteActionMask;

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline]
    pub fn next_f32_01(&mut self) -> f32 {
        let x = self.next_u32();
        (x as f32) / (u32::MAX as f32 + 1.0)
    }

    #[inline]
    pub fn gen_range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32_01()
    }

    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64;
        let v = self.next_u64() % span;
        low + v as usize
    }

    /// Continuous actions are conventionally clipped to [-1, 1].
    pub fn fill_continuous(&mut self, out: &mut [f32]) {
        for v in out.iter_mut() {
            *v = self.gen_range_f32(-1.0, 1.0);
        }
    }

    /// One random choice per branch, ignoring any mask.
    pub fn fill_discrete(&mut self, out: &mut [i32], branch_sizes: &[usize]) {
        for (v, &size) in out.iter_mut().zip(branch_sizes) {
            *v = self.gen_range_usize(0, size) as i32;
        }
    }

    /// One random permitted choice per branch of `mask`.
    ///
    /// A branch with nothing permitted falls back to 0; the manager rejects
    /// such masks before they reach a policy when validation is on.
    pub fn sample_discrete(&mut self, out: &mut [i32], mask: &DiscreteActionMask) {
        for (branch, v) in out.iter_mut().enumerate().take(mask.num_branches()) {
            let size = mask.branch_sizes()[branch];
            let permitted = (0..size).filter(|&a| !mask.is_masked(branch, a)).count();
            if permitted == 0 {
                *v = 0;
                continue;
            }
            let pick = self.gen_range_usize(0, permitted);
            *v = (0..size)
                .filter(|&a| !mask.is_masked(branch, a))
                .nth(pick)
                .unwrap_or(0) as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(9);
        let mut b = Prng::new(9);
        let mut xa = [0.0f32; 6];
        let mut xb = [0.0f32; 6];
        a.fill_continuous(&mut xa);
        b.fill_continuous(&mut xb);
        assert_eq!(xa, xb);
        assert!(xa.iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn discrete_choices_stay_in_branch() {
        let mut rng = Prng::new(3);
        let sizes = [3usize, 1, 5];
        let mut out = [0i32; 3];
        for _ in 0..200 {
            rng.fill_discrete(&mut out, &sizes);
            for (v, s) in out.iter().zip(sizes) {
                assert!((*v as usize) < s);
            }
        }
    }

    #[test]
    fn masked_sampling_avoids_disabled_values() {
        let mut mask = DiscreteActionMask::new(vec![4]);
        {
            let mut w = mask.writer(1);
            w.set_action_enabled(0, 0, false).unwrap();
            w.set_action_enabled(0, 2, false).unwrap();
            w.set_action_enabled(0, 3, false).unwrap();
        }
        let mut rng = Prng::new(11);
        let mut out = [0i32; 1];
        for _ in 0..100 {
            rng.sample_discrete(&mut out, &mask);
            assert_eq!(out[0], 1);
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn range_wider_than_u32_stays_in_bounds() {
        let mut rng = Prng::new(5);
        let low = 10usize;
        let high = low + (1usize << 32);
        for _ in 0..100 {
            let v = rng.gen_range_usize(low, high);
            assert!((low..high).contains(&v));
        }
        let v = rng.gen_range_usize(0, usize::MAX);
        assert!(v < usize::MAX);
    }
}
