/// xorshift32 generator for animation jitter
///
/// Not suitable for anything but making a candle look alive.
#[derive(Clone, Copy, Debug)]
pub struct Rng(u32);

impl Rng {
    pub const fn new(seed: u32) -> Self {
        // xorshift is stuck at zero forever
        Self(if seed == 0 { 0x6d2b_79f5 } else { seed })
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform-ish value in `lo..hi`. `hi` must be greater than `lo`.
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        lo + (self.next_u32() % (hi - lo) as u32) as i32
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_range_bounds() {
        let mut rng = Rng::new(1);
        let mut seen = [false; 30];
        for _ in 0..10_000 {
            let v = rng.range(10, 40);
            assert!((10..40).contains(&v));
            seen[(v - 10) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "Not every value was produced");
    }

    #[test]
    fn test_zero_seed() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_deterministic() {
        let mut a = Rng::new(1234);
        let mut b = Rng::new(1234);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
