use crate::{CapsenseConfig, DEFAULT_CAPSENSE_CONFIG};

/// Touch detector for a single capacitive pad
///
/// The filter learns the touched and untouched signal levels on its own: `max` and `min` drift
/// toward readings above and below the midpoint, and a touch is reported when the smoothed
/// reading clears the midpoint by a hysteresis band proportional to their spread. Readings are
/// expected to rise with capacitance.
pub struct Capsense<'a> {
    pub raw: i32,
    pub smooth: i32,
    pub max: Option<i32>,
    pub min: Option<i32>,
    pub limit: i32,
    pub hysteresis: i32,
    pub config: &'a CapsenseConfig,
}

impl<'a> Capsense<'a> {
    pub fn new(config: Option<&'a CapsenseConfig>) -> Self {
        Self {
            raw: 0,
            smooth: 0,
            max: None,
            min: None,
            limit: 0,
            hysteresis: 0,
            config: config.unwrap_or(&DEFAULT_CAPSENSE_CONFIG),
        }
    }

    /// Process a new reading
    ///
    /// Returns true only if the filter is calibrated and the pad is surely touched.
    pub fn push(&mut self, raw: i32) -> bool {
        let c = self.config;
        self.raw = raw;
        self.smooth = (self.smooth * c.smooth_keep + raw * (5 - c.smooth_keep)) / 5;

        // The midpoint comes from the bounds as they were before this reading
        let max = self.max.unwrap_or(0);
        let min = self.min.unwrap_or(0);
        self.limit = (max + min) / 2;

        let mut max = self.max.unwrap_or(raw);
        if raw > self.limit {
            max = track(max, raw, c.track_keep);
        }
        let mut min = self.min.unwrap_or(raw);
        if raw < self.limit {
            min = track(min, raw, c.track_keep);
        }
        self.max = Some(max);
        self.min = Some(min);

        self.hysteresis = (max - min).abs() / c.hysteresis_divisor;

        self.touched()
    }

    /// Touch decision for the current state, without taking a new reading
    pub fn touched(&self) -> bool {
        self.calibrated() && self.smooth > self.limit + self.hysteresis
    }

    pub fn calibrated(&self) -> bool {
        self.hysteresis >= self.config.min_hysteresis
    }

    /// Forget everything learned so far
    pub fn reset(&mut self) {
        self.smooth = 0;
        self.max = None;
        self.min = None;
        self.limit = 0;
        self.hysteresis = 0;
    }
}

/// Turn a charge-transfer count into a reading that rises with capacitance
///
/// A finger adds capacitance, so fewer transfers fill the sampling capacitor and the count falls.
/// Counts above `max_count` saturate to zero.
pub fn signal(count: u16, max_count: u16) -> u16 {
    max_count.saturating_sub(count)
}

fn track(bound: i32, raw: i32, keep: i32) -> i32 {
    (bound * keep + raw * (10 - keep)) / 10
}

#[cfg(test)]
pub mod test {
    use super::*;

    const IDLE: i32 = 200;
    const TOUCH: i32 = 1200;

    fn settle(c: &mut Capsense, raw: i32, n: usize) -> bool {
        let mut out = false;
        for _ in 0..n {
            out = c.push(raw);
        }
        out
    }

    #[test]
    fn test_first_sample_seeds_bounds() {
        let mut c = Capsense::new(None);
        assert!(!c.push(IDLE));
        assert_eq!(c.max, Some(IDLE));
        assert_eq!(c.min, Some(IDLE));
        assert_eq!(c.smooth, IDLE / 5);
        assert_eq!(c.hysteresis, 0);
    }

    #[test]
    fn test_limit_uses_previous_bounds() {
        let mut c = Capsense::new(None);
        c.push(IDLE);
        // Nothing learned before the first reading
        assert_eq!(c.limit, 0);
        c.push(IDLE);
        assert_eq!(c.limit, IDLE);

        // The touch reading moves max, but not the midpoint it was compared against
        c.push(TOUCH);
        assert_eq!(c.limit, IDLE);
        assert_eq!(c.max, Some((IDLE * 9 + TOUCH) / 10));
        c.push(TOUCH);
        assert_eq!(c.limit, (IDLE + (IDLE * 9 + TOUCH) / 10) / 2);
    }

    #[test]
    fn test_signal() {
        assert_eq!(signal(0, 8191), 8191);
        assert_eq!(signal(8191, 8191), 0);
        assert_eq!(signal(9000, 8191), 0);
        assert_eq!(signal(7000, 8191), 1191);
    }

    #[test]
    fn test_uncalibrated_never_touches() {
        let mut c = Capsense::new(None);
        // A constant reading never opens up a hysteresis band
        assert!(!settle(&mut c, IDLE, 200));
        assert!(!c.calibrated());
    }

    #[test]
    fn test_calibrates_on_first_touch() {
        let mut c = Capsense::new(None);
        settle(&mut c, IDLE, 50);
        assert!(!c.calibrated());

        assert!(settle(&mut c, TOUCH, 30), "Touch not detected");
        assert!(c.calibrated());
        assert!(c.max.unwrap() > c.min.unwrap());

        assert!(!settle(&mut c, IDLE, 30), "Release not detected");

        // Once learned, a second touch is picked up again
        assert!(settle(&mut c, TOUCH, 30));
    }

    #[test]
    fn test_smoothing_delays_detection() {
        let mut c = Capsense::new(None);
        settle(&mut c, IDLE, 50);
        settle(&mut c, TOUCH, 30);
        settle(&mut c, IDLE, 30);
        assert!(!c.touched());

        // A single spike is absorbed by the smoothing
        assert!(!c.push(TOUCH));
    }

    #[test]
    fn test_hysteresis_floor() {
        let config = CapsenseConfig {
            min_hysteresis: 1000,
            ..DEFAULT_CAPSENSE_CONFIG
        };
        let mut c = Capsense::new(Some(&config));
        settle(&mut c, IDLE, 50);
        assert!(!settle(&mut c, TOUCH, 30));
        assert!(!c.calibrated());
    }

    #[test]
    fn test_reset() {
        let mut c = Capsense::new(None);
        settle(&mut c, IDLE, 50);
        settle(&mut c, TOUCH, 30);
        assert!(c.calibrated());

        c.reset();
        assert!(!c.calibrated());
        assert_eq!(c.max, None);
        assert_eq!(c.min, None);
        assert_eq!(c.smooth, 0);
        assert!(!c.push(TOUCH));
        assert_eq!(c.max, Some(TOUCH));
    }
}
