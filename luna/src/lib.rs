#![cfg_attr(not(test), no_std)]

pub mod capsense;
pub mod color;
pub mod effects;
pub mod lamp;
pub mod pacer;
pub mod rng;
#[cfg(any(feature = "stm32f0x1", feature = "stm32f303"))]
pub mod tsc;

/// Tuning for the self-calibrating touch filter
#[derive(Clone, Copy, Debug)]
pub struct CapsenseConfig {
    /// Weight, in fifths, kept from the previous smoothed value on each sample
    pub smooth_keep: i32,
    /// Weight, in tenths, kept from the previous min/max when a sample pulls on them
    pub track_keep: i32,
    /// The hysteresis band is `|max - min| / hysteresis_divisor`
    pub hysteresis_divisor: i32,
    /// No touch is reported until the hysteresis band is at least this wide. Until then the
    /// filter has not seen enough contrast between touched and untouched readings.
    pub min_hysteresis: i32,
}

impl CapsenseConfig {
    const fn default() -> Self {
        Self {
            smooth_keep: 4,
            track_keep: 9,
            hysteresis_divisor: 5,
            min_hysteresis: 20,
        }
    }
}

pub const DEFAULT_CAPSENSE_CONFIG: CapsenseConfig = CapsenseConfig::default();

/// Milliseconds between animation frames for every effect except blink
pub const FRAME_MS: u32 = 30;
