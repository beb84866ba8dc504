use crate::capsense::Capsense;
use crate::color::{BLACK, RGB8};
use crate::effects::{Blink, Candle, Effect, Heartbeat, Pulse, Rainbow};
use crate::CapsenseConfig;

/// Progress of the touch calibration sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the first touch. The LED blinks red until the pad is touched.
    AwaitTouch,
    /// Touch seen, waiting for the finger to lift. The LED is solid green.
    AwaitRelease,
    /// Calibrated; playing effects
    Running,
}

/// Effect playlist and touch behavior
#[derive(Clone, Copy, Debug)]
pub struct LampConfig {
    /// Holding the pad this long starts a new calibration
    pub recalibrate_hold_ms: u32,
    /// Seed for the candle flicker, mixed with the time the candle is started
    pub seed: u32,
    pub rainbow_ms: u32,
    pub pulse_color: RGB8,
    pub pulse_inc: i32,
    pub heartbeat_color: RGB8,
    pub blink_color: RGB8,
    pub blink_ms: u32,
}

impl LampConfig {
    const fn default() -> Self {
        Self {
            recalibrate_hold_ms: 3000,
            seed: 0x1d87_2b41,
            rainbow_ms: 10_000,
            pulse_color: RGB8 { r: 0, g: 80, b: 255 },
            pulse_inc: 6,
            heartbeat_color: RGB8 { r: 255, g: 0, b: 0 },
            blink_color: RGB8 { r: 255, g: 255, b: 255 },
            blink_ms: 500,
        }
    }

    /// Build effect `index` of the playlist
    pub fn effect(&self, index: usize, now: u32) -> Effect {
        match index % EFFECT_COUNT {
            0 => Effect::Candle(Candle::new(self.seed ^ now)),
            1 => Effect::Rainbow(Rainbow::new(self.rainbow_ms)),
            2 => Effect::Pulse(Pulse::new(self.pulse_color, self.pulse_inc)),
            3 => Effect::Heartbeat(Heartbeat::new(self.heartbeat_color)),
            _ => Effect::Blink(Blink::new(self.blink_color, self.blink_ms)),
        }
    }
}

pub const DEFAULT_LAMP_CONFIG: LampConfig = LampConfig::default();
pub const EFFECT_COUNT: usize = 5;

pub const PROMPT_COLOR: RGB8 = RGB8 { r: 64, g: 0, b: 0 };
pub const PROMPT_BLINK_MS: u32 = 200;
pub const CONFIRM_COLOR: RGB8 = RGB8 { r: 0, g: 64, b: 0 };

/// Ties the touch filter to the LED
///
/// Starts by walking the user through calibration, then plays effects. A tap advances to the
/// next effect when the finger lifts, and a long hold starts calibration over.
pub struct Lamp<'a> {
    pub capsense: Capsense<'a>,
    stage: Stage,
    config: &'a LampConfig,
    prompt: Effect,
    effect: Effect,
    index: usize,
    touched: bool,
    touch_start: u32,
}

impl<'a> Lamp<'a> {
    pub fn new(
        config: Option<&'a LampConfig>,
        capsense: Option<&'a CapsenseConfig>,
        now: u32,
    ) -> Self {
        let config = config.unwrap_or(&DEFAULT_LAMP_CONFIG);
        let mut effect = config.effect(0, now);
        effect.restart(now);
        let mut prompt = Effect::Blink(Blink::new(PROMPT_COLOR, PROMPT_BLINK_MS));
        prompt.restart(now);
        Self {
            capsense: Capsense::new(capsense),
            stage: Stage::AwaitTouch,
            config,
            prompt,
            effect,
            index: 0,
            touched: false,
            touch_start: now,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Playlist position of the current effect
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance the lamp
    ///
    /// `reading` is the latest sensor signal, or None if the sensor could not be read, in which
    /// case the touch state is carried over unchanged. Returns the color to show, if it changed.
    pub fn tick(&mut self, now: u32, reading: Option<u16>) -> Option<RGB8> {
        let touched = match reading {
            Some(raw) => self.capsense.push(raw as i32),
            None => self.capsense.touched(),
        };

        match self.stage {
            Stage::AwaitTouch => {
                if touched {
                    self.stage = Stage::AwaitRelease;
                    Some(CONFIRM_COLOR)
                } else {
                    self.prompt.update(now)
                }
            }
            Stage::AwaitRelease => {
                if touched {
                    None
                } else {
                    self.stage = Stage::Running;
                    self.touched = false;
                    self.effect.restart(now);
                    self.effect.update(now)
                }
            }
            Stage::Running => {
                let held = now.wrapping_sub(self.touch_start);
                if touched && !self.touched {
                    self.touch_start = now;
                } else if touched && held >= self.config.recalibrate_hold_ms {
                    self.recalibrate(now);
                    return Some(BLACK);
                } else if !touched && self.touched {
                    self.next_effect(now);
                }
                self.touched = touched;
                self.effect.update(now)
            }
        }
    }

    /// Drop the learned touch levels and go back to asking for a touch
    pub fn recalibrate(&mut self, now: u32) {
        self.capsense.reset();
        self.stage = Stage::AwaitTouch;
        self.touched = false;
        self.prompt = Effect::Blink(Blink::new(PROMPT_COLOR, PROMPT_BLINK_MS));
        self.prompt.restart(now);
    }

    pub fn next_effect(&mut self, now: u32) {
        self.index = (self.index + 1) % EFFECT_COUNT;
        self.effect = self.config.effect(self.index, now);
        self.effect.restart(now);
    }
}
