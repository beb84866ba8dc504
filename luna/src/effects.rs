//! Polled LED animations
//!
//! Every effect is advanced by calling `update` with the current time in milliseconds as often
//! as the main loop likes. A frame is returned only when the effect's own pacer allows it;
//! `None` means the LED should be left as it is.

use core::f32::consts::PI;

use libm::{expf, sinf};

use crate::color::{self, BLACK, RGB8};
use crate::pacer::Pacer;
use crate::rng::Rng;
use crate::FRAME_MS;

/// Flickering warm light
pub struct Candle {
    pacer: Pacer,
    rng: Rng,
    dip: i32,
    dip_delta: i32,
    max_dip: i32,
}

impl Candle {
    pub const fn new(seed: u32) -> Self {
        Self {
            pacer: Pacer::new(),
            rng: Rng::new(seed),
            dip: 0,
            dip_delta: 0,
            max_dip: 0,
        }
    }

    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        if !self.pacer.ready(now, FRAME_MS) {
            return None;
        }
        let frame = RGB8 {
            r: 255,
            g: (125 - self.dip) as u8,
            b: 10,
        };

        // The green channel dips by a random depth and comes back up in equal steps, so `dip`
        // always lands exactly on zero again.
        if self.dip == 0 {
            self.max_dip = self.rng.range(10, 40);
            self.dip_delta = self.max_dip / self.rng.range(2, 5);
            if self.rng.range(0, 4) == 1 {
                self.dip_delta *= 2;
            }
        } else if self.dip > self.max_dip {
            self.dip_delta = -self.dip_delta;
        }
        self.dip += self.dip_delta;

        Some(frame)
    }
}

/// Full hue cycle, once every `duration` ms
pub struct Rainbow {
    pacer: Pacer,
    duration: u32,
    start: u32,
    hue: f32,
}

impl Rainbow {
    pub const fn new(duration: u32) -> Self {
        Self {
            pacer: Pacer::new(),
            duration,
            start: 0,
            hue: 0.0,
        }
    }

    /// Hue of the last frame, in degrees
    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        // Also restarts the cycle after the effect has not been polled for a while
        if now.wrapping_sub(self.start) > self.duration {
            self.start = now;
        }
        if !self.pacer.ready(now, FRAME_MS) {
            return None;
        }
        let elapsed = now.wrapping_sub(self.start) % self.duration;
        self.hue = elapsed as f32 * 360.0 / self.duration as f32;
        Some(color::hsv(self.hue, 1.0, 1.0))
    }
}

/// Smooth breathing of a fixed color
pub struct Pulse {
    pacer: Pacer,
    color: RGB8,
    inc: i32,
    angle: i32,
}

impl Pulse {
    /// `inc` is how many degrees the pulse advances per frame; larger is faster.
    pub const fn new(color: RGB8, inc: i32) -> Self {
        Self {
            pacer: Pacer::new(),
            color,
            inc,
            angle: 0,
        }
    }

    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        if !self.pacer.ready(now, FRAME_MS) {
            return None;
        }
        let frame = color::dim(self.color, pulse_level(self.angle));
        self.angle += self.inc;
        if self.angle >= 360 {
            self.angle = 0;
        }
        Some(frame)
    }
}

/// Brightness factor of the pulse at `angle` degrees
///
/// A half sine between 55 and 305 pushed through a logistic curve, since perceived LED
/// brightness is far from linear in drive level.
pub fn pulse_level(angle: i32) -> f32 {
    let val = 55.0 + 250.0 * sinf(PI * angle as f32 / 360.0);
    1.0 / (1.0 + expf(-(val / 21.0 - 6.0)))
}

const HEARTBEAT_VALUES: [u8; 64] = [
    21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 22, 23, 25, 28, 34, 42, 54, 71, 92, 117,
    145, 175, 203, 228, 246, 255, 254, 242, 220, 191, 157, 121, 87, 58, 34, 17, 6, 1, 0, 2, 5, 9,
    13, 16, 18, 19, 20, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21, 21,
];
const HEARTBEAT_PERIOD: u16 = 125;

/// One slow heartbeat every few seconds
pub struct Heartbeat {
    pacer: Pacer,
    color: RGB8,
    index: u16,
}

impl Heartbeat {
    pub const fn new(color: RGB8) -> Self {
        Self {
            pacer: Pacer::new(),
            color,
            // Start in the resting part of the cycle
            index: HEARTBEAT_VALUES.len() as u16,
        }
    }

    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        if !self.pacer.ready(now, FRAME_MS) {
            return None;
        }
        let i = self.index as usize;
        let level = HEARTBEAT_VALUES.get(i).copied().unwrap_or(HEARTBEAT_VALUES[0]);
        self.index += 1;
        if self.index >= HEARTBEAT_PERIOD {
            self.index = 0;
        }
        Some(color::scale(self.color, level))
    }
}

/// On/off blinking, toggling every `interval` ms
pub struct Blink {
    pacer: Pacer,
    color: RGB8,
    interval: u32,
    on: bool,
}

impl Blink {
    pub const fn new(color: RGB8, interval: u32) -> Self {
        Self {
            pacer: Pacer::new(),
            color,
            interval,
            on: true,
        }
    }

    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        if !self.pacer.ready(now, self.interval) {
            return None;
        }
        let frame = if self.on { self.color } else { BLACK };
        self.on = !self.on;
        Some(frame)
    }
}

/// Any one of the effects, so they can be cycled through
pub enum Effect {
    Candle(Candle),
    Rainbow(Rainbow),
    Pulse(Pulse),
    Heartbeat(Heartbeat),
    Blink(Blink),
}

impl Effect {
    pub fn update(&mut self, now: u32) -> Option<RGB8> {
        match self {
            Effect::Candle(e) => e.update(now),
            Effect::Rainbow(e) => e.update(now),
            Effect::Pulse(e) => e.update(now),
            Effect::Heartbeat(e) => e.update(now),
            Effect::Blink(e) => e.update(now),
        }
    }

    /// Have the next `update` produce a frame immediately
    pub fn restart(&mut self, now: u32) {
        let pacer = match self {
            Effect::Candle(e) => &mut e.pacer,
            Effect::Rainbow(e) => &mut e.pacer,
            Effect::Pulse(e) => &mut e.pacer,
            Effect::Heartbeat(e) => &mut e.pacer,
            Effect::Blink(e) => &mut e.pacer,
        };
        pacer.fire(now);
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    const WHITE: RGB8 = RGB8 { r: 255, g: 255, b: 255 };

    /// Poll an effect every millisecond and collect the frames it emits
    fn frames(effect: &mut Effect, from: u32, to: u32) -> Vec<(u32, RGB8)> {
        (from..to)
            .filter_map(|t| effect.update(t).map(|f| (t, f)))
            .collect()
    }

    #[test]
    fn test_frame_rate() {
        let mut e = Effect::Heartbeat(Heartbeat::new(WHITE));
        let f = frames(&mut e, 0, 300);
        let times: Vec<u32> = f.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, (0..10).map(|i| i * FRAME_MS).collect::<Vec<_>>());
    }

    #[test]
    fn test_candle() {
        let mut e = Effect::Candle(Candle::new(42));
        let f = frames(&mut e, 0, 30_000);
        assert_eq!(f.len(), 1000);
        assert!(f.iter().all(|(_, c)| c.r == 255 && c.b == 10));
        assert!(f.iter().all(|(_, c)| (48..=125).contains(&c.g)));
        // First frame is undimmed, and it does flicker afterward
        assert_eq!(f[0].1.g, 125);
        assert!(f.iter().any(|(_, c)| c.g < 115));
        assert!(f.iter().filter(|(_, c)| c.g == 125).count() > 10);
    }

    #[test]
    fn test_rainbow() {
        let mut r = Rainbow::new(3600);
        assert_eq!(r.update(0), Some(RGB8 { r: 255, g: 0, b: 0 }));
        assert_eq!(r.hue(), 0.0);
        assert_eq!(r.update(10), None);
        assert_eq!(r.update(1200), Some(RGB8 { r: 0, g: 255, b: 0 }));
        assert_eq!(r.hue(), 120.0);
        assert!(r.update(1800).is_some());
        assert_eq!(r.hue(), 180.0);
    }

    #[test]
    fn test_rainbow_restarts_after_gap() {
        let mut r = Rainbow::new(1000);
        r.update(0);
        // Not polled for longer than a full cycle: start over at red
        assert!(r.update(5000).is_some());
        assert_eq!(r.hue(), 0.0);
        assert!(r.update(5250).is_some());
        assert_eq!(r.hue(), 90.0);
    }

    #[test]
    fn test_pulse_level() {
        assert!((pulse_level(0) - 0.0329).abs() < 0.001);
        assert!(pulse_level(180) > 0.999);
        assert!(pulse_level(90) > pulse_level(45));
        assert!((pulse_level(90) - pulse_level(270)).abs() < 0.001);
    }

    #[test]
    fn test_pulse() {
        let mut e = Effect::Pulse(Pulse::new(WHITE, 6));
        let f = frames(&mut e, 0, 60 * FRAME_MS);
        assert_eq!(f.len(), 60);
        assert_eq!(f[0].1, RGB8 { r: 8, g: 8, b: 8 });
        assert_eq!(f[30].1, RGB8 { r: 254, g: 254, b: 254 });
        // Back to the start after a full turn
        let next = e.update(60 * FRAME_MS).unwrap();
        assert_eq!(next, f[0].1);
    }

    #[test]
    fn test_heartbeat() {
        let red = RGB8 { r: 255, g: 0, b: 0 };
        let mut e = Effect::Heartbeat(Heartbeat::new(red));
        let f = frames(&mut e, 0, 250 * FRAME_MS);
        let levels: Vec<u8> = f.iter().map(|(_, c)| c.r).collect();
        assert_eq!(levels.len(), 250);
        // Resting phase first
        assert!(levels[..61].iter().all(|l| *l == 21));
        // Then one beat through the table, peaking at full brightness
        assert_eq!(&levels[61..125], &HEARTBEAT_VALUES[..]);
        assert_eq!(levels[61 + 28], 255);
        // And the cycle repeats
        assert_eq!(&levels[125..250], &levels[0..125]);
        assert!(f.iter().all(|(_, c)| c.g == 0 && c.b == 0));
    }

    #[test]
    fn test_blink() {
        let green = RGB8 { r: 0, g: 64, b: 0 };
        let mut e = Effect::Blink(Blink::new(green, 200));
        let f = frames(&mut e, 0, 1000);
        assert_eq!(
            f,
            vec![(0, green), (200, BLACK), (400, green), (600, BLACK), (800, green)]
        );
    }

    #[test]
    fn test_restart() {
        let mut e = Effect::Blink(Blink::new(WHITE, 500));
        assert!(e.update(0).is_some());
        assert!(e.update(100).is_none());
        e.restart(100);
        assert_eq!(e.update(100), Some(BLACK));
    }
}
