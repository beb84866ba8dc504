//! Single-pad driver for the STM32 Touch Sensing Controller.
//!
//! The lamp only has one pad, so this reads exactly one sense channel against one sampling
//! capacitor channel in the same group. The TSC registers are accessed directly through the PAC
//! rather than handed in by the application, which avoids tying this crate to the PAC version
//! the HAL was built against. Nothing else in the application may touch the TSC.

use crate::capsense::signal;

#[cfg(feature = "stm32f0x1")]
use stm32f0::stm32f0x1 as pac;
#[cfg(feature = "stm32f303")]
use stm32f3::stm32f303 as pac;

/// A TSC I/O, encoded as `(group << 4) + io`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    G1Io1 = (1 << 4) + 1,
    G1Io2 = (1 << 4) + 2,
    G1Io3 = (1 << 4) + 3,
    G1Io4 = (1 << 4) + 4,
    G2Io1 = (2 << 4) + 1,
    G2Io2 = (2 << 4) + 2,
    G2Io3 = (2 << 4) + 3,
    G2Io4 = (2 << 4) + 4,
    G3Io1 = (3 << 4) + 1,
    G3Io2 = (3 << 4) + 2,
    G3Io3 = (3 << 4) + 3,
    G3Io4 = (3 << 4) + 4,
    G4Io1 = (4 << 4) + 1,
    G4Io2 = (4 << 4) + 2,
    G4Io3 = (4 << 4) + 3,
    G4Io4 = (4 << 4) + 4,
    G5Io1 = (5 << 4) + 1,
    G5Io2 = (5 << 4) + 2,
    G5Io3 = (5 << 4) + 3,
    G5Io4 = (5 << 4) + 4,
    G6Io1 = (6 << 4) + 1,
    G6Io2 = (6 << 4) + 2,
    G6Io3 = (6 << 4) + 3,
    G6Io4 = (6 << 4) + 4,
}

impl Channel {
    /// Group number, starting at 1
    pub const fn group(self) -> u8 {
        (self as u8) >> 4
    }

    /// I/O number within the group, starting at 1
    pub const fn io(self) -> u8 {
        (self as u8) & 0xf
    }

    /// Bit for this I/O in the IOSCR/IOCCR style registers
    const fn mask(self) -> u32 {
        1 << ((self.group() as u32 - 1) * 4 + self.io() as u32 - 1)
    }
}

/// One touch pad: the sampling capacitor I/O and the electrode I/O
#[derive(Clone, Copy, Debug)]
pub struct Sensor {
    pub sample: Channel,
    pub channel: Channel,
}

impl Sensor {
    /// Both I/Os must be distinct members of the same group
    pub const fn new(sample: Channel, channel: Channel) -> Self {
        assert!(sample.group() == channel.group());
        assert!(sample.io() != channel.io());
        Self { sample, channel }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub clock_prescale: Option<ClockPrescaler>,
    pub max_count: Option<MaxCount>,
    pub charge_transfer_high: Option<ChargeDischargeTime>,
    pub charge_transfer_low: Option<ChargeDischargeTime>,
}

#[derive(Clone, Copy, Debug)]
pub enum ClockPrescaler {
    Hclk = 0b000,
    HclkDiv2 = 0b001,
    HclkDiv4 = 0b010,
    HclkDiv8 = 0b011,
    HclkDiv16 = 0b100,
    HclkDiv32 = 0b101,
    HclkDiv64 = 0b110,
    HclkDiv128 = 0b111,
}

#[derive(Clone, Copy, Debug)]
/// How many TSC clock cycles are spent charging / discharging
pub enum ChargeDischargeTime {
    C1 = 0b0000,
    C2 = 0b0001,
    C3 = 0b0010,
    C4 = 0b0011,
    C5 = 0b0100,
    C6 = 0b0101,
    C7 = 0b0110,
    C8 = 0b0111,
    C9 = 0b1000,
    C10 = 0b1001,
    C11 = 0b1010,
    C12 = 0b1011,
    C13 = 0b1100,
    C14 = 0b1101,
    C15 = 0b1110,
    C16 = 0b1111,
}

#[derive(Clone, Copy, Debug)]
pub enum MaxCount {
    U255 = 0b000,
    U511 = 0b001,
    U1023 = 0b010,
    U2047 = 0b011,
    U4095 = 0b100,
    U8191 = 0b101,
    U16383 = 0b110,
}

impl MaxCount {
    pub fn to_count(&self) -> u16 {
        match self {
            Self::U255 => 255,
            Self::U511 => 511,
            Self::U1023 => 1023,
            Self::U2047 => 2047,
            Self::U4095 => 4095,
            Self::U8191 => 8191,
            Self::U16383 => 16383,
        }
    }
}

const DEFAULT_CTPH: ChargeDischargeTime = ChargeDischargeTime::C2;
const DEFAULT_CTPL: ChargeDischargeTime = ChargeDischargeTime::C2;
const DEFAULT_PRESCALE: ClockPrescaler = ClockPrescaler::HclkDiv16;
const DEFAULT_MAX_COUNT: MaxCount = MaxCount::U8191;

pub struct Tsc {
    tsc: &'static pac::tsc::RegisterBlock,
    max_count: u16,
}

impl Tsc {
    pub fn new(config: Option<Config>) -> Self {
        // Enable and reset the TSC periph clock
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.ahbenr.modify(|_, w| w.tscen().set_bit());
        rcc.ahbrstr.modify(|_, w| w.tscrst().set_bit());
        rcc.ahbrstr.modify(|_, w| w.tscrst().clear_bit());

        let config = config.unwrap_or(Config {
            clock_prescale: None,
            max_count: None,
            charge_transfer_high: None,
            charge_transfer_low: None,
        });

        let max_count = config.max_count.unwrap_or(DEFAULT_MAX_COUNT);
        let tsc = unsafe { &*pac::TSC::ptr() };

        tsc.cr.write(|w| unsafe {
            w.ctph().bits(config.charge_transfer_high.unwrap_or(DEFAULT_CTPH) as u8)
                .ctpl().bits(config.charge_transfer_low.unwrap_or(DEFAULT_CTPL) as u8)
                .sse().set_bit()
                .ssd().bits(16)
                .pgpsc().bits(config.clock_prescale.unwrap_or(DEFAULT_PRESCALE) as u8)
                .mcv().bits(max_count as u8)
                .tsce().set_bit()
        });

        Self {
            tsc,
            max_count: max_count.to_count(),
        }
    }

    pub fn max_count(&self) -> u16 {
        self.max_count
    }

    /// Route the sensor's I/Os and begin an acquisition
    pub fn start(&mut self, sensor: &Sensor) {
        let group = sensor.channel.group();

        // Analog switch hysteresis off on the sensor I/Os for cleaner transfers
        self.tsc.iohcr.modify(|r, w| unsafe {
            w.bits(r.bits() & !(sensor.sample.mask() | sensor.channel.mask()))
        });
        self.tsc.iogcsr.write(|w| unsafe { w.bits(1 << (group - 1)) });
        self.tsc.ioscr.write(|w| unsafe { w.bits(sensor.sample.mask()) });
        self.tsc.ioccr.write(|w| unsafe { w.bits(sensor.channel.mask()) });

        self.clear_flags();
        self.tsc.cr.modify(|_, w| w.iodef().clear_bit());
        self.tsc.cr.modify(|_, w| w.start().set_bit());
    }

    /// Poll flags to see if acquisition has completed
    pub fn is_finished(&self) -> bool {
        let isr = self.tsc.isr.read();
        isr.eoaf().bit_is_set() || isr.mcef().bit_is_set()
    }

    /// Run an acquisition on `sensor` and block until it is complete
    ///
    /// Returns the charge transfer count, or None if max count was reached first, which happens
    /// when the electrode is disconnected or shorted.
    pub fn acquire(&mut self, sensor: &Sensor) -> Option<u16> {
        self.start(sensor);
        while !self.is_finished() {}

        let group = sensor.channel.group();
        let group_status = self.tsc.iogcsr.read().bits() >> 16;
        let overflow = self.tsc.isr.read().mcef().bit_is_set();
        let count = if overflow || group_status & (1 << (group - 1)) == 0 {
            None
        } else {
            Some(self.read_group(group))
        };
        self.clear_flags();
        count
    }

    /// Acquire and convert to a signal that rises with capacitance
    ///
    /// A finger adds capacitance, so fewer transfers are needed to fill the sampling capacitor
    /// and the raw count falls. The touch filter wants the opposite.
    pub fn read(&mut self, sensor: &Sensor) -> Option<u16> {
        self.acquire(sensor).map(|count| signal(count, self.max_count))
    }

    fn read_group(&self, group: u8) -> u16 {
        match group {
            1 => self.tsc.iog1cr.read().cnt().bits(),
            2 => self.tsc.iog2cr.read().cnt().bits(),
            3 => self.tsc.iog3cr.read().cnt().bits(),
            4 => self.tsc.iog4cr.read().cnt().bits(),
            5 => self.tsc.iog5cr.read().cnt().bits(),
            6 => self.tsc.iog6cr.read().cnt().bits(),
            _ => 0,
        }
    }

    /// Clear interrupt flags
    pub fn clear_flags(&mut self) {
        self.tsc.icr.write(|w| {
            w.eoaic().set_bit() // end-of-acquisition
                .mceic().set_bit() // max-count-error
        });
    }
}
