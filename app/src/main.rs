#![no_main]
#![no_std]

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m;
use cortex_m_rt::{entry, exception};
use panic_halt as _;

use smart_leds::SmartLedsWrite;
use stm32f0xx_hal as hal;
use ws2812_spi::Ws2812;

use luna::color::BLACK;
use luna::lamp::{Lamp, LampConfig, Stage, DEFAULT_LAMP_CONFIG};
use luna::pacer::Pacer;
use luna::tsc::{Channel, Sensor, Tsc};
use luna::{CapsenseConfig, DEFAULT_CAPSENSE_CONFIG};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;
use crate::hal::spi::Spi;

#[macro_use]
mod serial;

/// The pad electrode on PA0, sampling capacitor on PA1
static SENSOR: Sensor = Sensor::new(Channel::G1Io2, Channel::G1Io1);

static TSC_CONFIG: luna::tsc::Config = luna::tsc::Config {
    clock_prescale: None,
    max_count: Some(luna::tsc::MaxCount::U8191),
    charge_transfer_high: None,
    charge_transfer_low: None,
};

static CAPSENSE_CONFIG: CapsenseConfig = DEFAULT_CAPSENSE_CONFIG;

static LAMP_CONFIG: LampConfig = DEFAULT_LAMP_CONFIG;

/// Milliseconds between touch readings
const SAMPLE_MS: u32 = 20;
/// Milliseconds between filter state reports on the trace
const REPORT_MS: u32 = 1000;

/// Milliseconds since boot, wrapping
static TIME: AtomicU32 = AtomicU32::new(0);

fn now() -> u32 {
    TIME.load(Ordering::Relaxed)
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    // A library requiring a critical section to set a gpio AF register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Touch pad and its sampling capacitor
    let _pad = gpioa.pa0.into_alternate_af3(&fake_cs);
    let _g1_cap = gpioa.pa1.into_alternate_af3(&fake_cs);

    // WS2812 data on SPI1 MOSI. SCK and MISO are claimed by the SPI but left unconnected.
    let sck = gpioa.pa5.into_alternate_af0(&fake_cs);
    let miso = gpioa.pa6.into_alternate_af0(&fake_cs);
    let mosi = gpioa.pa7.into_alternate_af0(&fake_cs);
    let spi = Spi::spi1(dp.SPI1, (sck, miso, mosi), ws2812_spi::MODE, 3.mhz(), &mut rcc);
    let mut led = Ws2812::new(spi);
    led.write([BLACK].iter().cloned()).ok();

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);

    let mut touch = Tsc::new(Some(TSC_CONFIG));

    let mut syst = hal::timers::Timer::syst(cp.SYST, 1.khz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    let mut lamp = Lamp::new(Some(&LAMP_CONFIG), Some(&CAPSENSE_CONFIG), now());
    let mut sample_pacer = Pacer::new();
    let mut report_pacer = Pacer::new();

    trace!("luna: touch the pad to calibrate\r\n");

    loop {
        let time = now();
        // The lamp runs every pass so effects keep their own frame timing. The pad is read
        // less often, and in between the lamp carries the last touch state.
        let reading = if sample_pacer.ready(time, SAMPLE_MS) {
            let reading = touch.read(&SENSOR);
            if reading.is_none() {
                trace!("touch: max count reached\r\n");
            }
            reading
        } else {
            None
        };

        let stage = lamp.stage();
        let index = lamp.index();
        if let Some(color) = lamp.tick(time, reading) {
            led.write([color].iter().cloned()).ok();
        }

        if lamp.stage() != stage {
            match lamp.stage() {
                Stage::AwaitTouch => trace!("touch: recalibrating, touch the pad\r\n"),
                Stage::AwaitRelease => trace!("touch: seen, release the pad\r\n"),
                Stage::Running => trace!(
                    "touch: calibrated min {} max {} hysteresis {}\r\n",
                    lamp.capsense.min.unwrap_or(0),
                    lamp.capsense.max.unwrap_or(0),
                    lamp.capsense.hysteresis
                ),
            };
        }
        if lamp.index() != index {
            trace!("effect: {}\r\n", lamp.index());
        }

        if report_pacer.ready(time, REPORT_MS) {
            let c = &lamp.capsense;
            trace!(
                "RAW: {} SMOOTH: {} LIMIT: {} HYST: {}\r\n",
                c.raw, c.smooth, c.limit, c.hysteresis
            );
        }

        cortex_m::asm::wfi();
    }
}

#[exception]
fn SysTick() {
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
