//! Enumerate a simulated bus, then sample the probes a few times.
//!
//! ```bash
//! RUST_LOG=info cargo run --example enumerate_sim
//! ```
use std::time::Duration;

use eh1::delay::DelayNs;
use onewire_tools::{
    Address, BusConfig, DeviceTable, enumerate_into,
    ds18b20::{Ds18b20, Ds18b20Config, Resolution},
    sample_all,
    sim::{SimBus, SimDevice},
};

const ONEWIRE_MAX_DEVS: usize = 4;

struct StdDelay;
impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut bus = SimBus::open(&BusConfig::new(12))?
        .with_device(SimDevice::new(Address(0x28FF_4B93_6116_044F)).with_celsius(22.4))
        .with_device(SimDevice::new(Address(0x0100_0011_2233_4455)))
        .with_device(SimDevice::new(Address(0x2800_0004_6EAF_BC23)).with_celsius(19.9))
        .with_device(SimDevice::new(Address(0x28D6_0000_0000_0001)).detached());

    let mut probes = DeviceTable::<Ds18b20, ONEWIRE_MAX_DEVS>::new();
    let config = Ds18b20Config::default().with_resolution(Resolution::Bits10);
    let summary = enumerate_into(&mut bus, &mut probes, &config)?;
    println!("{summary:?}");
    for probe in probes.iter_mut() {
        probe.set_resolution(&mut bus, Resolution::Bits10)?;
    }

    let mut delay = StdDelay;
    for _ in 0..3 {
        for sample in sample_all(&mut bus, &probes, &mut delay)? {
            match sample.reading {
                Ok(celsius) => println!("[{}] {}: {celsius:.2}", sample.index, sample.address),
                Err(e) => println!("[{}] {}: {e}", sample.index, sample.address),
            }
        }
        delay.delay_ms(2000);
    }
    Ok(())
}
