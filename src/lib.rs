//! One-wire device enumeration and DS18B20 sampling.
//!
//! Walks a one-wire bus, binds every device of a supported family to a
//! driver handle and keeps the handles in a fixed-capacity table whose
//! indices identify the devices from then on.
//!
//! The bus itself is reached through the traits in [`bus`]. Nothing here
//! drives the data line: plug in an RMT or GPIO driver on a target, or
//! [`sim::SimBus`] on a host.
//!
//! # Quickstart
//!
//! ```
//! use onewire_tools::{
//!     Address, BusConfig, DeviceTable, Outcome,
//!     ds18b20::{Ds18b20, Ds18b20Config},
//!     enumerate_into,
//!     sim::{SimBus, SimDevice},
//! };
//!
//! let mut bus = SimBus::open(&BusConfig::new(12))?
//!     .with_device(SimDevice::new(Address(0x28AA_0000_0000_0001)))
//!     .with_device(SimDevice::new(Address(0x01BB_0000_0000_0002)));
//! let mut probes = DeviceTable::<Ds18b20, 4>::new();
//! let summary = enumerate_into(&mut bus, &mut probes, &Ds18b20Config::default())?;
//! assert_eq!(summary.outcome, Outcome::Exhausted);
//! assert_eq!(probes.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Limitations
//!
//! * Only the DS18B20 family (`0x28`) has a driver.
//! * Devices are never removed from a table; hot-unplug is not tracked.

#![forbid(unsafe_code)]

mod address;
pub mod bus;
pub mod crc;
pub mod driver;
pub mod ds18b20;
mod enumerate;
mod sample;
pub mod sim;
mod table;

pub use address::Address;
pub use bus::BusConfig;
pub use enumerate::{EnumerateError, Enumeration, Outcome, enumerate, enumerate_into};
pub use sample::{Sample, sample_all};
pub use table::DeviceTable;
