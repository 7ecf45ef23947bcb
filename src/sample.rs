use crate::{
    Address, DeviceTable,
    driver::FamilyDriver,
    ds18b20::{ConversionError, Ds18b20, Ds18b20Bus},
};
use eh1::delay::DelayNs;

/// One probe's reading from a sampling pass.
#[derive(Debug)]
pub struct Sample<E> {
    /// Table index of the probe.
    pub index: usize,
    pub address: Address,
    pub reading: Result<f32, ConversionError<E>>,
}

/// Convert on every probe at once, wait for the slowest resolution in the
/// table, then read each probe in table order.
///
/// A failed trigger aborts the pass. A failed read is logged and kept in
/// its [`Sample`]; the remaining probes are still read.
pub fn sample_all<B, D, const N: usize>(
    bus: &mut B,
    table: &DeviceTable<Ds18b20, N>,
    delay: &mut D,
) -> Result<Vec<Sample<B::Error>>, B::Error>
where
    B: Ds18b20Bus,
    D: DelayNs,
{
    if table.is_empty() {
        log::debug!("no probes registered, nothing to sample");
        return Ok(Vec::new());
    }
    Ds18b20::trigger_conversion_all(bus)?;
    let slowest = table
        .iter()
        .map(Ds18b20::resolution)
        .max()
        .unwrap_or_default();
    delay.delay_us(slowest.conversion_time_us());

    let mut samples = Vec::with_capacity(table.len());
    for (index, probe) in table.iter().enumerate() {
        let reading = probe.read_temperature(bus);
        match &reading {
            Ok(celsius) => log::info!("[{index}] temperature: {celsius:.2}"),
            Err(e) => log::warn!("[{index}] {}: {e}", probe.address()),
        }
        samples.push(Sample {
            index,
            address: probe.address(),
            reading,
        });
    }
    Ok(samples)
}
