//! Device enumeration: walk the bus once and register every device of one
//! family into a [`DeviceTable`].
use crate::{
    Address, DeviceTable,
    bus::{DeviceSearch, OneWireBus},
    driver::{BindError, FamilyDriver},
};

#[derive(Debug, thiserror::Error)]
pub enum EnumerateError<E> {
    #[error("Failed to create device iterator: {0:?}")]
    IterCreate(E),
    #[error("Device search failed after {registered} registered device(s): {error:?}")]
    /// The bus failed while looking for the next device.
    Search { error: E, registered: usize },
    #[error("Failed to release device iterator: {0:?}")]
    Release(E),
}

/// How an enumeration pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every device on the bus was visited.
    Exhausted,
    /// The table filled up; devices after the last one registered were not visited.
    CapacityReached,
}

/// Result of a successful enumeration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    pub outcome: Outcome,
    /// Devices added to the table by this pass.
    pub registered: usize,
    /// Devices skipped because another driver family owns them.
    pub unknown: usize,
}

/// Owns a device iterator and releases it when the pass ends, whichever way
/// it ends.
struct SearchGuard<S: DeviceSearch> {
    search: Option<S>,
}

impl<S: DeviceSearch> SearchGuard<S> {
    fn new(search: S) -> Self {
        log::debug!("device iterator created, start search");
        Self {
            search: Some(search),
        }
    }
    fn next_device(&mut self) -> Result<Option<Address>, S::Error> {
        match self.search.as_mut() {
            Some(search) => search.next_device(),
            None => Ok(None),
        }
    }
    fn release(mut self) -> Result<(), S::Error> {
        match self.search.take() {
            Some(search) => {
                log::debug!("device iterator released");
                search.release()
            }
            None => Ok(()),
        }
    }
}

impl<S: DeviceSearch> Drop for SearchGuard<S> {
    fn drop(&mut self) {
        if let Some(search) = self.search.take() {
            log::debug!("device iterator released on error path");
            if let Err(e) = search.release() {
                log::warn!("device iterator release failed: {e:?}");
            }
        }
    }
}

/// Walk `bus` and register every device `D` can bind into `table`.
///
/// Stops when the bus has no more devices or when `table` is full, even if
/// more devices remain. Devices of other families are logged and skipped.
/// A bus error aborts the pass; devices registered before it stay in
/// `table`. The device iterator is released on every path.
pub fn enumerate_into<B, D, const N: usize>(
    bus: &mut B,
    table: &mut DeviceTable<D, N>,
    config: &D::Config,
) -> Result<Enumeration, EnumerateError<B::Error>>
where
    B: OneWireBus,
    D: FamilyDriver,
{
    let mut summary = Enumeration {
        outcome: Outcome::Exhausted,
        registered: 0,
        unknown: 0,
    };
    if table.is_full() {
        log::info!("device table already full, skip search");
        summary.outcome = Outcome::CapacityReached;
        return Ok(summary);
    }

    let mut search = SearchGuard::new(bus.search().map_err(EnumerateError::IterCreate)?);
    loop {
        let address = match search.next_device() {
            Ok(Some(address)) => address,
            Ok(None) => break,
            Err(error) => {
                return Err(EnumerateError::Search {
                    error,
                    registered: summary.registered,
                });
            }
        };
        match D::bind(address, config) {
            Ok(device) => {
                let Ok(index) = table.register(device) else {
                    // fullness is checked after every registration
                    summary.outcome = Outcome::CapacityReached;
                    break;
                };
                summary.registered += 1;
                log::info!("found device[{index}], address: {address}");
                if table.is_full() {
                    log::info!("max {N} devices reached, stop searching");
                    summary.outcome = Outcome::CapacityReached;
                    break;
                }
            }
            Err(BindError::FamilyMismatch { .. }) => {
                summary.unknown += 1;
                log::info!("found unknown device, address: {address}");
            }
        }
    }
    search.release().map_err(EnumerateError::Release)?;
    log::info!(
        "searching over, {} device(s) registered, {} unknown",
        summary.registered,
        summary.unknown
    );
    Ok(summary)
}

/// [`enumerate_into`] with a fresh table of capacity `N`.
pub fn enumerate<B, D, const N: usize>(
    bus: &mut B,
    config: &D::Config,
) -> Result<(DeviceTable<D, N>, Enumeration), EnumerateError<B::Error>>
where
    B: OneWireBus,
    D: FamilyDriver,
{
    let mut table = DeviceTable::new();
    let summary = enumerate_into(bus, &mut table, config)?;
    Ok((table, summary))
}
