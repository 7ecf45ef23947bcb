use itertools::assert_equal;
use onewire_tools::{
    Address, BusConfig, DeviceTable, EnumerateError, Enumeration, Outcome,
    bus::{DeviceSearch, OneWireBus},
    driver::FamilyDriver,
    ds18b20::{Ds18b20, Ds18b20Config},
    enumerate, enumerate_into,
    sim::{SimBus, SimDevice, SimError},
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn probe(serial: u64) -> Address {
    Address(0x2800_0000_0000_0000 | serial)
}

fn bus_with(addresses: &[Address]) -> SimBus {
    let mut bus = SimBus::open(&BusConfig::default()).unwrap();
    for &address in addresses {
        bus.attach(SimDevice::new(address));
    }
    bus
}

fn addresses<const N: usize>(table: &DeviceTable<Ds18b20, N>) -> Vec<Address> {
    table.iter().map(Ds18b20::address).collect()
}

#[test]
fn registers_every_probe_when_they_fit() {
    init_logger();
    for n in 0..=4 {
        let found: Vec<_> = (1..=n).map(probe).collect();
        let mut bus = bus_with(&found);
        let (table, summary) =
            enumerate::<_, Ds18b20, 4>(&mut bus, &Ds18b20Config::default()).unwrap();
        assert_eq!(table.len(), n as usize);
        assert_eq!(summary.registered, n as usize);
        assert_eq!(addresses(&table), found);
        let expected = if n == 4 {
            Outcome::CapacityReached
        } else {
            Outcome::Exhausted
        };
        assert_eq!(summary.outcome, expected);
    }
}

#[test]
fn truncates_at_capacity_without_error() {
    init_logger();
    let found: Vec<_> = (1..=7).map(probe).collect();
    let mut bus = bus_with(&found);
    let (table, summary) =
        enumerate::<_, Ds18b20, 3>(&mut bus, &Ds18b20Config::default()).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(summary.outcome, Outcome::CapacityReached);
    assert_equal(addresses(&table), found[..3].iter().copied());
    assert_eq!(bus.searches_created(), 1);
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn empty_bus_is_exhausted_not_an_error() {
    init_logger();
    let mut bus = bus_with(&[]);
    let (table, summary) =
        enumerate::<_, Ds18b20, 4>(&mut bus, &Ds18b20Config::default()).unwrap();
    assert!(table.is_empty());
    assert_eq!(
        summary,
        Enumeration {
            outcome: Outcome::Exhausted,
            registered: 0,
            unknown: 0
        }
    );
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn skips_other_families_in_discovery_order() {
    init_logger();
    let first = Address(0x28AA_AAAA_AAAA_AAAA);
    let other = Address(0x01BB_BBBB_BBBB_BBBB);
    let second = Address(0x28CC_CCCC_CCCC_CCCC);
    let mut bus = bus_with(&[first, other, second]);
    let (table, summary) =
        enumerate::<_, Ds18b20, 4>(&mut bus, &Ds18b20Config::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(addresses(&table), [first, second]);
    assert_eq!(summary.unknown, 1);
    assert_eq!(summary.outcome, Outcome::Exhausted);
}

#[test]
fn unknown_devices_do_not_use_capacity() {
    init_logger();
    let mut bus = bus_with(&[
        Address(0x1000_0000_0000_0001),
        probe(1),
        Address(0x1000_0000_0000_0002),
        Address(0x1000_0000_0000_0003),
        probe(2),
    ]);
    let (table, summary) =
        enumerate::<_, Ds18b20, 2>(&mut bus, &Ds18b20Config::default()).unwrap();
    assert_eq!(addresses(&table), [probe(1), probe(2)]);
    assert_eq!(summary.unknown, 3);
    assert_eq!(summary.outcome, Outcome::CapacityReached);
}

#[test]
fn search_error_keeps_earlier_devices_and_releases_iterator() {
    init_logger();
    let mut bus = bus_with(&[probe(1), probe(2), probe(3), probe(4)]);
    bus.fail_next_device_at(3);
    let mut table = DeviceTable::<Ds18b20, 8>::new();
    let err = enumerate_into(&mut bus, &mut table, &Ds18b20Config::default()).unwrap_err();
    match err {
        EnumerateError::Search { error, registered } => {
            assert_eq!(error, SimError::Injected("device search"));
            assert_eq!(registered, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(addresses(&table), [probe(1), probe(2)]);
    assert_eq!(bus.searches_created(), 1);
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn error_on_first_search_step_registers_nothing() {
    init_logger();
    let mut bus = bus_with(&[probe(1)]);
    bus.fail_next_device_at(1);
    let mut table = DeviceTable::<Ds18b20, 4>::new();
    let err = enumerate_into(&mut bus, &mut table, &Ds18b20Config::default()).unwrap_err();
    assert!(matches!(err, EnumerateError::Search { registered: 0, .. }));
    assert!(table.is_empty());
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn iterator_allocation_failure_is_fatal() {
    init_logger();
    let mut bus = bus_with(&[probe(1)]);
    bus.fail_search();
    let err = enumerate::<_, Ds18b20, 4>(&mut bus, &Ds18b20Config::default()).unwrap_err();
    assert!(matches!(
        err,
        EnumerateError::IterCreate(SimError::Injected(_))
    ));
    assert_eq!(bus.searches_created(), 0);
    assert_eq!(bus.searches_released(), 0);

    // the failure is not sticky
    let (table, _) = enumerate::<_, Ds18b20, 4>(&mut bus, &Ds18b20Config::default()).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn release_failure_surfaces_after_full_pass() {
    init_logger();
    let mut bus = bus_with(&[probe(1), probe(2)]);
    bus.fail_release();
    let mut table = DeviceTable::<Ds18b20, 4>::new();
    let err = enumerate_into(&mut bus, &mut table, &Ds18b20Config::default()).unwrap_err();
    assert!(matches!(err, EnumerateError::Release(_)));
    assert_eq!(table.len(), 2);
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn release_failure_does_not_hide_search_error() {
    init_logger();
    let mut bus = bus_with(&[probe(1), probe(2)]);
    bus.fail_release();
    bus.fail_next_device_at(2);
    let mut table = DeviceTable::<Ds18b20, 4>::new();
    let err = enumerate_into(&mut bus, &mut table, &Ds18b20Config::default()).unwrap_err();
    assert!(matches!(err, EnumerateError::Search { registered: 1, .. }));
    assert_eq!(bus.searches_released(), 1);
}

#[test]
fn created_and_released_stay_balanced_across_passes() {
    init_logger();
    let mut bus = bus_with(&[probe(1), Address(0x0100_0000_0000_0001), probe(2), probe(3)]);
    let config = Ds18b20Config::default();

    enumerate::<_, Ds18b20, 8>(&mut bus, &config).unwrap();
    enumerate::<_, Ds18b20, 1>(&mut bus, &config).unwrap();
    bus.fail_next_device_at(2);
    enumerate::<_, Ds18b20, 8>(&mut bus, &config).unwrap_err();
    bus.fail_search();
    enumerate::<_, Ds18b20, 8>(&mut bus, &config).unwrap_err();

    assert_eq!(bus.searches_created(), 3);
    assert_eq!(bus.searches_released(), 3);
}

#[test]
fn refilling_a_full_table_does_not_search() {
    init_logger();
    let mut bus = bus_with(&[probe(1), probe(2)]);
    let mut table = DeviceTable::<Ds18b20, 1>::new();
    let config = Ds18b20Config::default();
    enumerate_into(&mut bus, &mut table, &config).unwrap();
    let summary = enumerate_into(&mut bus, &mut table, &config).unwrap();
    assert_eq!(summary.outcome, Outcome::CapacityReached);
    assert_eq!(summary.registered, 0);
    assert_eq!(bus.searches_created(), 1);
}

#[test]
fn classifies_by_family_code() {
    assert_eq!(Ds18b20::FAMILY_CODE, 0x28);
    let mut bus = bus_with(&[Address(0x2800_0000_0000_0001)]);
    let mut search = bus.search().unwrap();
    let address = search.next_device().unwrap().unwrap();
    assert_eq!(address.family_code(), Ds18b20::FAMILY_CODE);
    assert_eq!(search.next_device().unwrap(), None);
    search.release().unwrap();
}
