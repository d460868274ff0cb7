use super::*;
use alloc::boxed::Box;
use core::sync::atomic::{AtomicUsize, Ordering};

fn fresh_registry() -> &'static NonStdCacheRegistry {
    Box::leak(Box::new(NonStdCacheRegistry::new()))
}

static PROBED: AtomicUsize = AtomicUsize::new(0);

fn counting_probe(node: &dyn FirmwareNode, _registry: &'static NonStdCacheRegistry) -> DmaResult {
    match node.reg() {
        Some(_) => {
            PROBED.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        None => dma_result_err!(ENODEV),
    }
}

static FAKE_DRIVERS: &[CacheControllerDriver] = &[CacheControllerDriver {
    name: "fake-l3",
    compatible: &["vendor,fake-l3", "vendor,fake-l3-v2"],
    probe: counting_probe,
}];

const UART: StaticNode = StaticNode {
    name: "serial@10000000",
    compatible: &["ns16550a"],
    reg: Some((0x1000_0000, 0x100)),
    props: &[],
};

#[test]
fn test_static_node_properties() {
    let cpu = StaticNode {
        name: "cpu@0",
        compatible: &["riscv"],
        reg: None,
        props: &[("riscv,cbom-block-size", 64), ("reg", 0)],
    };
    assert_eq!(cpu.read_u32("riscv,cbom-block-size"), Some(64));
    assert_eq!(cpu.read_u32("clock-frequency"), None);
    assert!(cpu.is_compatible("riscv"));
    assert!(!cpu.is_compatible("riscv,sv39"));
}

#[test]
fn test_probe_declines_without_match() {
    let registry = fresh_registry();
    assert!(!probe_with(FAKE_DRIVERS, &[&UART], registry));
    assert!(!probe_cache_controllers(&[&UART], registry));
    assert!(!registry.is_registered());
}

#[test]
fn test_probe_runs_matching_driver() {
    let l3 = StaticNode {
        name: "cache-controller@2010000",
        compatible: &["vendor,fake-l3-v2", "cache"],
        reg: Some((0x201_0000, 0x4000)),
        props: &[],
    };
    let broken = StaticNode {
        name: "cache-controller@0",
        compatible: &["vendor,fake-l3"],
        reg: None,
        props: &[],
    };
    let before = PROBED.load(Ordering::SeqCst);
    assert!(probe_with(FAKE_DRIVERS, &[&UART, &broken, &l3], fresh_registry()));
    assert_eq!(PROBED.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_failed_probe_is_not_installed() {
    let broken = StaticNode {
        name: "cache-controller@0",
        compatible: &["sifive,ccache0"],
        reg: None,
        props: &[],
    };
    let registry = fresh_registry();
    assert!(!probe_cache_controllers(&[&broken], registry));
    assert!(!registry.noncoherent_supported());
}
