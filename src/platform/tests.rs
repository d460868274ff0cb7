use super::*;
use crate::device::sifive_ccache;
use alloc::boxed::Box;

fn fresh_registry() -> &'static NonStdCacheRegistry {
    Box::leak(Box::new(NonStdCacheRegistry::new()))
}

#[test]
fn test_qemu_uses_cbom() {
    let registry = fresh_registry();
    let installed = init_noncoherent_dma(
        &as_nodes(&qemu_riscv64::BOARD_CPU_NODES),
        &as_nodes(&qemu_riscv64::BOARD_SOC_NODES),
        registry,
    );
    assert!(!installed);
    assert!(!registry.is_registered());
    assert_eq!(registry.block_size(), 64);
    assert!(registry.noncoherent_supported());
}

#[test]
fn test_no_cbom_and_no_controller_stays_unsupported() {
    let registry = fresh_registry();
    let soc = as_nodes(&qemu_riscv64::BOARD_SOC_NODES);
    assert!(!init_noncoherent_dma(
        &as_nodes(&hifive_premier_p550::BOARD_CPU_NODES),
        &soc,
        registry,
    ));
    assert!(!registry.noncoherent_supported());
}

#[test]
fn test_p550_describes_a_composable_cache() {
    let nodes = as_nodes(&hifive_premier_p550::BOARD_SOC_NODES);
    let l3: Vec<_> = nodes
        .iter()
        .filter(|n| sifive_ccache::COMPATIBLE.iter().any(|c| n.is_compatible(c)))
        .collect();
    assert_eq!(l3.len(), 1);
    assert_eq!(
        l3[0].reg(),
        Some((
            hifive_premier_p550::SIFIVE_CCACHE_BASE,
            hifive_premier_p550::SIFIVE_CCACHE_SIZE
        ))
    );
    assert!(hifive_premier_p550::BOARD_CPU_NODES
        .iter()
        .all(|cpu| cpu.read_u32(crate::config::CBOM_BLOCK_SIZE_PROP).is_none()));
}
