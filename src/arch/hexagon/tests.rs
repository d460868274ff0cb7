use super::*;
use crate::dma::{arch_sync_for_cpu, arch_sync_for_device, DmaDirection};
use crate::memory::PAGE_SIZE;
use crate::testing::{LineOp, SimCache};

const BASE: usize = 0x4000_0000;

fn backend(sim: &SimCache) -> HexagonDma<&SimCache, &SimCache> {
    HexagonDma::new(sim, sim)
}

#[test]
fn test_bidirectional_flushes_once_up_front() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    sim.cpu_write(BASE, &[0x10; 64]);
    arch_sync_for_device(&dma, BASE, 64, DmaDirection::Bidirectional);
    assert_eq!(
        sim.line_ops(),
        vec![(LineOp::CleanInv, BASE), (LineOp::CleanInv, BASE + 32)]
    );
    assert_eq!(sim.device_read(BASE, 64), vec![0x10; 64]);
    sim.clear_log();

    sim.device_write(BASE, &[0x20; 64]);
    arch_sync_for_cpu(&dma, BASE, 64, DmaDirection::Bidirectional);
    assert!(sim.line_ops().is_empty());
    assert_eq!(sim.cpu_read(BASE, 64), vec![0x20; 64]);
}

#[test]
fn test_from_device_invalidates_before_only() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    sim.cpu_read(BASE, 128);
    arch_sync_for_device(&dma, BASE, 128, DmaDirection::FromDevice);
    assert!(sim.line_ops().iter().all(|&(op, _)| op == LineOp::Inv));
    assert!(!sim.is_cached(BASE));
    sim.clear_log();

    sim.device_write(BASE, &[0x7e; 128]);
    arch_sync_for_cpu(&dma, BASE, 128, DmaDirection::FromDevice);
    assert!(sim.line_ops().is_empty());
    assert_eq!(sim.cpu_read(BASE, 128), vec![0x7e; 128]);
}

#[test]
fn test_to_device_cleans() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    sim.cpu_write(BASE + 5, &[1, 2, 3]);
    arch_sync_for_device(&dma, BASE + 5, 3, DmaDirection::ToDevice);
    assert_eq!(sim.line_ops(), vec![(LineOp::Clean, BASE)]);
    assert_eq!(sim.device_read(BASE + 5, 3), vec![1, 2, 3]);
    assert!(sim.is_cached(BASE));
}

#[test]
fn test_unaligned_range_covers_first_and_last_byte() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    dma.wback_inv(BASE + 31, 2);
    assert_eq!(
        sim.line_ops(),
        vec![(LineOp::CleanInv, BASE), (LineOp::CleanInv, BASE + 32)]
    );
}

#[test]
fn test_prep_coherent_zeroes_page() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    sim.cpu_write(BASE, &[0xaa; PAGE_SIZE]);
    unsafe { dma.prep_coherent(BASE, PAGE_SIZE) };
    assert_eq!(sim.device_read(BASE, PAGE_SIZE), vec![0; PAGE_SIZE]);
    assert!(!sim.is_cached(BASE));
}

#[test]
fn test_prep_coherent_partial_line_keeps_neighbours() {
    let sim = SimCache::new(BASE, PAGE_SIZE, 32);
    let dma = backend(&sim);
    sim.cpu_write(BASE, &[0xaa; 64]);
    dma.wback(BASE, 64);
    unsafe { dma.prep_coherent(BASE, 40) };
    assert_eq!(sim.device_read(BASE, 40), vec![0; 40]);
    assert_eq!(sim.device_read(BASE + 40, 24), vec![0xaa; 24]);
    assert_eq!(sim.line_ops().last(), Some(&(LineOp::CleanInv, BASE + 32)));
}
