use super::*;
use crate::testing::{HighmemMap, SimCache};

#[test]
fn test_align_to_covers_range() {
    let r = PhysRange::new(0x1028, 100);
    let a = r.align_to(64);
    assert_eq!(a, PhysRange::new(0x1000, 0xc0));
    assert!(a.covers(&r));
    assert!(a.contains(0x1028) && a.contains(0x1028 + 99));

    let exact = PhysRange::new(0x2000, 0x80);
    assert_eq!(exact.align_to(64), exact);
    assert!(PhysRange::new(0x2013, 0).align_to(64).is_empty());
}

#[test]
fn test_lines_touch_first_and_last_byte() {
    let lines: Vec<_> = PhysRange::new(0x103f, 2).lines(64).collect();
    assert_eq!(lines, vec![0x1000, 0x1040]);
    assert_eq!(PhysRange::new(0x1000, 0).lines(64).count(), 0);
    assert_eq!(PhysRange::new(0x1000, PAGE_SIZE).lines(32).count(), 128);
}

#[test]
fn test_pages_split_at_boundaries() {
    let segs: Vec<_> = PhysRange::new(0x1f00, 0x1200).pages().collect();
    assert_eq!(
        segs,
        vec![
            PhysRange::new(0x1f00, 0x100),
            PhysRange::new(0x2000, 0x1000),
            PhysRange::new(0x3000, 0x100),
        ]
    );
    assert_eq!(PhysRange::new(0x5000, 0).pages().count(), 0);
}

#[test]
fn test_align_helpers() {
    assert_eq!(align_down(0x1fff), 0x1000);
    assert_eq!(align_down_to(0x47, 32), 0x40);
}

#[test]
fn test_range_at_top_of_address_space() {
    let top = PhysRange::new(usize::MAX - 63, 64);
    assert_eq!(top.last(), Some(usize::MAX));
    assert!(top.contains(usize::MAX));
    assert!(top.covers(&PhysRange::new(usize::MAX, 1)));
    assert_eq!(top.align_to(64), top);
    assert_eq!(PhysRange::new(usize::MAX - 10, 4).align_to(64), top);

    let lines: Vec<_> = PhysRange::new(usize::MAX - 100, 101).lines(64).collect();
    assert_eq!(lines, vec![usize::MAX - 127, usize::MAX - 63]);

    let segs: Vec<_> = PhysRange::new(usize::MAX - PAGE_SIZE - 15, PAGE_SIZE + 16)
        .pages()
        .collect();
    assert_eq!(
        segs,
        vec![
            PhysRange::new(usize::MAX - PAGE_SIZE - 15, 16),
            PhysRange::new(usize::MAX - PAGE_SIZE + 1, PAGE_SIZE),
        ]
    );

    // A range that would wrap has no last byte and is walked as empty.
    assert_eq!(PhysRange::new(usize::MAX, 2).last(), None);
    assert_eq!(PhysRange::new(usize::MAX, 2).lines(64).count(), 0);
}

#[test]
fn test_linear_alias_is_one_call() {
    let map = LinearMap::new(0xffff_0000_0000);
    let mut seen = Vec::new();
    for_each_alias(&map, PhysRange::new(0x1f00, 0x1200), |va, len| seen.push((va, len)));
    assert_eq!(seen, vec![(0xffff_0000_1f00, 0x1200)]);
}

#[test]
fn test_highmem_alias_goes_page_by_page() {
    let sim = SimCache::new(0x8000_0000, 4 * PAGE_SIZE, 64);
    let map = HighmemMap::new(&sim, 0x8000_1000);
    let mut seen = Vec::new();
    for_each_alias(&map, PhysRange::new(0x8000_0f00, 0x1200), |va, len| {
        seen.push((va, len))
    });
    assert_eq!(
        seen,
        vec![(0x8000_0f00, 0x100), (0x8000_1000, 0x1000), (0x8000_2000, 0x100)]
    );
    assert_eq!(*map.mapped.lock(), vec![0x8000_1000, 0x8000_2000]);
    assert_eq!(*map.live.lock(), 0);
}
