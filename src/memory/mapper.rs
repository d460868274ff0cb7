use super::{PhysAddr, PhysRange, VirtAddr};

/// Source of CPU-visible aliases for physical memory.
///
/// Cache instructions that operate on virtual addresses go through this. Pages
/// outside the permanent linear map (highmem) have no lasting alias and must
/// be mapped one page at a time with [`PhysMapper::map_temporary`].
pub trait PhysMapper: Sync {
    /// Permanent alias of `paddr`, or `None` for highmem.
    fn phys_to_virt(&self, paddr: PhysAddr) -> Option<VirtAddr>;

    /// Map the page containing `paddr` into a per-CPU window and return the
    /// alias of `paddr` inside it.
    fn map_temporary(&self, paddr: PhysAddr) -> VirtAddr;

    fn unmap_temporary(&self, vaddr: VirtAddr);

    /// Store zeroes through a cacheable alias.
    ///
    /// # Safety
    ///
    /// `vaddr..vaddr + len` must be a writable alias handed out by this mapper
    /// for memory the caller owns.
    unsafe fn zero_fill(&self, vaddr: VirtAddr, len: usize) {
        core::ptr::write_bytes(vaddr as *mut u8, 0, len);
    }
}

impl<T: PhysMapper + ?Sized> PhysMapper for &T {
    fn phys_to_virt(&self, paddr: PhysAddr) -> Option<VirtAddr> {
        (**self).phys_to_virt(paddr)
    }

    fn map_temporary(&self, paddr: PhysAddr) -> VirtAddr {
        (**self).map_temporary(paddr)
    }

    fn unmap_temporary(&self, vaddr: VirtAddr) {
        (**self).unmap_temporary(vaddr)
    }

    unsafe fn zero_fill(&self, vaddr: VirtAddr, len: usize) {
        (**self).zero_fill(vaddr, len)
    }
}

/// All of physical memory mapped at a fixed offset.
#[derive(Clone, Copy, Debug)]
pub struct LinearMap {
    offset: usize,
}

impl LinearMap {
    pub const IDENTITY: LinearMap = LinearMap::new(0);

    pub const fn new(offset: usize) -> Self {
        Self { offset }
    }
}

impl PhysMapper for LinearMap {
    fn phys_to_virt(&self, paddr: PhysAddr) -> Option<VirtAddr> {
        Some(paddr.wrapping_add(self.offset))
    }

    fn map_temporary(&self, paddr: PhysAddr) -> VirtAddr {
        paddr.wrapping_add(self.offset)
    }

    fn unmap_temporary(&self, _vaddr: VirtAddr) {}
}

/// Run `f` over an alias of `range`, one page at a time.
///
/// Lowmem pages use the linear alias, highmem pages get a temporary mapping
/// that is torn down before moving on.
pub fn for_each_page_alias<M, F>(mapper: &M, range: PhysRange, mut f: F)
where
    M: PhysMapper + ?Sized,
    F: FnMut(VirtAddr, usize),
{
    for seg in range.pages() {
        match mapper.phys_to_virt(seg.start) {
            Some(vaddr) => f(vaddr, seg.size),
            None => {
                let vaddr = mapper.map_temporary(seg.start);
                f(vaddr, seg.size);
                mapper.unmap_temporary(vaddr);
            }
        }
    }
}

/// Run `f` once over the linear alias of `range` when it has a contiguous
/// one, otherwise fall back to [`for_each_page_alias`].
pub fn for_each_alias<M, F>(mapper: &M, range: PhysRange, mut f: F)
where
    M: PhysMapper + ?Sized,
    F: FnMut(VirtAddr, usize),
{
    let last = match range.last() {
        Some(last) => last,
        None => return,
    };
    if let (Some(first_va), Some(last_va)) = (mapper.phys_to_virt(range.start), mapper.phys_to_virt(last)) {
        if last_va.wrapping_sub(first_va) == last - range.start {
            f(first_va, range.size);
            return;
        }
    }
    for_each_page_alias(mapper, range, f);
}
