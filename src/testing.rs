//! Software model of a non-coherent write-back data cache, for unit tests.
//!
//! CPU accesses go through the cache (write-allocate), device accesses go
//! straight to memory. Virtual and physical addresses are the same unless a
//! test mapper says otherwise.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use spin::Mutex;

use crate::arch::DcacheLineOps;
use crate::dma::CacheOps;
use crate::memory::{PhysAddr, PhysMapper, VirtAddr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineOp {
    Clean,
    Inv,
    CleanInv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeOp {
    Wback,
    Inv,
    WbackInv,
}

struct CachedLine {
    data: Vec<u8>,
    dirty: bool,
}

struct SimState {
    mem: Vec<u8>,
    lines: BTreeMap<usize, CachedLine>,
    ops: Vec<(LineOp, usize)>,
    syncs: usize,
}

pub struct SimCache {
    base: PhysAddr,
    line: usize,
    state: Mutex<SimState>,
}

impl SimCache {
    pub fn new(base: PhysAddr, size: usize, line: usize) -> Self {
        Self {
            base,
            line,
            state: Mutex::new(SimState {
                mem: vec![0; size],
                lines: BTreeMap::new(),
                ops: Vec::new(),
                syncs: 0,
            }),
        }
    }

    pub fn base(&self) -> PhysAddr {
        self.base
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn line_of(&self, addr: usize) -> usize {
        addr & !(self.line - 1)
    }

    fn fill(&self, st: &mut SimState, line: usize) {
        if !st.lines.contains_key(&line) {
            let off = line - self.base;
            let data = st.mem[off..off + self.line].to_vec();
            st.lines.insert(line, CachedLine { data, dirty: false });
        }
    }

    pub fn cpu_write(&self, addr: usize, bytes: &[u8]) {
        let mut st = self.state.lock();
        for (i, b) in bytes.iter().enumerate() {
            let a = addr + i;
            let line = self.line_of(a);
            self.fill(&mut st, line);
            let cached = st.lines.get_mut(&line).unwrap();
            cached.data[a - line] = *b;
            cached.dirty = true;
        }
    }

    pub fn cpu_read(&self, addr: usize, len: usize) -> Vec<u8> {
        let mut st = self.state.lock();
        (addr..addr + len)
            .map(|a| {
                let line = self.line_of(a);
                self.fill(&mut st, line);
                st.lines[&line].data[a - line]
            })
            .collect()
    }

    /// Pull a line in without the program asking for it.
    pub fn prefetch(&self, addr: usize) {
        let mut st = self.state.lock();
        let line = self.line_of(addr);
        self.fill(&mut st, line);
    }

    pub fn device_write(&self, addr: PhysAddr, bytes: &[u8]) {
        let mut st = self.state.lock();
        let off = addr - self.base;
        st.mem[off..off + bytes.len()].copy_from_slice(bytes);
    }

    pub fn device_read(&self, addr: PhysAddr, len: usize) -> Vec<u8> {
        let st = self.state.lock();
        let off = addr - self.base;
        st.mem[off..off + len].to_vec()
    }

    pub fn is_cached(&self, addr: usize) -> bool {
        self.state.lock().lines.contains_key(&self.line_of(addr))
    }

    pub fn is_dirty(&self, addr: usize) -> bool {
        self.state
            .lock()
            .lines
            .get(&self.line_of(addr))
            .map_or(false, |l| l.dirty)
    }

    pub fn line_ops(&self) -> Vec<(LineOp, usize)> {
        self.state.lock().ops.clone()
    }

    pub fn clear_log(&self) {
        let mut st = self.state.lock();
        st.ops.clear();
        st.syncs = 0;
    }

    pub fn syncs(&self) -> usize {
        self.state.lock().syncs
    }

    fn line_op(&self, op: LineOp, addr: usize) {
        let mut st = self.state.lock();
        let line = self.line_of(addr);
        st.ops.push((op, line));
        let writeback = matches!(op, LineOp::Clean | LineOp::CleanInv);
        let drop_line = matches!(op, LineOp::Inv | LineOp::CleanInv);
        if writeback {
            let off = line - self.base;
            if let Some(cached) = st.lines.get(&line) {
                if cached.dirty {
                    let data = cached.data.clone();
                    st.mem[off..off + self.line].copy_from_slice(&data);
                }
            }
            if let Some(cached) = st.lines.get_mut(&line) {
                cached.dirty = false;
            }
        }
        if drop_line {
            st.lines.remove(&line);
        }
    }
}

impl DcacheLineOps for SimCache {
    fn clean_line(&self, vaddr: VirtAddr) {
        self.line_op(LineOp::Clean, vaddr)
    }

    fn inv_line(&self, vaddr: VirtAddr) {
        self.line_op(LineOp::Inv, vaddr)
    }

    fn clean_inv_line(&self, vaddr: VirtAddr) {
        self.line_op(LineOp::CleanInv, vaddr)
    }

    fn sync(&self) {
        self.state.lock().syncs += 1;
    }
}

impl PhysMapper for SimCache {
    fn phys_to_virt(&self, paddr: PhysAddr) -> Option<VirtAddr> {
        Some(paddr)
    }

    fn map_temporary(&self, paddr: PhysAddr) -> VirtAddr {
        paddr
    }

    fn unmap_temporary(&self, _vaddr: VirtAddr) {}

    unsafe fn zero_fill(&self, vaddr: VirtAddr, len: usize) {
        self.cpu_write(vaddr, &vec![0; len]);
    }
}

/// Identity mapper over a [`SimCache`] where everything at or above
/// `highmem_start` has no permanent alias.
pub struct HighmemMap<'a> {
    pub sim: &'a SimCache,
    pub highmem_start: PhysAddr,
    pub mapped: Mutex<Vec<PhysAddr>>,
    pub live: Mutex<usize>,
}

impl<'a> HighmemMap<'a> {
    pub fn new(sim: &'a SimCache, highmem_start: PhysAddr) -> Self {
        Self {
            sim,
            highmem_start,
            mapped: Mutex::new(Vec::new()),
            live: Mutex::new(0),
        }
    }
}

impl PhysMapper for HighmemMap<'_> {
    fn phys_to_virt(&self, paddr: PhysAddr) -> Option<VirtAddr> {
        (paddr < self.highmem_start).then_some(paddr)
    }

    fn map_temporary(&self, paddr: PhysAddr) -> VirtAddr {
        self.mapped.lock().push(crate::memory::align_down(paddr));
        *self.live.lock() += 1;
        paddr
    }

    fn unmap_temporary(&self, _vaddr: VirtAddr) {
        *self.live.lock() -= 1;
    }

    unsafe fn zero_fill(&self, vaddr: VirtAddr, len: usize) {
        self.sim.zero_fill(vaddr, len)
    }
}

/// Cache-op set that only remembers what it was asked to do.
#[derive(Default)]
pub struct RecordingOps {
    pub calls: Mutex<Vec<(RangeOp, PhysAddr, usize)>>,
}

impl RecordingOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(RangeOp, PhysAddr, usize)> {
        self.calls.lock().clone()
    }
}

impl CacheOps for RecordingOps {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.calls.lock().push((RangeOp::Wback, paddr, size));
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.calls.lock().push((RangeOp::Inv, paddr, size));
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.calls.lock().push((RangeOp::WbackInv, paddr, size));
    }
}
