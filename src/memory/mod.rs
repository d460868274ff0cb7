// Copyright (c) 2025 Syswonder
// dma-noncoherent is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//     http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR
// FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.
//
// Syswonder Website:
//      https://www.syswonder.org
//
// Authors:
//
pub mod mapper;

pub use mapper::{for_each_alias, for_each_page_alias, LinearMap, PhysMapper};

pub type PhysAddr = usize;
pub type VirtAddr = usize;

pub const PAGE_SIZE: usize = 0x1000;

pub const fn align_down(addr: usize) -> usize {
    addr & !(PAGE_SIZE - 1)
}

/// Round `addr` down to a multiple of `align`, which must be a power of two.
pub const fn align_down_to(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// A DMA buffer identified by its physical base and length in bytes.
///
/// The range is never dereferenced here; cache backends obtain a virtual alias
/// through a [`PhysMapper`] when their instructions need one. Everything is
/// computed from the last byte rather than an exclusive end, so a buffer
/// ending at the top of the address space works too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysRange {
    pub start: PhysAddr,
    pub size: usize,
}

impl PhysRange {
    pub const fn new(start: PhysAddr, size: usize) -> Self {
        Self { start, size }
    }

    /// Address of the last byte. `None` for an empty range, or one that would
    /// wrap past the top of the address space.
    pub const fn last(&self) -> Option<PhysAddr> {
        match self.size {
            0 => None,
            n => self.start.checked_add(n - 1),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub const fn contains(&self, addr: PhysAddr) -> bool {
        match self.last() {
            Some(last) => addr >= self.start && addr <= last,
            None => false,
        }
    }

    /// Returns true if every byte of `other` lies inside `self`.
    pub const fn covers(&self, other: &PhysRange) -> bool {
        match (self.last(), other.last()) {
            (_, None) => true,
            (Some(last), Some(other_last)) => other.start >= self.start && other_last <= last,
            (None, Some(_)) => false,
        }
    }

    /// Widen the range to whole cache lines: start rounded down, end rounded up.
    ///
    /// The result always covers `self`. An empty range stays empty.
    pub const fn align_to(&self, line: usize) -> PhysRange {
        let last = match self.last() {
            Some(last) => last,
            None => return *self,
        };
        let start = align_down_to(self.start, line);
        PhysRange::new(start, align_down_to(last, line) - start + line)
    }

    /// Address of every cache line touched by the range.
    pub fn lines(&self, line: usize) -> impl Iterator<Item = PhysAddr> {
        let count = match self.last() {
            Some(last) => (align_down_to(last, line) - align_down_to(self.start, line)) / line + 1,
            None => 0,
        };
        let first = align_down_to(self.start, line);
        (0..count).map(move |i| first + i * line)
    }

    /// Split the range at page boundaries.
    pub fn pages(&self) -> PageSegments {
        PageSegments {
            cur: self.start,
            remaining: self.size,
        }
    }
}

/// Iterator over the per-page pieces of a [`PhysRange`].
#[derive(Clone, Debug)]
pub struct PageSegments {
    cur: PhysAddr,
    remaining: usize,
}

impl Iterator for PageSegments {
    type Item = PhysRange;

    fn next(&mut self) -> Option<PhysRange> {
        if self.remaining == 0 {
            return None;
        }
        let in_page = PAGE_SIZE - (self.cur - align_down(self.cur));
        let seg = PhysRange::new(self.cur, in_page.min(self.remaining));
        self.cur = self.cur.wrapping_add(seg.size);
        self.remaining -= seg.size;
        Some(seg)
    }
}

#[cfg(test)]
mod tests;
