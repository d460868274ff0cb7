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
//! Cache maintenance through a supervisor binary interface call.
//!
//! Firmware that owns an out-of-band cache controller exposes it as a vendor
//! extension. Each operation is one synchronous call carrying the operation
//! id, the physical start and the length; it returns once the controller is
//! done.

use numeric_enum_macro::numeric_enum;

use crate::dma::CacheOps;
use crate::error::DmaResult;
use crate::memory::{PhysAddr, PhysRange};

/// Start of the SBI vendor-specific extension space.
pub const EID_VENDOR_START: usize = 0x0900_0000;

pub const SBI_SUCCESS: isize = 0;
pub const SBI_ERR_NOT_SUPPORTED: isize = -2;

numeric_enum! {
    #[repr(usize)]
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    pub enum CacheOpId {
        Wback = 0,
        Inv = 1,
        WbackInv = 2,
    }
}

/// `a0`/`a1` of an SBI call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FirmwareRet {
    pub error: isize,
    pub value: isize,
}

impl FirmwareRet {
    pub fn is_ok(&self) -> bool {
        self.error == SBI_SUCCESS
    }
}

/// A synchronous call into firmware. Must not sleep.
pub trait FirmwareCall: Sync {
    fn call(&self, eid: usize, fid: usize, args: [usize; 3]) -> FirmwareRet;
}

/// The `ecall` instruction from S-mode.
pub struct SbiFirmware;

#[cfg(target_arch = "riscv64")]
impl FirmwareCall for SbiFirmware {
    fn call(&self, eid: usize, fid: usize, args: [usize; 3]) -> FirmwareRet {
        let (error, value): (isize, isize);
        unsafe {
            core::arch::asm!(
                "ecall",
                inlateout("a0") args[0] => error,
                inlateout("a1") args[1] => value,
                in("a2") args[2],
                in("a6") fid,
                in("a7") eid,
                options(nostack)
            );
        }
        FirmwareRet { error, value }
    }
}

pub struct SbiCacheOps<F> {
    fw: F,
    eid: usize,
    line: usize,
}

impl<F: FirmwareCall> SbiCacheOps<F> {
    pub const fn new(fw: F, eid: usize, line: usize) -> Self {
        Self { fw, eid, line }
    }

    pub fn firmware(&self) -> &F {
        &self.fw
    }

    /// Ask the firmware whether it implements the extension at all.
    pub fn probe(&self) -> DmaResult {
        // Base extension, probe_extension.
        let ret = self.fw.call(0x10, 3, [self.eid, 0, 0]);
        if !ret.is_ok() {
            return dma_result_err!(EIO, format!("SBI probe_extension failed: {}", ret.error));
        }
        if ret.value == 0 {
            return dma_result_err!(ENODEV, format!("SBI extension {:#x} not present", self.eid));
        }
        Ok(())
    }

    fn cache_op(&self, op: CacheOpId, paddr: PhysAddr, size: usize) {
        let range = PhysRange::new(paddr, size).align_to(self.line);
        if range.is_empty() {
            return;
        }
        let ret = self
            .fw
            .call(self.eid, op as usize, [range.start, range.size, 0]);
        if !ret.is_ok() {
            error!(
                "SBI cache op {:?} on {:#x}+{:#x} failed: {}",
                op, range.start, range.size, ret.error
            );
        }
    }
}

impl<F: FirmwareCall> CacheOps for SbiCacheOps<F> {
    fn wback(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(CacheOpId::Wback, paddr, size);
    }

    fn inv(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(CacheOpId::Inv, paddr, size);
    }

    fn wback_inv(&self, paddr: PhysAddr, size: usize) {
        self.cache_op(CacheOpId::WbackInv, paddr, size);
    }
}
