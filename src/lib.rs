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
//! Cache maintenance for DMA on hardware without I/O coherency.
//!
//! Each architecture backend under [`arch`] provides writeback, invalidate
//! and writeback+invalidate over physical ranges plus a fixed sync policy.
//! [`dma`] composes them around transfers. On RISC-V a platform driver from
//! [`device`] may replace the hart's own instructions with an out-of-band
//! cache controller at boot.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(any(target_arch = "csky", target_arch = "hexagon"), feature(asm_experimental_arch))]

#[macro_use]
extern crate alloc;
#[macro_use]
extern crate log;

#[macro_use]
pub mod error;
#[macro_use]
pub mod taint;
pub mod logging;

pub mod arch;
pub mod config;
pub mod device;
pub mod dma;
pub mod memory;
pub mod platform;

#[cfg(test)]
mod testing;
