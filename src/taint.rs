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
//! System-wide taint marker.
//!
//! Configuration problems found while wiring up DMA are never fatal. They are
//! logged loudly and leave a persistent flag behind so a later crash report
//! shows the system was running out of spec.

use bitflags::bitflags;
use core::sync::atomic::{AtomicU32, Ordering};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TaintFlags: u32 {
        /// A `warn_on!` fired.
        const WARN            = 1 << 0;
        /// Hardware or firmware description does not meet what the kernel
        /// was built to assume.
        const CPU_OUT_OF_SPEC = 1 << 1;
    }
}

static TAINTED: AtomicU32 = AtomicU32::new(0);

pub fn add_taint(flags: TaintFlags) {
    TAINTED.fetch_or(flags.bits(), Ordering::SeqCst);
}

pub fn tainted() -> TaintFlags {
    TaintFlags::from_bits_truncate(TAINTED.load(Ordering::SeqCst))
}

/// Log a warning and taint the system if `cond` holds. Evaluates to `cond`.
#[macro_export]
macro_rules! warn_taint {
    ($cond: expr, $flag: expr, $($arg: tt)+) => {{
        let cond: bool = $cond;
        if cond {
            ::log::warn!($($arg)+);
            $crate::taint::add_taint($flag);
        }
        cond
    }};
}

/// `warn_taint!` with the generic [`TaintFlags::WARN`] marker.
#[macro_export]
macro_rules! warn_on {
    ($cond: expr, $($arg: tt)+) => {
        $crate::warn_taint!($cond, $crate::taint::TaintFlags::WARN, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_taint_sets_flag_only_when_condition_holds() {
        assert!(!warn_taint!(false, TaintFlags::CPU_OUT_OF_SPEC, "never"));
        assert!(warn_taint!(true, TaintFlags::CPU_OUT_OF_SPEC, "out of spec {}", 1));
        assert!(tainted().contains(TaintFlags::CPU_OUT_OF_SPEC));
    }

    #[test]
    fn warn_on_uses_generic_flag() {
        assert!(warn_on!(1 + 1 == 2, "arithmetic still works"));
        assert!(tainted().contains(TaintFlags::WARN));
    }
}
