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
use crate::config::CBOM_BLOCK_SIZE_PROP;
use crate::device::StaticNode;

pub const BOARD_NAME: &str = "qemu-virt-riscv64";

pub const BOARD_NCPUS: usize = 2;

pub static BOARD_CPU_NODES: [StaticNode; BOARD_NCPUS] = [
    StaticNode {
        name: "cpu@0",
        compatible: &["riscv"],
        reg: Some((0, 1)),
        props: &[(CBOM_BLOCK_SIZE_PROP, 64)],
    },
    StaticNode {
        name: "cpu@1",
        compatible: &["riscv"],
        reg: Some((1, 1)),
        props: &[(CBOM_BLOCK_SIZE_PROP, 64)],
    },
];

pub static BOARD_SOC_NODES: [StaticNode; 2] = [
    StaticNode {
        name: "serial@10000000",
        compatible: &["ns16550a"],
        reg: Some((0x10000000, 0x100)),
        props: &[],
    },
    StaticNode {
        name: "virtio_mmio@10001000",
        compatible: &["virtio,mmio"],
        reg: Some((0x10001000, 0x1000)),
        props: &[],
    },
];
