//! 访存与 STLF 序列
//!
//! 向量访存使用 16 字节的 `ldr q0`/`str q0`；足迹扫描用四个
//! 交错的基址寄存器做后变址访问，每次内层迭代覆盖 512 字节。

use std::arch::asm;

use ubench_core::timer::timed;
use ubench_core::{AlignedBuffer, BenchError, Measurement};

use crate::regions::{CHAIN_SLOTS, MemOp, Region};

pub(super) const SWEEP_CHUNK: usize = 512;

pub(super) fn scalar_memops(op: MemOp, cell: &mut u64, loops: u64) -> Measurement {
    let addr: *mut u64 = cell;
    let value: u64 = 0x5a5a;
    timed(|| {
        match op {
            MemOp::Load => {
                for _ in 0..loops {
                    // SAFETY: addr 指向有效的 u64
                    unsafe {
                        asm!(
                            ".rept 1024",
                            "ldr {t}, [{m}]",
                            ".endr",
                            m = in(reg) addr,
                            t = out(reg) _,
                            options(nostack, readonly),
                        );
                    }
                }
            }
            MemOp::Store => {
                for _ in 0..loops {
                    // SAFETY: addr 指向有效、可写的 u64
                    unsafe {
                        asm!(
                            ".rept 1024",
                            "str {v}, [{m}]",
                            ".endr",
                            m = in(reg) addr,
                            v = in(reg) value,
                            options(nostack),
                        );
                    }
                }
            }
        }
        loops
    })
}

/// `block` 至少 16 字节并按 16 字节对齐
pub(super) fn vector_memops(op: MemOp, block: &mut AlignedBuffer, loops: u64) -> Measurement {
    let addr = block.as_mut_ptr();
    let mut measurement = timed(|| {
        match op {
            MemOp::Load => {
                for _ in 0..loops {
                    // SAFETY: addr 指向至少 16 字节的有效内存
                    unsafe {
                        asm!(
                            ".rept 1024",
                            "ldr q0, [{m}]",
                            ".endr",
                            m = in(reg) addr,
                            out("v0") _,
                            options(nostack, readonly),
                        );
                    }
                }
            }
            MemOp::Store => {
                for _ in 0..loops {
                    // SAFETY: addr 指向至少 16 字节的可写内存
                    unsafe {
                        asm!(
                            ".rept 1024",
                            "str q0, [{m}]",
                            ".endr",
                            m = in(reg) addr,
                            out("v0") _,
                            options(nostack),
                        );
                    }
                }
            }
        }
        0
    });
    measurement.hash = u64::from(block.as_slice()[0]);
    measurement
}

macro_rules! sweep {
    ($op:literal, $base:expr, $inner:expr, $($opt:ident),*) => {
        // SAFETY: inner * SWEEP_CHUNK 不超过缓冲区长度
        unsafe {
            asm!(
                "add {i1}, {i0}, #16",
                "add {i2}, {i0}, #32",
                "add {i3}, {i0}, #48",
                "2:",
                ".rept 8",
                concat!($op, " q0, [{i0}], #64"),
                concat!($op, " q0, [{i1}], #64"),
                concat!($op, " q0, [{i2}], #64"),
                concat!($op, " q0, [{i3}], #64"),
                ".endr",
                "subs {n}, {n}, #1",
                "b.ne 2b",
                i0 = inout(reg) $base => _,
                i1 = out(reg) _,
                i2 = out(reg) _,
                i3 = out(reg) _,
                n = inout(reg) $inner => _,
                out("v0") _,
                options($($opt),*),
            );
        }
    };
}

/// `buffer` 长度必须为 [`SWEEP_CHUNK`] 的非零倍数
pub(super) fn footprint_sweep(op: MemOp, buffer: &mut AlignedBuffer, outer: u64) -> Measurement {
    let base = buffer.as_mut_ptr();
    let inner = (buffer.len() / SWEEP_CHUNK) as u64;
    timed(|| {
        match op {
            MemOp::Load => {
                for _ in 0..outer {
                    sweep!("ldr", base, inner, nostack, readonly);
                }
            }
            MemOp::Store => {
                for _ in 0..outer {
                    sweep!("str", base, inner, nostack);
                }
            }
        }
        outer
    })
}

macro_rules! chase {
    ($depth:expr, $loops:expr, $start:expr, $read:expr, $acc:expr) => {
        // SAFETY: 链上每个槽位都指向下一个槽位，深度不超过 CHAIN_SLOTS - 1
        unsafe {
            asm!(
                "2:",
                "mov {p}, {start}",
                ".rept {depth}",
                "ldr {p}, [{p}]",
                ".endr",
                "str {n}, [{p}]",
                "ldr {t}, [{read}]",
                "add {acc}, {acc}, {t}",
                "subs {n}, {n}, #1",
                "b.ne 2b",
                depth = const $depth,
                n = inout(reg) $loops => _,
                p = out(reg) _,
                t = out(reg) _,
                acc = inout(reg) $acc,
                start = in(reg) $start,
                read = in(reg) $read,
                options(nostack),
            );
        }
    };
}

pub(super) fn store_forwarding(
    chain: &mut [u64; CHAIN_SLOTS],
    depth: u32,
    dependent: bool,
    loops: u64,
) -> Region {
    if !matches!(depth, 2 | 4 | 8 | 16 | 32) {
        return Err(BenchError::invalid(
            "store_forwarding",
            format!("chase depth {depth} is not a power of two in 2..=32"),
        ));
    }

    let base = chain.as_mut_ptr();
    for i in 0..CHAIN_SLOTS - 1 {
        // SAFETY: i + 1 < CHAIN_SLOTS
        unsafe { *base.add(i) = base.add(i + 1) as u64 };
    }
    // SAFETY: depth < CHAIN_SLOTS
    let read = if dependent { unsafe { base.add(depth as usize) } } else { base };

    let mut acc: u64 = 0;
    Ok(timed(|| {
        if loops > 0 {
            match depth {
                2 => chase!(2, loops, base, read, acc),
                4 => chase!(4, loops, base, read, acc),
                8 => chase!(8, loops, base, read, acc),
                16 => chase!(16, loops, base, read, acc),
                _ => chase!(32, loops, base, read, acc),
            }
        }
        acc
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_store_writes_the_cell() {
        let mut cell = 0u64;
        scalar_memops(MemOp::Store, &mut cell, 1);
        assert_eq!(cell, 0x5a5a);
    }

    #[test]
    fn sweep_terminates() {
        let mut buffer = AlignedBuffer::zeroed(4 * SWEEP_CHUNK, 128).unwrap();
        assert_eq!(footprint_sweep(MemOp::Store, &mut buffer, 2).hash, 2);
    }

    #[test]
    fn dependent_reload_sees_the_stored_count() {
        let mut chain = [0u64; CHAIN_SLOTS];
        let m = store_forwarding(&mut chain, 8, true, 4).unwrap();
        assert_eq!(m.hash, 10);
    }
}
