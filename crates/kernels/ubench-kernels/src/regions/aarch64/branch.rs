//! 分支与计数器读取序列

use std::arch::asm;

use ubench_core::timer::timed;
use ubench_core::{BenchError, Measurement};

use crate::regions::Region;

pub(super) fn taken_branches(loops: u64) -> Measurement {
    timed(|| {
        if loops > 0 {
            // SAFETY: 只读写寄存器，loops > 0 保证循环终止
            unsafe {
                asm!(
                    ".p2align 5",
                    "2:",
                    "subs {n}, {n}, #1",
                    "b.ne 2b",
                    n = inout(reg) loops => _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

/// 模式值为 0 的迭代把计数累加进哈希
pub(super) fn branch_history(pattern: &[u64], loops: u64) -> Measurement {
    let mask = pattern.len() as u64 - 1;
    let table = pattern.as_ptr();
    let mut sum: u64 = 0;
    timed(|| {
        if loops > 0 {
            // SAFETY: 索引 n & mask 总在 pattern 范围内
            unsafe {
                asm!(
                    "2:",
                    "and {i}, {n}, {mask}",
                    "ldr {t}, [{p}, {i}, lsl #3]",
                    "cbnz {t}, 3f",
                    "add {x}, {x}, {n}",
                    "3:",
                    "subs {n}, {n}, #1",
                    "b.ne 2b",
                    n = inout(reg) loops => _,
                    i = out(reg) _,
                    t = out(reg) _,
                    x = inout(reg) sum,
                    p = in(reg) table,
                    mask = in(reg) mask,
                    options(nostack, readonly),
                );
            }
        }
        sum
    })
}

macro_rules! unconditional_sweep {
    ($count:expr, $loops:expr) => {
        // SAFETY: 所有跳转目标都在本 asm 块内，loops > 0 保证循环终止
        unsafe {
            asm!(
                ".p2align 12",
                "2:",
                ".rept {count}",
                "3: b 3f",
                "nop",
                ".endr",
                "3:",
                "subs {n}, {n}, #1",
                "b.ne 2b",
                count = const $count,
                n = inout(reg) $loops => _,
                options(nomem, nostack),
            );
        }
    };
}

macro_rules! conditional_sweep {
    ($count:expr, $loops:expr, $mask:expr) => {
        // SAFETY: 所有跳转目标都在本 asm 块内，loops > 0 保证循环终止
        unsafe {
            asm!(
                ".p2align 12",
                "2:",
                "tst {n}, {mask}",
                ".rept {count}",
                "3: b.eq 3f",
                "nop",
                ".endr",
                "3:",
                "subs {n}, {n}, #1",
                "b.ne 2b",
                count = const $count,
                n = inout(reg) $loops => _,
                mask = in(reg) $mask,
                options(nomem, nostack),
            );
        }
    };
}

macro_rules! sweep_by_logsize {
    ($logsize:expr, $sweep:ident!($($arg:expr),*)) => {
        match $logsize {
            0 => $sweep!(1, $($arg),*),
            1 => $sweep!(2, $($arg),*),
            2 => $sweep!(4, $($arg),*),
            3 => $sweep!(8, $($arg),*),
            4 => $sweep!(16, $($arg),*),
            5 => $sweep!(32, $($arg),*),
            6 => $sweep!(64, $($arg),*),
            7 => $sweep!(128, $($arg),*),
            8 => $sweep!(256, $($arg),*),
            9 => $sweep!(512, $($arg),*),
            10 => $sweep!(1024, $($arg),*),
            11 => $sweep!(2048, $($arg),*),
            12 => $sweep!(4096, $($arg),*),
            13 => $sweep!(8192, $($arg),*),
            14 => $sweep!(16384, $($arg),*),
            15 => $sweep!(32768, $($arg),*),
            16 => $sweep!(65536, $($arg),*),
            _ => {}
        }
    };
}

fn check_logsize(operation: &'static str, logsize: u32) -> Result<(), BenchError> {
    let limit = ubench_core::config::MAX_BTB_LOGSIZE;
    if logsize > limit {
        return Err(BenchError::invalid(operation, format!("logsize {logsize} exceeds {limit}")));
    }
    Ok(())
}

pub(super) fn unconditional_branches(logsize: u32, loops: u64) -> Region {
    check_logsize("unconditional_branches", logsize)?;
    Ok(timed(|| {
        if loops > 0 {
            sweep_by_logsize!(logsize, unconditional_sweep!(loops));
        }
        loops
    }))
}

pub(super) fn conditional_branches(logsize: u32, mask: u64, loops: u64) -> Region {
    check_logsize("conditional_branches", logsize)?;
    Ok(timed(|| {
        if loops > 0 {
            sweep_by_logsize!(logsize, conditional_sweep!(loops, mask));
        }
        loops
    }))
}

pub(super) fn timestamp_reads(serializing: bool, loops: u64) -> Measurement {
    let mut ticks: u64 = 0;
    timed(|| {
        if serializing {
            for _ in 0..loops {
                // SAFETY: 只读取虚拟计数器
                unsafe {
                    asm!(
                        ".rept 1024",
                        "isb",
                        "mrs {t}, cntvct_el0",
                        ".endr",
                        t = out(reg) ticks,
                        options(nomem, nostack),
                    );
                }
            }
        } else {
            for _ in 0..loops {
                // SAFETY: 只读取虚拟计数器
                unsafe {
                    asm!(
                        ".rept 1024",
                        "mrs {t}, cntvct_el0",
                        ".endr",
                        t = out(reg) ticks,
                        options(nomem, nostack),
                    );
                }
            }
        }
        ticks
    })
}
