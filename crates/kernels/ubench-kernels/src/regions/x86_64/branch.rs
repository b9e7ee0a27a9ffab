//! 分支序列

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
                    "dec {n}",
                    "jnz 2b",
                    n = inout(reg) loops => _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

pub(super) fn indirect_branches(loops: u64) -> Measurement {
    timed(|| {
        if loops > 0 {
            // 奇偶迭代交替跳往 3 和 4，计数归零时跳往 5
            // SAFETY: 所有跳转目标都在本 asm 块内，loops > 0 保证循环终止
            unsafe {
                asm!(
                    "lea {s}, [rip + 3f]",
                    "lea {m}, [rip + 4f]",
                    "lea {e}, [rip + 5f]",
                    ".p2align 5",
                    "3:",
                    "nop",
                    "4:",
                    "mov {t}, {s}",
                    "test {n}, 1",
                    "cmovz {t}, {m}",
                    "dec {n}",
                    "cmovz {t}, {e}",
                    "jmp {t}",
                    "5:",
                    "nop",
                    n = inout(reg) loops => _,
                    t = out(reg) _,
                    s = out(reg) _,
                    m = out(reg) _,
                    e = out(reg) _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

/// `pattern` 长度必须为 2 的幂；模式值为 0 的迭代把计数累加进哈希
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
                    "mov {i}, {n}",
                    "and {i}, {mask}",
                    "cmp qword ptr [{p} + {i} * 8], 0",
                    "jnz 3f",
                    "add {x}, {n}",
                    "3:",
                    "dec {n}",
                    "jnz 2b",
                    n = inout(reg) loops => _,
                    i = out(reg) _,
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

// 每个分支都跳过紧随其后的 nop，落在下一条分支上
macro_rules! unconditional_sweep {
    ($count:expr, $loops:expr) => {
        // SAFETY: 所有跳转目标都在本 asm 块内，loops > 0 保证循环终止
        unsafe {
            asm!(
                ".p2align 12",
                "2:",
                ".rept {count}",
                "3: jmp 3f",
                "nop",
                ".endr",
                "3:",
                "dec {n}",
                "jnz 2b",
                count = const $count,
                n = inout(reg) $loops => _,
                options(nomem, nostack),
            );
        }
    };
}

// 所有条件分支共享同一次 test 的结果
macro_rules! conditional_sweep {
    ($count:expr, $loops:expr, $mask:expr) => {
        // SAFETY: 所有跳转目标都在本 asm 块内，loops > 0 保证循环终止
        unsafe {
            asm!(
                ".p2align 12",
                "2:",
                "test {n}, {mask}",
                ".rept {count}",
                "3: jz 3f",
                "nop",
                ".endr",
                "3:",
                "dec {n}",
                "jnz 2b",
                count = const $count,
                n = inout(reg) $loops => _,
                mask = in(reg) $mask,
                options(nomem, nostack),
            );
        }
    };
}

// 分支数必须是汇编期常量，每个 logsize 单独展开一份
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
            _ => unreachable!(),
        }
    };
}

fn check_logsize(operation: &'static str, logsize: u32) -> Result<(), BenchError> {
    if logsize > ubench_core::config::MAX_BTB_LOGSIZE {
        return Err(BenchError::invalid(
            operation,
            format!("logsize {logsize} exceeds {}", ubench_core::config::MAX_BTB_LOGSIZE),
        ));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_history_sums_not_taken_iterations() {
        assert_eq!(branch_history(&[0; 4], 4).hash, 4 + 3 + 2 + 1);
        assert_eq!(branch_history(&[1; 4], 4).hash, 0);
        // 只有偶数迭代的表项为 0
        assert_eq!(branch_history(&[0, 1], 6).hash, 6 + 4 + 2);
    }

    #[test]
    fn loops_terminate() {
        assert_eq!(taken_branches(100).hash, 100);
        assert_eq!(indirect_branches(101).hash, 101);
        assert_eq!(unconditional_branches(3, 10).unwrap().hash, 10);
        assert_eq!(conditional_branches(5, 0x3, 10).unwrap().hash, 10);
    }

    #[test]
    fn logsize_above_limit_is_rejected() {
        assert!(matches!(
            unconditional_branches(17, 1),
            Err(BenchError::InvalidParameter { .. })
        ));
    }
}
