//! 整数 ALU 序列

use std::arch::asm;

use ubench_core::Measurement;
use ubench_core::timer::timed;

pub(super) fn dependent_adds(loops: u64) -> Measurement {
    let mut a: u64 = 0;
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    ".rept 1024",
                    "add {a}, 15",
                    ".endr",
                    a = inout(reg) a,
                    options(nomem, nostack),
                );
            }
        }
        a
    })
}

pub(super) fn shift_immediate(loops: u64, by_one: bool) -> Measurement {
    let mut a: u64 = 0xdead_beef;
    timed(|| {
        if by_one {
            for _ in 0..loops {
                // SAFETY: 只读写寄存器
                unsafe {
                    asm!(
                        ".rept 1024",
                        "shl {a}, 1",
                        ".endr",
                        a = inout(reg) a,
                        options(nomem, nostack),
                    );
                }
            }
        } else {
            for _ in 0..loops {
                // SAFETY: 只读写寄存器
                unsafe {
                    asm!(
                        ".rept 1024",
                        "shl {a}, 0",
                        ".endr",
                        a = inout(reg) a,
                        options(nomem, nostack),
                    );
                }
            }
        }
        a
    })
}

pub(super) fn shift_register(loops: u64, count: u8) -> Measurement {
    let mut a: u64 = 0xdead_beef;
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    ".rept 1024",
                    "shl {a}, cl",
                    ".endr",
                    a = inout(reg) a,
                    in("cl") count,
                    options(nomem, nostack),
                );
            }
        }
        a
    })
}

pub(super) fn conditional_moves(loops: u64) -> Measurement {
    let mut a1: u64 = 1;
    let mut a2: u64 = 2;
    timed(|| {
        for _ in 0..loops {
            // xor 置 ZF，之后所有 cmovz 都成立，形成 a1 <-> a2 的依赖链
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    "xor {a1}, {a1}",
                    ".rept 512",
                    "cmovz {a2}, {a1}",
                    "cmovz {a1}, {a2}",
                    ".endr",
                    a1 = inout(reg) a1,
                    a2 = inout(reg) a2,
                    options(nomem, nostack),
                );
            }
        }
        a1 ^ a2
    })
}

pub(super) fn move_elimination(count: u64, unrolled: bool) -> Measurement {
    let mut a1: u64 = 1;
    let mut a2: u64 = 3;
    timed(|| {
        if unrolled {
            for _ in 0..count / 1024 {
                // SAFETY: 只读写寄存器
                unsafe {
                    asm!(
                        ".rept 1024",
                        "add {a1}, {a2}",
                        "mov {a2}, {a1}",
                        ".endr",
                        a1 = inout(reg) a1,
                        a2 = inout(reg) a2,
                        options(nomem, nostack),
                    );
                }
            }
        } else if count > 0 {
            // SAFETY: 只读写寄存器，count > 0 保证循环终止
            unsafe {
                asm!(
                    ".p2align 6",
                    "2:",
                    "add {a1}, {a2}",
                    "mov {a2}, {a1}",
                    "dec {n}",
                    "jnz 2b",
                    a1 = inout(reg) a1,
                    a2 = inout(reg) a2,
                    n = inout(reg) count => _,
                    options(nomem, nostack),
                );
            }
        }
        a1 ^ a2 ^ count
    })
}

pub(super) fn independent_adds(loops: u64) -> Measurement {
    let addend: u64 = 1;
    let (mut a0, mut a1, mut a2, mut a3) = (0u64, 0u64, 0u64, 0u64);
    let (mut a4, mut a5, mut a6, mut a7) = (0u64, 0u64, 0u64, 0u64);
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    ".rept 128",
                    "add {a0}, {r}",
                    "add {a1}, {r}",
                    "add {a2}, {r}",
                    "add {a3}, {r}",
                    "add {a4}, {r}",
                    "add {a5}, {r}",
                    "add {a6}, {r}",
                    "add {a7}, {r}",
                    ".endr",
                    a0 = inout(reg) a0,
                    a1 = inout(reg) a1,
                    a2 = inout(reg) a2,
                    a3 = inout(reg) a3,
                    a4 = inout(reg) a4,
                    a5 = inout(reg) a5,
                    a6 = inout(reg) a6,
                    a7 = inout(reg) a7,
                    r = in(reg) addend,
                    options(nomem, nostack),
                );
            }
        }
        a0.wrapping_add(a1)
            .wrapping_add(a2)
            .wrapping_add(a3)
            .wrapping_add(a4)
            .wrapping_add(a5)
            .wrapping_add(a6)
            .wrapping_add(a7)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_adds_accumulate() {
        assert_eq!(dependent_adds(2).hash, 2 * 1024 * 15);
    }

    #[test]
    fn shift_by_zero_keeps_value() {
        assert_eq!(shift_immediate(1, false).hash, 0xdead_beef);
        assert_eq!(shift_register(1, 0).hash, 0xdead_beef);
    }

    #[test]
    fn shift_by_one_clears_low_word() {
        assert_eq!(shift_immediate(1, true).hash, 0);
    }

    #[test]
    fn independent_adds_count_every_chain() {
        assert_eq!(independent_adds(3).hash, 3 * 1024);
    }

    #[test]
    fn move_elimination_both_forms_terminate() {
        let single = move_elimination(4096, false);
        let unrolled = move_elimination(4096, true);
        assert_eq!(single.hash, unrolled.hash);
    }
}
