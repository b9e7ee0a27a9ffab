//! 整数 ALU 与 NEON 向量加法序列

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
                    "add {a}, {a}, #15",
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
                        "lsl {a}, {a}, #1",
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
                        "lsl {a}, {a}, #0",
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
    let count = u64::from(count);
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    ".rept 1024",
                    "lsl {a}, {a}, {c}",
                    ".endr",
                    a = inout(reg) a,
                    c = in(reg) count,
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
            // 清零后比较置 Z，之后所有 csel 都选第一个操作数
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    "eor {a1}, {a1}, {a1}",
                    "cmp {a1}, #0",
                    ".rept 512",
                    "csel {a2}, {a1}, {a2}, eq",
                    "csel {a1}, {a2}, {a1}, eq",
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
                        "add {a1}, {a1}, {a2}",
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
                    "add {a1}, {a1}, {a2}",
                    "mov {a2}, {a1}",
                    "subs {n}, {n}, #1",
                    "b.ne 2b",
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
    let mut acc = [0u64; 8];
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写寄存器
            unsafe {
                asm!(
                    ".rept 128",
                    "add {a0}, {a0}, {r}",
                    "add {a1}, {a1}, {r}",
                    "add {a2}, {a2}, {r}",
                    "add {a3}, {a3}, {r}",
                    "add {a4}, {a4}, {r}",
                    "add {a5}, {a5}, {r}",
                    "add {a6}, {a6}, {r}",
                    "add {a7}, {a7}, {r}",
                    ".endr",
                    a0 = inout(reg) acc[0],
                    a1 = inout(reg) acc[1],
                    a2 = inout(reg) acc[2],
                    a3 = inout(reg) acc[3],
                    a4 = inout(reg) acc[4],
                    a5 = inout(reg) acc[5],
                    a6 = inout(reg) acc[6],
                    a7 = inout(reg) acc[7],
                    r = in(reg) addend,
                    options(nomem, nostack),
                );
            }
        }
        acc.iter().fold(0u64, |sum, a| sum.wrapping_add(*a))
    })
}

pub(super) fn vector_latency(loops: u64) -> Measurement {
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写向量寄存器
            unsafe {
                asm!(
                    ".rept 1024",
                    "add v2.2d, v2.2d, v1.2d",
                    ".endr",
                    out("v1") _,
                    out("v2") _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

pub(super) fn vector_throughput(loops: u64) -> Measurement {
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写向量寄存器
            unsafe {
                asm!(
                    ".rept 128",
                    "add v8.2d, v8.2d, v0.2d",
                    "add v9.2d, v9.2d, v1.2d",
                    "add v10.2d, v10.2d, v2.2d",
                    "add v11.2d, v11.2d, v3.2d",
                    "add v12.2d, v12.2d, v4.2d",
                    "add v13.2d, v13.2d, v5.2d",
                    "add v14.2d, v14.2d, v6.2d",
                    "add v15.2d, v15.2d, v7.2d",
                    ".endr",
                    out("v0") _, out("v1") _, out("v2") _, out("v3") _,
                    out("v4") _, out("v5") _, out("v6") _, out("v7") _,
                    out("v8") _, out("v9") _, out("v10") _, out("v11") _,
                    out("v12") _, out("v13") _, out("v14") _, out("v15") _,
                    options(nomem, nostack),
                );
            }
        }
        loops
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
    fn shifts() {
        assert_eq!(shift_immediate(1, false).hash, 0xdead_beef);
        assert_eq!(shift_immediate(1, true).hash, 0);
        assert_eq!(shift_register(1, 0).hash, 0xdead_beef);
    }

    #[test]
    fn independent_adds_count_every_chain() {
        assert_eq!(independent_adds(3).hash, 3 * 1024);
    }

    #[test]
    fn move_elimination_forms_agree() {
        assert_eq!(move_elimination(2048, false).hash, move_elimination(2048, true).hash);
    }
}
