//! 访存序列
//!
//! 标量访存为 64 位 `mov`，向量访存为 32 字节 `vmovapd`（需要 AVX）。

use std::arch::asm;

use ubench_core::timer::{elapsed_since, timed, timestamp_ns};
use ubench_core::{AlignedBuffer, Measurement};

use crate::regions::MemOp;

/// 足迹扫描每次内层迭代覆盖的字节数（64 次 32 字节访存）
pub(super) const SWEEP_CHUNK: usize = 2048;

pub(super) fn scalar_memops(op: MemOp, cell: &mut u64, loops: u64) -> Measurement {
    let addr: *mut u64 = cell;
    let value: u64 = 0x5a5a;
    timed(|| {
        match op {
            MemOp::Load => {
                for _ in 0..loops {
                    // 显式指定目的寄存器，避免形成指针追逐
                    // SAFETY: addr 指向有效的 u64
                    unsafe {
                        asm!(
                            ".rept 1024",
                            "mov {t}, qword ptr [{m}]",
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
                            "mov qword ptr [{m}], {v}",
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

/// # Safety
/// 调用方必须确认 CPU 支持 AVX，且 `block` 至少 32 字节并按 32 字节对齐
#[target_feature(enable = "avx")]
pub(super) unsafe fn vector_memops(op: MemOp, block: &mut AlignedBuffer, loops: u64) -> Measurement {
    let addr = block.as_mut_ptr();
    let start = timestamp_ns();
    match op {
        MemOp::Load => {
            for _ in 0..loops {
                // SAFETY: addr 指向 32 字节对齐的有效内存
                unsafe {
                    asm!(
                        ".rept 1024",
                        "vmovapd ymm0, ymmword ptr [{m}]",
                        ".endr",
                        m = in(reg) addr,
                        out("ymm0") _,
                        options(nostack, readonly),
                    );
                }
            }
        }
        MemOp::Store => {
            for _ in 0..loops {
                // SAFETY: addr 指向 32 字节对齐的可写内存
                unsafe {
                    asm!(
                        ".rept 1024",
                        "vmovapd ymmword ptr [{m}], ymm0",
                        ".endr",
                        m = in(reg) addr,
                        out("ymm0") _,
                        options(nostack),
                    );
                }
            }
        }
    }
    let elapsed = elapsed_since(start);
    Measurement::new(elapsed, u64::from(block.as_slice()[0]))
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX，`buffer` 按 32 字节对齐且长度为 [`SWEEP_CHUNK`] 的倍数
#[target_feature(enable = "avx")]
pub(super) unsafe fn footprint_sweep(op: MemOp, buffer: &mut AlignedBuffer, outer: u64) -> Measurement {
    let base = buffer.as_mut_ptr();
    let inner = (buffer.len() / SWEEP_CHUNK) as u64;
    let start = timestamp_ns();
    match op {
        MemOp::Load => {
            for _ in 0..outer {
                // SAFETY: inner * SWEEP_CHUNK 不超过缓冲区长度
                unsafe {
                    asm!(
                        "2:",
                        ".irp hi, 0x000, 0x100, 0x200, 0x300, 0x400, 0x500, 0x600, 0x700",
                        ".irp lo, 0x00, 0x20, 0x40, 0x60, 0x80, 0xa0, 0xc0, 0xe0",
                        "vmovapd ymm0, ymmword ptr [{idx} + \\hi + \\lo]",
                        ".endr",
                        ".endr",
                        "add {idx}, 0x800",
                        "dec {n}",
                        "jnz 2b",
                        idx = inout(reg) base => _,
                        n = inout(reg) inner => _,
                        out("ymm0") _,
                        options(nostack, readonly),
                    );
                }
            }
        }
        MemOp::Store => {
            for _ in 0..outer {
                // SAFETY: inner * SWEEP_CHUNK 不超过缓冲区长度
                unsafe {
                    asm!(
                        "2:",
                        ".irp hi, 0x000, 0x100, 0x200, 0x300, 0x400, 0x500, 0x600, 0x700",
                        ".irp lo, 0x00, 0x20, 0x40, 0x60, 0x80, 0xa0, 0xc0, 0xe0",
                        "vmovapd ymmword ptr [{idx} + \\hi + \\lo], ymm0",
                        ".endr",
                        ".endr",
                        "add {idx}, 0x800",
                        "dec {n}",
                        "jnz 2b",
                        idx = inout(reg) base => _,
                        n = inout(reg) inner => _,
                        out("ymm0") _,
                        options(nostack),
                    );
                }
            }
        }
    }
    Measurement::new(elapsed_since(start), outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_store_writes_the_cell() {
        let mut cell = 0u64;
        let m = scalar_memops(MemOp::Store, &mut cell, 1);
        assert_eq!(cell, 0x5a5a);
        assert_eq!(m.hash, 1);
    }

    #[test]
    fn scalar_load_leaves_the_cell() {
        let mut cell = 7u64;
        scalar_memops(MemOp::Load, &mut cell, 2);
        assert_eq!(cell, 7);
    }

    #[test]
    fn footprint_sweep_covers_small_buffer() {
        if !std::arch::is_x86_feature_detected!("avx") {
            return;
        }
        let mut buffer = AlignedBuffer::zeroed(4 * SWEEP_CHUNK, 128).unwrap();
        // SAFETY: 已检测 AVX，缓冲区对齐且为 SWEEP_CHUNK 的倍数
        let m = unsafe { footprint_sweep(MemOp::Load, &mut buffer, 3) };
        assert_eq!(m.hash, 3);
    }
}
