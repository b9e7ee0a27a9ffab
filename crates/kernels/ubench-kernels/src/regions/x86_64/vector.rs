//! 整数向量加法序列
//!
//! 128 位使用 SSE2 `paddd`，256 位使用 AVX2 `vpaddd ymm`，512 位使用 AVX-512F `vpaddd zmm`。
//! 后两者只能在运行时检测到对应扩展后调用。

use std::arch::asm;

use ubench_core::Measurement;
use ubench_core::timer::{elapsed_since, timed, timestamp_ns};

pub(super) fn latency_128(loops: u64) -> Measurement {
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写向量寄存器，SSE2 是 x86_64 的基线
            unsafe {
                asm!(
                    ".rept 1024",
                    "paddd xmm2, xmm1",
                    ".endr",
                    out("xmm1") _,
                    out("xmm2") _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX2
#[target_feature(enable = "avx2")]
pub(super) unsafe fn latency_256(loops: u64) -> Measurement {
    let start = timestamp_ns();
    for _ in 0..loops {
        // SAFETY: 只读写向量寄存器
        unsafe {
            asm!(
                ".rept 1024",
                "vpaddd ymm2, ymm1, ymm2",
                ".endr",
                out("ymm1") _,
                out("ymm2") _,
                options(nomem, nostack),
            );
        }
    }
    Measurement::new(elapsed_since(start), loops)
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX-512F
#[target_feature(enable = "avx512f")]
pub(super) unsafe fn latency_512(loops: u64) -> Measurement {
    let start = timestamp_ns();
    for _ in 0..loops {
        // SAFETY: 只读写向量寄存器
        unsafe {
            asm!(
                ".rept 1024",
                "vpaddd zmm2, zmm1, zmm2",
                ".endr",
                out("zmm1") _,
                out("zmm2") _,
                options(nomem, nostack),
            );
        }
    }
    Measurement::new(elapsed_since(start), loops)
}

pub(super) fn throughput_128(loops: u64) -> Measurement {
    timed(|| {
        for _ in 0..loops {
            // SAFETY: 只读写向量寄存器
            unsafe {
                asm!(
                    ".rept 128",
                    "paddd xmm8, xmm0",
                    "paddd xmm9, xmm1",
                    "paddd xmm10, xmm2",
                    "paddd xmm11, xmm3",
                    "paddd xmm12, xmm4",
                    "paddd xmm13, xmm5",
                    "paddd xmm14, xmm6",
                    "paddd xmm15, xmm7",
                    ".endr",
                    out("xmm0") _, out("xmm1") _, out("xmm2") _, out("xmm3") _,
                    out("xmm4") _, out("xmm5") _, out("xmm6") _, out("xmm7") _,
                    out("xmm8") _, out("xmm9") _, out("xmm10") _, out("xmm11") _,
                    out("xmm12") _, out("xmm13") _, out("xmm14") _, out("xmm15") _,
                    options(nomem, nostack),
                );
            }
        }
        loops
    })
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX2
#[target_feature(enable = "avx2")]
pub(super) unsafe fn throughput_256(loops: u64) -> Measurement {
    let start = timestamp_ns();
    for _ in 0..loops {
        // SAFETY: 只读写向量寄存器
        unsafe {
            asm!(
                ".rept 128",
                "vpaddd ymm8, ymm8, ymm0",
                "vpaddd ymm9, ymm9, ymm1",
                "vpaddd ymm10, ymm10, ymm2",
                "vpaddd ymm11, ymm11, ymm3",
                "vpaddd ymm12, ymm12, ymm4",
                "vpaddd ymm13, ymm13, ymm5",
                "vpaddd ymm14, ymm14, ymm6",
                "vpaddd ymm15, ymm15, ymm7",
                ".endr",
                out("ymm0") _, out("ymm1") _, out("ymm2") _, out("ymm3") _,
                out("ymm4") _, out("ymm5") _, out("ymm6") _, out("ymm7") _,
                out("ymm8") _, out("ymm9") _, out("ymm10") _, out("ymm11") _,
                out("ymm12") _, out("ymm13") _, out("ymm14") _, out("ymm15") _,
                options(nomem, nostack),
            );
        }
    }
    Measurement::new(elapsed_since(start), loops)
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX-512F
#[target_feature(enable = "avx512f")]
pub(super) unsafe fn throughput_512(loops: u64) -> Measurement {
    let start = timestamp_ns();
    for _ in 0..loops {
        // SAFETY: 只读写向量寄存器
        unsafe {
            asm!(
                ".rept 128",
                "vpaddd zmm8, zmm8, zmm0",
                "vpaddd zmm9, zmm9, zmm1",
                "vpaddd zmm10, zmm10, zmm2",
                "vpaddd zmm11, zmm11, zmm3",
                "vpaddd zmm12, zmm12, zmm4",
                "vpaddd zmm13, zmm13, zmm5",
                "vpaddd zmm14, zmm14, zmm6",
                "vpaddd zmm15, zmm15, zmm7",
                ".endr",
                out("zmm0") _, out("zmm1") _, out("zmm2") _, out("zmm3") _,
                out("zmm4") _, out("zmm5") _, out("zmm6") _, out("zmm7") _,
                out("zmm8") _, out("zmm9") _, out("zmm10") _, out("zmm11") _,
                out("zmm12") _, out("zmm13") _, out("zmm14") _, out("zmm15") _,
                options(nomem, nostack),
            );
        }
    }
    Measurement::new(elapsed_since(start), loops)
}
