//! 拷贝序列：`rep movs` 与 32 字节 AVX 拷贝
//!
//! 两种拷贝都从 [`WorkloadPlan`] 取源、目的地址与外层循环次数，
//! 哈希为 `(src << 32) | (dst & 0xffffffff)`。

use std::arch::asm;

use ubench_core::timer::{elapsed_since, timed, timestamp_ns};
use ubench_core::{Measurement, WorkloadPlan};

use crate::regions::{MoveWidth, address_hash};

// 每次外层迭代重新装载 rsi/rdi/rcx；退出前总是清除方向标志
macro_rules! rep_movs_loop {
    ($direction:literal, $body:literal, $loops:expr, $count:expr, $src:expr, $dst:expr) => {
        // SAFETY: 源区与目的区都在 plan 的缓冲区内且互不重叠，DF 在退出前被清除
        unsafe {
            asm!(
                $direction,
                "test {n}, {n}",
                ".p2align 6",
                "2:",
                "jz 3f",
                "mov rsi, {src}",
                "mov rdi, {dst}",
                "mov rcx, {count}",
                $body,
                "dec {n}",
                "jmp 2b",
                "3:",
                "cld",
                n = inout(reg) $loops => _,
                src = in(reg) $src,
                dst = in(reg) $dst,
                count = in(reg) $count,
                out("rsi") _,
                out("rdi") _,
                out("rcx") _,
                options(nostack),
            );
        }
    };
}

pub(super) fn rep_movs(plan: &mut WorkloadPlan, width: MoveWidth, backwards: bool) -> Measurement {
    let copy = plan.copy_bytes();
    let count = copy / width.bytes();
    // 反向拷贝从最后一个元素开始
    let start = if backwards {
        copy.saturating_sub(width.bytes())
    } else {
        0
    };
    let src = plan.src_ptr() as u64 + start;
    let dst = plan.dst_ptr() as u64 + start;
    let loops = plan.outer_loop_count();

    let measurement = timed(|| {
        match (backwards, width) {
            (false, MoveWidth::Byte) => rep_movs_loop!("cld", "rep movsb", loops, count, src, dst),
            (false, MoveWidth::Word) => rep_movs_loop!("cld", "rep movsw", loops, count, src, dst),
            (false, MoveWidth::Dword) => rep_movs_loop!("cld", "rep movsd", loops, count, src, dst),
            (false, MoveWidth::Qword) => rep_movs_loop!("cld", "rep movsq", loops, count, src, dst),
            (true, MoveWidth::Byte) => rep_movs_loop!("std", "rep movsb", loops, count, src, dst),
            (true, MoveWidth::Word) => rep_movs_loop!("std", "rep movsw", loops, count, src, dst),
            (true, MoveWidth::Dword) => rep_movs_loop!("std", "rep movsd", loops, count, src, dst),
            (true, MoveWidth::Qword) => rep_movs_loop!("std", "rep movsq", loops, count, src, dst),
        }
        address_hash(src, dst)
    });
    log::debug!("rep_movs: {loops} x {count} elements in {} ns", measurement.elapsed_ns);
    measurement
}

// 拷贝大小不超过 256 字节时，每次外层迭代完整展开
macro_rules! flat_copy {
    ($ld:literal, $st:literal, $offsets:literal, $loops:expr, $src:expr, $dst:expr) => {
        // SAFETY: 偏移都在拷贝范围内，源区与目的区互不重叠
        unsafe {
            asm!(
                ".p2align 6",
                "2:",
                concat!(".irp off, ", $offsets),
                concat!($ld, " ymm0, ymmword ptr [{src} + \\off]"),
                concat!($st, " ymmword ptr [{dst} + \\off], ymm0"),
                ".endr",
                "dec {n}",
                "jnz 2b",
                n = inout(reg) $loops => _,
                src = in(reg) $src,
                dst = in(reg) $dst,
                out("ymm0") _,
                options(nostack),
            );
        }
    };
}

// 更大的拷贝以 256 字节为一块做内层循环
macro_rules! chunked_copy {
    ($ld:literal, $st:literal, $chunks:expr, $loops:expr, $src:expr, $dst:expr) => {
        // SAFETY: chunks * 256 等于拷贝大小，源区与目的区互不重叠
        unsafe {
            asm!(
                "2:",
                "mov {i}, {chunks}",
                "mov {s}, {src}",
                "mov {d}, {dst}",
                "3:",
                ".irp off, 0x00, 0x20, 0x40, 0x60, 0x80, 0xa0, 0xc0, 0xe0",
                concat!($ld, " ymm0, ymmword ptr [{s} + \\off]"),
                concat!($st, " ymmword ptr [{d} + \\off], ymm0"),
                ".endr",
                "add {s}, 0x100",
                "add {d}, 0x100",
                "dec {i}",
                "jnz 3b",
                "dec {n}",
                "jnz 2b",
                n = inout(reg) $loops => _,
                i = out(reg) _,
                s = out(reg) _,
                d = out(reg) _,
                chunks = in(reg) $chunks,
                src = in(reg) $src,
                dst = in(reg) $dst,
                out("ymm0") _,
                options(nostack),
            );
        }
    };
}

macro_rules! wide_copy_with {
    ($ld:literal, $st:literal, $log_size:expr, $loops:expr, $src:expr, $dst:expr) => {
        match $log_size {
            5 => flat_copy!($ld, $st, "0x00", $loops, $src, $dst),
            6 => flat_copy!($ld, $st, "0x00, 0x20", $loops, $src, $dst),
            7 => flat_copy!($ld, $st, "0x00, 0x20, 0x40, 0x60", $loops, $src, $dst),
            8 => flat_copy!(
                $ld,
                $st,
                "0x00, 0x20, 0x40, 0x60, 0x80, 0xa0, 0xc0, 0xe0",
                $loops,
                $src,
                $dst
            ),
            log @ 9..=31 => chunked_copy!($ld, $st, 1u64 << (log - 8), $loops, $src, $dst),
            _ => {}
        }
    };
}

/// # Safety
/// 调用方必须确认 CPU 支持 AVX，`log_size` 在 5..=31 之间且 plan 的拷贝大小为 `1 << log_size`；
/// `aligned_src`/`aligned_dst` 为真时对应地址必须按 32 字节对齐
#[target_feature(enable = "avx")]
pub(super) unsafe fn wide_copy(
    plan: &mut WorkloadPlan,
    log_size: u32,
    aligned_src: bool,
    aligned_dst: bool,
) -> Measurement {
    let src = plan.src_ptr() as u64;
    let dst = plan.dst_ptr() as u64;
    let loops = plan.outer_loop_count();

    let start = timestamp_ns();
    if loops > 0 {
        match (aligned_src, aligned_dst) {
            (false, false) => wide_copy_with!("vmovupd", "vmovupd", log_size, loops, src, dst),
            (false, true) => wide_copy_with!("vmovupd", "vmovapd", log_size, loops, src, dst),
            (true, false) => wide_copy_with!("vmovapd", "vmovupd", log_size, loops, src, dst),
            (true, true) => wide_copy_with!("vmovapd", "vmovapd", log_size, loops, src, dst),
        }
    }
    Measurement::new(elapsed_since(start), address_hash(src, dst))
}
