//! 内存拷贝基准
//!
//! 三个基准都通过 [`WorkloadPlan`] 规划缓冲区与外层循环次数，
//! 指标为每纳秒拷贝的字节数（GBPS）。

use std::hint::black_box;
use std::ptr;

use log::debug;
use ubench_core::config::{CACHELINE_SIZE, MAX_LOG_COPY_SIZE};
use ubench_core::timer::{elapsed_since, timestamp_ns};
use ubench_core::workload::MAX_COPY_SIZE;
use ubench_core::{BenchError, Measurement, Outcome, WorkloadPlan, byte_string};

use super::{GBPS, not_applicable, report, resource_row};
use crate::regions::{MeasuredRegions, MoveWidth, Probe, Region, address_hash};

fn check_alignment(benchmark: &'static str, src_align: u32, dst_align: u32) -> Result<(), BenchError> {
    let limit = CACHELINE_SIZE as u32;
    if src_align >= limit || dst_align >= limit {
        return Err(BenchError::invalid(
            benchmark,
            format!("alignment offsets ({src_align}, {dst_align}) must be below {limit}"),
        ));
    }
    Ok(())
}

fn plan_copy(
    benchmark: &'static str,
    copy_bytes: u64,
    src_align: u32,
    dst_align: u32,
) -> Result<WorkloadPlan, BenchError> {
    WorkloadPlan::allocate(
        benchmark,
        copy_bytes,
        CACHELINE_SIZE,
        src_align as usize,
        dst_align as usize,
    )
}

fn copied_bytes(plan: &WorkloadPlan) -> f64 {
    plan.outer_loop_count() as f64 * plan.copy_bytes() as f64
}

/// `rep movs` 拷贝带宽
///
/// `data_size` 为元素宽度（1/2/4/8），`direction` 为 1 时反向拷贝。
pub fn max_rep_movs<K: MeasuredRegions>(
    data_size: u32,
    copy_size: u32,
    src_align: u32,
    dst_align: u32,
    direction: u32,
) -> Outcome {
    const NAME: &str = "max_rep_movs";
    let width = MoveWidth::from_bytes(data_size)
        .ok_or_else(|| BenchError::invalid(NAME, format!("data size {data_size} is not 1, 2, 4 or 8")))?;
    if direction > 1 {
        return Err(BenchError::invalid(NAME, format!("direction flag {direction} is not 0 or 1")));
    }
    if u64::from(copy_size) % width.bytes() != 0 {
        return Err(BenchError::invalid(
            NAME,
            format!("copy size {copy_size} is not a multiple of {data_size}"),
        ));
    }
    if u64::from(copy_size) > MAX_COPY_SIZE {
        return Err(BenchError::invalid(NAME, format!("copy size {copy_size} exceeds {MAX_COPY_SIZE}")));
    }
    check_alignment(NAME, src_align, dst_align)?;

    let label = format!(
        "max_rep_movs(dsize: {data_size}, cpsize: {copy_size},\tsrcalign: {src_align}, dstalign: {dst_align}, df: {direction})"
    );
    if !K::supports(Probe::RepMovs) {
        return not_applicable(&label, GBPS);
    }
    let mut plan = match plan_copy(NAME, u64::from(copy_size), src_align, dst_align) {
        Ok(plan) => plan,
        Err(err) => return resource_row(&label, GBPS, err),
    };
    let region = K::rep_movs(&mut plan, width, direction == 1);
    report(&label, region, copied_bytes(&plan), GBPS)
}

/// 32 字节向量拷贝带宽
///
/// 源、目的偏移都是 32 的倍数且 `force_unaligned` 为 0 时使用对齐访存。
pub fn max_avx_copy<K: MeasuredRegions>(
    log_size: u32,
    src_align: u32,
    dst_align: u32,
    force_unaligned: u32,
) -> Outcome {
    const NAME: &str = "max_avx_copy";
    if !(5..=MAX_LOG_COPY_SIZE).contains(&log_size) {
        return Err(BenchError::invalid(
            NAME,
            format!("log copy size {log_size} is outside 5..={MAX_LOG_COPY_SIZE}"),
        ));
    }
    check_alignment(NAME, src_align, dst_align)?;

    let label = format!(
        "max_avx_copy(cpsize: {},\tsrcalign: {src_align}, dstalign: {dst_align})",
        byte_string(log_size)
    );
    if !K::supports(Probe::WideCopy) {
        return not_applicable(&label, GBPS);
    }
    let mut plan = match plan_copy(NAME, 1u64 << log_size, src_align, dst_align) {
        Ok(plan) => plan,
        Err(err) => return resource_row(&label, GBPS, err),
    };
    let aligned_src = src_align & 0x1f == 0 && force_unaligned == 0;
    let aligned_dst = dst_align & 0x1f == 0 && force_unaligned == 0;
    let region = K::wide_copy(&mut plan, log_size, aligned_src, aligned_dst);
    report(&label, region, copied_bytes(&plan), GBPS)
}

/// 拷贝策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// `rep movsb`
    RepMovsb,
    /// 库函数拷贝
    Memcpy,
    /// 头尾两个可能重叠的定长块
    OverlappingBlocks,
}

impl CopyStrategy {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::RepMovsb),
            1 => Some(Self::Memcpy),
            2 => Some(Self::OverlappingBlocks),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RepMovsb => "rep_movsb",
            Self::Memcpy => "memcpy",
            Self::OverlappingBlocks => "overlapping_blocks",
        }
    }
}

/// 头尾各拷贝一个 `N` 字节块，要求 `N <= len <= 2N`
///
/// # Safety
/// `src` 可读、`dst` 可写 `len` 字节，两者不重叠。
unsafe fn copy_blocks<const N: usize>(dst: *mut u8, src: *const u8, len: usize) {
    // SAFETY: N <= len，头尾两块都在 [0, len) 内
    unsafe {
        let head = ptr::read_unaligned(src as *const [u8; N]);
        let tail = ptr::read_unaligned(src.add(len - N) as *const [u8; N]);
        ptr::write_unaligned(dst as *mut [u8; N], head);
        ptr::write_unaligned(dst.add(len - N) as *mut [u8; N], tail);
    }
}

/// 以重叠定长块拷贝 `len` 字节，超过 128 字节时退回库函数
///
/// # Safety
/// `src` 可读、`dst` 可写 `len` 字节，两者不重叠。
pub(crate) unsafe fn overlapping_copy(dst: *mut u8, src: *const u8, len: usize) {
    // SAFETY: 由调用方保证
    unsafe {
        match len {
            0..=4 => {
                for i in 0..len {
                    *dst.add(i) = *src.add(i);
                }
            }
            5..=8 => copy_blocks::<4>(dst, src, len),
            9..=16 => copy_blocks::<8>(dst, src, len),
            17..=32 => copy_blocks::<16>(dst, src, len),
            33..=64 => copy_blocks::<32>(dst, src, len),
            65..=128 => copy_blocks::<64>(dst, src, len),
            _ => ptr::copy_nonoverlapping(src, dst, len),
        }
    }
}

/// 以软件拷贝函数执行 plan 中的全部外层迭代
fn software_copy(plan: &mut WorkloadPlan, copy: unsafe fn(*mut u8, *const u8, usize)) -> Region {
    let len = plan.copy_bytes() as usize;
    let src = plan.src_ptr();
    let dst = plan.dst_ptr();
    let loops = plan.outer_loop_count();

    let start = timestamp_ns();
    for _ in 0..loops {
        // SAFETY: 源区与目的区都在 plan 的缓冲区内且互不重叠
        unsafe { copy(black_box(dst), black_box(src), len) };
    }
    let elapsed = elapsed_since(start);
    Ok(Measurement::new(elapsed, address_hash(src as u64, dst as u64)))
}

unsafe fn library_copy(dst: *mut u8, src: *const u8, len: usize) {
    // SAFETY: 由调用方保证
    unsafe { ptr::copy_nonoverlapping(src, dst, len) }
}

/// 按策略拷贝 `2^log_size` 字节的带宽
pub fn copy_strategy<K: MeasuredRegions>(
    strategy: u32,
    log_size: u32,
    src_align: u32,
    dst_align: u32,
) -> Outcome {
    const NAME: &str = "copy_strategy";
    let strategy = CopyStrategy::from_index(strategy)
        .ok_or_else(|| BenchError::invalid(NAME, format!("strategy {strategy} is not 0, 1 or 2")))?;
    if log_size > MAX_LOG_COPY_SIZE {
        return Err(BenchError::invalid(
            NAME,
            format!("log copy size {log_size} exceeds {MAX_LOG_COPY_SIZE}"),
        ));
    }
    check_alignment(NAME, src_align, dst_align)?;

    let label = format!(
        "copy_strategy({}, cpsize: {},\tsrcalign: {src_align}, dstalign: {dst_align})",
        strategy.name(),
        byte_string(log_size)
    );
    if strategy == CopyStrategy::RepMovsb && !K::supports(Probe::RepMovs) {
        return not_applicable(&label, GBPS);
    }
    let mut plan = match plan_copy(NAME, 1u64 << log_size, src_align, dst_align) {
        Ok(plan) => plan,
        Err(err) => return resource_row(&label, GBPS, err),
    };
    debug!("{label}: {} copies", plan.outer_loop_count());
    let region = match strategy {
        CopyStrategy::RepMovsb => K::rep_movs(&mut plan, MoveWidth::Byte, false),
        CopyStrategy::Memcpy => software_copy(&mut plan, library_copy),
        CopyStrategy::OverlappingBlocks => software_copy(&mut plan, overlapping_copy),
    };
    report(&label, region, copied_bytes(&plan), GBPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::GenericRegions;

    #[test]
    fn overlapping_copy_matches_source() {
        let src: Vec<u8> = (0..300u32).map(|i| (i * 7 + 3) as u8).collect();
        for len in 0..=300 {
            let mut dst = vec![0u8; 300];
            // SAFETY: 两个缓冲区各有 300 字节且互不重叠
            unsafe { overlapping_copy(dst.as_mut_ptr(), src.as_ptr(), len) };
            assert_eq!(&dst[..len], &src[..len], "len {len}");
            assert!(dst[len..].iter().all(|&b| b == 0), "len {len} wrote past the end");
        }
    }

    #[test]
    fn rep_movs_parameter_domain() {
        let err = |r: Outcome| matches!(r, Err(BenchError::InvalidParameter { .. }));
        assert!(err(max_rep_movs::<GenericRegions>(3, 64, 0, 0, 0)));
        assert!(err(max_rep_movs::<GenericRegions>(8, 60, 0, 0, 0)));
        assert!(err(max_rep_movs::<GenericRegions>(8, 64, 64, 0, 0)));
        assert!(err(max_rep_movs::<GenericRegions>(8, 64, 0, 0, 2)));
    }

    #[test]
    fn rep_movs_not_applicable_keeps_full_label() {
        let result = max_rep_movs::<GenericRegions>(8, 64, 0, 0, 0).unwrap();
        assert_eq!(
            result.function,
            "max_rep_movs(dsize: 8, cpsize: 64,\tsrcalign: 0, dstalign: 0, df: 0) NOT APPLICABLE on Current Platform"
        );
        assert_eq!(result.metric_name, "GBPS");
    }

    #[test]
    fn avx_copy_size_range() {
        assert!(max_avx_copy::<GenericRegions>(4, 0, 0, 0).is_err());
        assert!(max_avx_copy::<GenericRegions>(32, 0, 0, 0).is_err());
        let result = max_avx_copy::<GenericRegions>(12, 0, 0, 0).unwrap();
        assert!(result.function.starts_with("max_avx_copy(cpsize: 4 KB,\tsrcalign: 0, dstalign: 0)"));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(CopyStrategy::from_index(2), Some(CopyStrategy::OverlappingBlocks));
        assert_eq!(CopyStrategy::from_index(3), None);
        assert!(copy_strategy::<GenericRegions>(3, 6, 0, 0).is_err());
    }

    #[test]
    fn rep_movsb_strategy_label() {
        let result = copy_strategy::<GenericRegions>(0, 6, 1, 2).unwrap();
        assert!(result.function.starts_with("copy_strategy(rep_movsb, cpsize: 64 bytes,\tsrcalign: 1, dstalign: 2)"));
        assert!(result.function.contains("NOT APPLICABLE"));
    }
}
