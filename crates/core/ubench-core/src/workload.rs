//! 内存拷贝类基准的工作负载规划
//!
//! 根据单次拷贝大小选择外层循环次数，使一次运行大约耗时 1～2 秒；
//! 同时分配足以容纳源区与目的区（互不重叠）的对齐缓冲区。

use crate::buffer::AlignedBuffer;
use crate::config::MAX_LOG_COPY_SIZE;
use crate::error::BenchError;

/// 按 floor(log2(copy_size)) 索引的外层循环次数
///
/// 小尺寸上拷贝带宽难以预测，次数取较大值以免计时精度主导误差；
/// 大尺寸上次数逐步减少，但仍保证多次遍历末级缓存以上的容量。
pub const OUTER_LOOP_COUNT_TABLE: [u64; MAX_LOG_COPY_SIZE as usize + 1] = [
    1 << 27, // 1B
    1 << 27, // 2B
    1 << 27, // 4B
    1 << 27, // 8B
    1 << 27, // 16B
    1 << 27, // 32B
    1 << 27, // 64B
    1 << 26, // 128B
    1 << 26, // 256B
    1 << 26, // 512B
    1 << 25, // 1KB
    1 << 25, // 2KB
    1 << 24, // 4KB
    1 << 23, // 8KB
    1 << 22, // 16KB
    1 << 20, // 32KB
    1 << 19, // 64KB
    1 << 18, // 128KB
    1 << 17, // 256KB
    1 << 16, // 512KB
    1 << 14, // 1MB
    1 << 12, // 2MB
    1 << 11, // 4MB
    1 << 10, // 8MB
    1 << 9,  // 16MB
    1 << 8,  // 32MB
    1 << 7,  // 64MB
    1 << 7,  // 128MB
    1 << 6,  // 256MB
    1 << 5,  // 512MB
    1 << 4,  // 1GB
    1 << 3,  // 2GB
];

/// 单次拷贝允许的最大字节数
pub const MAX_COPY_SIZE: u64 = 1 << MAX_LOG_COPY_SIZE;

/// 拷贝大小对应的外层循环次数
///
/// `copy_bytes` 为 0 时使用第一档；超过 [`MAX_COPY_SIZE`] 时按最后一档处理。
pub fn outer_loop_count(copy_bytes: u64) -> u64 {
    let index = if copy_bytes == 0 {
        0
    } else {
        (63 - copy_bytes.leading_zeros()).min(MAX_LOG_COPY_SIZE) as usize
    };
    OUTER_LOOP_COUNT_TABLE[index]
}

/// 源区与目的区都放入缓冲区所需的最小字节数
pub fn required_bytes(copy_bytes: u64, cacheline: u64) -> u64 {
    2 * copy_bytes + 2 * cacheline
}

/// 一次拷贝基准的内存布局与循环次数
pub struct WorkloadPlan {
    buffer: AlignedBuffer,
    copy_bytes: u64,
    outer_loop_count: u64,
    src_offset: usize,
    dst_offset: usize,
}

impl WorkloadPlan {
    /// 规划并分配一次拷贝基准
    ///
    /// 源区从 `src_align` 开始；目的区从源区末尾之后的下一个缓存行开始，
    /// 再偏移 `dst_align`。两个偏移都必须小于缓存行大小。
    pub fn allocate(
        benchmark: &'static str,
        copy_bytes: u64,
        cacheline: usize,
        src_align: usize,
        dst_align: usize,
    ) -> Result<Self, BenchError> {
        if copy_bytes > MAX_COPY_SIZE {
            return Err(BenchError::invalid(
                benchmark,
                format!("copy size {copy_bytes} exceeds {MAX_COPY_SIZE}"),
            ));
        }
        if !cacheline.is_power_of_two() {
            return Err(BenchError::invalid(
                benchmark,
                format!("cacheline size {cacheline} is not a power of two"),
            ));
        }
        if src_align >= cacheline || dst_align >= cacheline {
            return Err(BenchError::invalid(
                benchmark,
                format!("alignment offsets ({src_align}, {dst_align}) must be below {cacheline}"),
            ));
        }

        let copy = copy_bytes as usize;
        let src_offset = src_align;
        let dst_offset = ((src_align + copy) / cacheline + 1) * cacheline + dst_align;
        let size = (required_bytes(copy_bytes, cacheline as u64) as usize).max(dst_offset + copy);

        let buffer = AlignedBuffer::zeroed(size, cacheline)?;
        let outer_loop_count = outer_loop_count(copy_bytes);
        log::debug!(
            "{benchmark}: {size} byte buffer, src+{src_offset}, dst+{dst_offset}, {outer_loop_count} copies"
        );

        Ok(Self {
            buffer,
            copy_bytes,
            outer_loop_count,
            src_offset,
            dst_offset,
        })
    }

    pub fn copy_bytes(&self) -> u64 {
        self.copy_bytes
    }

    pub fn outer_loop_count(&self) -> u64 {
        self.outer_loop_count
    }

    /// 分配的缓冲区大小
    pub fn allocated_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn src_offset(&self) -> usize {
        self.src_offset
    }

    pub fn dst_offset(&self) -> usize {
        self.dst_offset
    }

    /// 源区起始地址
    pub fn src_ptr(&mut self) -> *mut u8 {
        // SAFETY: src_offset + copy_bytes 不超过缓冲区长度
        unsafe { self.buffer.as_mut_ptr().add(self.src_offset) }
    }

    /// 目的区起始地址
    pub fn dst_ptr(&mut self) -> *mut u8 {
        // SAFETY: dst_offset + copy_bytes 不超过缓冲区长度
        unsafe { self.buffer.as_mut_ptr().add(self.dst_offset) }
    }

    /// 源区与目的区的起止地址，便于检查重叠
    pub fn ranges(&mut self) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let copy = self.copy_bytes as usize;
        let src = self.src_ptr() as usize;
        let dst = self.dst_ptr() as usize;
        (src..src + copy, dst..dst + copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_by_log2() {
        assert_eq!(outer_loop_count(0), 1 << 27);
        assert_eq!(outer_loop_count(1), 1 << 27);
        assert_eq!(outer_loop_count(64), 1 << 27);
        assert_eq!(outer_loop_count(100), 1 << 26);
        assert_eq!(outer_loop_count(4096), 1 << 24);
        assert_eq!(outer_loop_count(1 << 31), 1 << 3);
    }

    #[test]
    fn table_is_non_increasing() {
        assert!(OUTER_LOOP_COUNT_TABLE.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn worst_case_alignment_fits() {
        let mut plan = WorkloadPlan::allocate("test", 64, 64, 7, 7).unwrap();
        assert_eq!(plan.src_offset(), 7);
        assert_eq!(plan.dst_offset(), 0x87);
        let (src, dst) = plan.ranges();
        assert!(src.end <= dst.start);
        assert!(plan.allocated_bytes() >= 2 * 64 + 2 * 64);
        assert!(plan.dst_offset() + 64 <= plan.allocated_bytes());
    }

    #[test]
    fn small_copies_with_large_offsets_stay_in_bounds() {
        let plan = WorkloadPlan::allocate("test", 1, 64, 63, 63).unwrap();
        assert!(plan.dst_offset() + 1 <= plan.allocated_bytes());
    }

    #[test]
    fn rejects_offsets_beyond_cacheline() {
        assert!(matches!(
            WorkloadPlan::allocate("test", 64, 64, 64, 0),
            Err(BenchError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rejects_oversized_copies() {
        assert!(WorkloadPlan::allocate("test", MAX_COPY_SIZE + 1, 64, 0, 0).is_err());
    }
}
