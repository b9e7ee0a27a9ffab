//! 对齐缓冲区
//!
//! 被测循环直接通过裸指针访问的内存块。分配在计时窗口之外完成，
//! 释放随 `Drop` 在计时窗口之后发生。

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::BenchError;

/// 按指定边界对齐、零初始化的堆内存
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AlignedBuffer {
    /// 分配 `size` 字节、按 `align` 对齐的零初始化内存
    ///
    /// `align` 必须是 2 的幂；`size` 为 0 时按 1 字节分配。
    pub fn zeroed(size: usize, align: usize) -> Result<Self, BenchError> {
        let layout = Layout::from_size_align(size.max(1), align)
            .map_err(|_| BenchError::Allocation { size, align })?;
        // SAFETY: layout 的大小非零
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(BenchError::Allocation { size, align })?;
        log::debug!("allocated {size} bytes aligned to {align}");
        Ok(Self { ptr, layout })
    }

    /// 分配后用固定种子的伪随机字节填充
    pub fn random(size: usize, align: usize, seed: u64) -> Result<Self, BenchError> {
        let mut buffer = Self::zeroed(size, align)?;
        fill_random(buffer.as_mut_slice(), seed);
        Ok(buffer)
    }

    /// 缓冲区长度（字节）
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// 对齐边界
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr 指向 layout.size() 字节的已初始化内存
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr 指向 layout.size() 字节的已初始化内存，且 &mut self 保证独占
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr 由同一 layout 的 alloc_zeroed 分配
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// 用固定种子的伪随机字节填充切片
pub fn fill_random(bytes: &mut [u8], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    rng.fill_bytes(bytes);
}
