//! 测量区域
//!
//! 每个被测循环都是一个固定的指令序列，只能按目标架构手写。
//! [`MeasuredRegions`] 是这些序列的统一入口：每个架构提供一个实现，
//! 在构建时通过 `cfg_if!` 选出 [`HostRegions`]。没有实现的区域返回
//! [`BenchError::Unsupported`]，由上层基准转换为 NOT APPLICABLE 结果。

use ubench_core::{AlignedBuffer, BenchError, Measurement, WorkloadPlan};

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
pub use aarch64::Aarch64Regions;
#[cfg(target_arch = "x86_64")]
pub use x86_64::X86_64Regions;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        /// 当前构建目标的测量区域实现
        pub type HostRegions = X86_64Regions;
    } else if #[cfg(target_arch = "aarch64")] {
        /// 当前构建目标的测量区域实现
        pub type HostRegions = Aarch64Regions;
    } else {
        /// 当前构建目标的测量区域实现
        pub type HostRegions = GenericRegions;
    }
}

/// 测量区域的返回值
pub type Region = Result<Measurement, BenchError>;

/// STLF 指针链的槽位数（最大深度 + 1）
pub const CHAIN_SLOTS: usize = ubench_core::config::MAX_CHASE_DEPTH as usize + 1;

/// 拷贝基准的结果哈希：源地址左移 32 位，低 32 位取目的地址
pub(crate) fn address_hash(src: u64, dst: u64) -> u64 {
    (src << 32) | (dst & 0xffff_ffff)
}

/// 访存方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOp {
    Load,
    Store,
}

/// `rep movs` 的元素宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveWidth {
    Byte,
    Word,
    Dword,
    Qword,
}

impl MoveWidth {
    /// 由字节数构造，只接受 1/2/4/8
    pub fn from_bytes(bytes: u32) -> Option<Self> {
        match bytes {
            1 => Some(Self::Byte),
            2 => Some(Self::Word),
            4 => Some(Self::Dword),
            8 => Some(Self::Qword),
            _ => None,
        }
    }

    pub fn bytes(&self) -> u64 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
            Self::Qword => 8,
        }
    }
}

/// 需要在运行前按 CPU 特性判定的测量区域
///
/// 其余区域在各自架构上总是可用，未实现时直接返回 `Unsupported`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    VectorAdd { width: u32 },
    VectorMemops,
    FootprintSweep,
    RepMovs,
    WideCopy,
}

/// 按架构实现的测量区域
///
/// 所有区域都只计时被测循环本身；缓冲区由调用方在计时前准备好。
/// `loops` 参数为外层迭代次数，每次迭代内的展开次数在各方法中注明。
pub trait MeasuredRegions {
    /// 架构名称
    const ARCH: &'static str;

    /// 标量访存宽度（字节）
    const SCALAR_BYTES: u64 = 8;

    /// 向量访存宽度（字节），0 表示没有向量访存实现
    const VECTOR_BYTES: u64 = 0;

    /// 当前 CPU 上是否可以运行该区域
    fn supports(probe: Probe) -> bool {
        let _ = probe;
        false
    }

    /// 每次迭代 1024 条相互依赖的整数加法
    fn dependent_adds(loops: u64) -> Region {
        let _ = loops;
        Err(BenchError::unsupported("dependent_adds", Self::ARCH))
    }

    /// 每次迭代 1024 条相互依赖的立即数移位（移 0 位或 1 位）
    fn shift_immediate(loops: u64, by_one: bool) -> Region {
        let _ = (loops, by_one);
        Err(BenchError::unsupported("shift_immediate", Self::ARCH))
    }

    /// 每次迭代 1024 条相互依赖的寄存器移位
    fn shift_register(loops: u64, count: u8) -> Region {
        let _ = (loops, count);
        Err(BenchError::unsupported("shift_register", Self::ARCH))
    }

    /// 每次迭代 512 对相互依赖的条件传送
    fn conditional_moves(loops: u64) -> Region {
        let _ = loops;
        Err(BenchError::unsupported("conditional_moves", Self::ARCH))
    }

    /// 共 `count` 次 add/mov 对；`unrolled` 时每次迭代展开 1024 对
    fn move_elimination(count: u64, unrolled: bool) -> Region {
        let _ = (count, unrolled);
        Err(BenchError::unsupported("move_elimination", Self::ARCH))
    }

    /// 每次迭代 1024 条加法，分布在 8 条独立依赖链上
    fn independent_adds(loops: u64) -> Region {
        let _ = loops;
        Err(BenchError::unsupported("independent_adds", Self::ARCH))
    }

    /// 每次迭代 1024 条相互依赖的 `width` 位向量整数加法
    fn vector_add_latency(width: u32, loops: u64) -> Region {
        let _ = (width, loops);
        Err(BenchError::unsupported("vector_add_latency", Self::ARCH))
    }

    /// 每次迭代 1024 条向量整数加法，8 条独立依赖链
    fn vector_add_throughput(width: u32, loops: u64) -> Region {
        let _ = (width, loops);
        Err(BenchError::unsupported("vector_add_throughput", Self::ARCH))
    }

    /// 每次迭代对同一地址 1024 次标量访存
    fn scalar_memops(op: MemOp, cell: &mut u64, loops: u64) -> Region {
        let _ = (op, cell, loops);
        Err(BenchError::unsupported("scalar_memops", Self::ARCH))
    }

    /// 每次迭代对同一地址 1024 次向量访存，`block` 至少 `VECTOR_BYTES` 字节并按其对齐
    fn vector_memops(op: MemOp, block: &mut AlignedBuffer, loops: u64) -> Region {
        let _ = (op, block, loops);
        Err(BenchError::unsupported("vector_memops", Self::ARCH))
    }

    /// 以向量访存完整扫描 `buffer`（长度为 2 的幂且不小于 2KB）`outer` 遍
    fn footprint_sweep(op: MemOp, buffer: &mut AlignedBuffer, outer: u64) -> Region {
        let _ = (op, buffer, outer);
        Err(BenchError::unsupported("footprint_sweep", Self::ARCH))
    }

    /// `loops` 次总是跳转的循环分支
    fn taken_branches(loops: u64) -> Region {
        let _ = loops;
        Err(BenchError::unsupported("taken_branches", Self::ARCH))
    }

    /// `loops` 次在两个目标间交替的间接跳转
    fn indirect_branches(loops: u64) -> Region {
        let _ = loops;
        Err(BenchError::unsupported("indirect_branches", Self::ARCH))
    }

    /// `loops` 次按 `pattern[i & (len-1)]` 决定方向的条件分支，`pattern` 长度为 2 的幂
    fn branch_history(pattern: &[u64], loops: u64) -> Region {
        let _ = (pattern, loops);
        Err(BenchError::unsupported("branch_history", Self::ARCH))
    }

    /// 每次迭代经过 `1 << logsize` 条互不相同的无条件分支
    fn unconditional_branches(logsize: u32, loops: u64) -> Region {
        let _ = (logsize, loops);
        Err(BenchError::unsupported("unconditional_branches", Self::ARCH))
    }

    /// 每次迭代经过 `1 << logsize` 条条件分支，方向由 `iteration & mask` 决定
    fn conditional_branches(logsize: u32, mask: u64, loops: u64) -> Region {
        let _ = (logsize, mask, loops);
        Err(BenchError::unsupported("conditional_branches", Self::ARCH))
    }

    /// 每次迭代沿指针链追 `depth` 次、写入链尾，再读回链尾（`dependent`）或链首
    fn store_forwarding(
        chain: &mut [u64; CHAIN_SLOTS],
        depth: u32,
        dependent: bool,
        loops: u64,
    ) -> Region {
        let _ = (chain, depth, dependent, loops);
        Err(BenchError::unsupported("store_forwarding", Self::ARCH))
    }

    /// 每次迭代 1024 次时间戳计数器读取
    fn timestamp_reads(serializing: bool, loops: u64) -> Region {
        let _ = (serializing, loops);
        Err(BenchError::unsupported("timestamp_reads", Self::ARCH))
    }

    /// 按 `plan` 执行 `rep movs` 拷贝；`backwards` 时方向标志置位
    fn rep_movs(plan: &mut WorkloadPlan, width: MoveWidth, backwards: bool) -> Region {
        let _ = (plan, width, backwards);
        Err(BenchError::unsupported("rep_movs", Self::ARCH))
    }

    /// 以 32 字节向量访存拷贝 `1 << log_size` 字节
    fn wide_copy(
        plan: &mut WorkloadPlan,
        log_size: u32,
        aligned_src: bool,
        aligned_dst: bool,
    ) -> Region {
        let _ = (plan, log_size, aligned_src, aligned_dst);
        Err(BenchError::unsupported("wide_copy", Self::ARCH))
    }
}

/// 没有任何手写序列的实现
pub struct GenericRegions;

impl MeasuredRegions for GenericRegions {
    const ARCH: &'static str = std::env::consts::ARCH;
}
