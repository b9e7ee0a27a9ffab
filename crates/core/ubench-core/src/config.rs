//! 调优常量
//!
//! 所有基准共享的循环次数、对齐与参数范围。

// ============================================================================
// 循环次数
// ============================================================================

pub const LOOP1K: u64 = 1 << 10;
pub const LOOP1M: u64 = 1 << 20;
pub const LOOP16M: u64 = 1 << 24;
pub const LOOP1G: u64 = 1 << 30;

// ============================================================================
// 内存布局
// ============================================================================

/// 默认缓存行大小（字节）
pub const CACHELINE_SIZE: usize = 64;

/// 支持的最大缓存行大小，足迹扫描缓冲区按此对齐
pub const MAX_CACHELINE_SIZE: usize = 128;

/// 单次拷贝大小的上限为 `1 << MAX_LOG_COPY_SIZE`
pub const MAX_LOG_COPY_SIZE: u32 = 31;

// ============================================================================
// 基准参数
// ============================================================================

/// 随机填充与分支模式表使用的固定种子
pub const RANDOM_SEED: u64 = 1220;

/// STLF 指针链的最大深度
pub const MAX_CHASE_DEPTH: u32 = 32;

/// STLF 指针链的最小深度
pub const MIN_CHASE_DEPTH: u32 = 2;

/// BTB 容量测试允许的最大 log2(分支数)
pub const MAX_BTB_LOGSIZE: u32 = 16;

/// 足迹扫描允许的 log2(字节数) 范围
pub const MIN_FOOTPRINT_LOG: u32 = 11;
pub const MAX_FOOTPRINT_LOG: u32 = 34;

/// 结果标签中的不适用提示
pub const NOT_APPLICABLE_SUFFIX: &str = "NOT APPLICABLE on Current Platform";

/// 结果标签中的分配失败提示
pub const ALLOCATION_FAILED_SUFFIX: &str = "could not allocate memory";
