//! 基准框架错误类型
//!
//! 调用错误（未知基准、参数缺失或格式错误、参数越界）对整个进程是致命的；
//! 资源错误与平台不支持只影响单个基准，由基准自身转换为结果行。

use thiserror::Error;

use crate::result::BenchResult;

/// 基准调用的返回值
pub type Outcome = Result<BenchResult, BenchError>;

/// 统一的基准错误
#[derive(Debug, Error)]
pub enum BenchError {
    /// 注册表中没有匹配的基准
    #[error("{0} test not found")]
    UnknownBenchmark(String),

    /// 参数个数不足
    #[error("{benchmark} expects {expected} argument(s), found {found}")]
    MissingArgument {
        benchmark: String,
        expected: usize,
        found: usize,
    },

    /// 参数不是合法整数
    #[error("{0} is not a number")]
    NotANumber(String),

    /// 参数超出整数范围
    #[error("{0} is out of range")]
    OutOfRange(String),

    /// 参数超出基准允许的取值范围
    #[error("{benchmark}: {message}")]
    InvalidParameter {
        benchmark: &'static str,
        message: String,
    },

    /// 对齐内存分配失败
    #[error("failed to allocate {size} bytes aligned to {align}")]
    Allocation { size: usize, align: usize },

    /// 当前平台没有该测量区域的实现
    #[error("{operation} is not supported on {arch}")]
    Unsupported {
        operation: &'static str,
        arch: &'static str,
    },

    /// 输出失败
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// 创建参数范围错误
    pub fn invalid(benchmark: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            benchmark,
            message: message.into(),
        }
    }

    /// 创建平台不支持错误
    pub fn unsupported(operation: &'static str, arch: &'static str) -> Self {
        Self::Unsupported { operation, arch }
    }
}
