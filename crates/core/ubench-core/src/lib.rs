//! uBench 测量框架核心
//!
//! 提供微基准测试的公共基础设施：
//! - 单调纳秒计时器
//! - 统一的结果记录与输出格式
//! - 基准注册表与命令行调度器
//! - 内存拷贝类基准的工作负载规划与对齐缓冲区

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod parse;
pub mod registry;
pub mod result;
pub mod timer;
pub mod workload;

pub use buffer::AlignedBuffer;
pub use dispatch::{Dispatcher, Invocation, Plan, RunOutcome};
pub use error::{BenchError, Outcome};
pub use format::byte_string;
pub use parse::parse_c_integer;
pub use registry::{BenchFn, BenchmarkDescriptor};
pub use result::{BenchResult, Measurement};
pub use timer::{measure, timestamp_ns};
pub use workload::{WorkloadPlan, outer_loop_count};
