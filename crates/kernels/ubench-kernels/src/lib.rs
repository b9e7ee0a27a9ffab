//! cputest 微架构基准
//!
//! - `host`: 宿主 CPU 与向量扩展检测
//! - `regions`: 按架构手写的测量区域
//! - `suite`: 参数校验、缓冲区准备与指标换算
//! - `registry`: 有序的基准目录，供调度器查找

pub mod host;
pub mod regions;
pub mod registry;
pub mod suite;

pub use host::HostCpu;
pub use regions::{GenericRegions, HostRegions, MeasuredRegions};
pub use registry::BENCHMARKS;
