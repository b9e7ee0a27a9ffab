//! 基准目录
//!
//! 每个基准都是对 [`MeasuredRegions`](crate::regions::MeasuredRegions) 泛型的普通函数：
//! 先校验参数并在计时窗口外准备缓冲区，再调用测量区域，最后把耗时换算为指标。
//! 平台不支持与分配失败转换为结果行；参数越界作为调用错误向上传播。

pub mod alu;
pub mod branch;
pub mod copy;
pub mod memops;
pub mod serializing;
pub mod stlf;
pub mod vector;

use log::{debug, warn};
use ubench_core::{BenchError, BenchResult, Outcome};

use crate::regions::Region;

/// 十亿次操作每秒
pub const GOPS: &str = "GOPS";

/// 十亿字节每秒
pub const GBPS: &str = "GBPS";

/// 十亿次迭代每秒
pub const BILLION_ITER: &str = "Billion_Iter_per_sec";

/// 把测量区域的结果换算为结果行
///
/// `work` 为计时窗口内完成的操作数（或字节数）。
pub(crate) fn report(label: &str, region: Region, work: f64, unit: &'static str) -> Outcome {
    match region {
        Ok(measurement) => {
            debug!("{label}: {} ns, work {work}", measurement.elapsed_ns);
            Ok(BenchResult::measured(label, measurement, work, unit))
        }
        Err(err) => resource_row(label, unit, err),
    }
}

/// 平台不支持与分配失败转换为结果行，其余错误原样返回
pub(crate) fn resource_row(label: &str, unit: &'static str, err: BenchError) -> Outcome {
    match err {
        BenchError::Unsupported { operation, arch } => {
            warn!("{label}: {operation} has no implementation on {arch}");
            Ok(BenchResult::not_applicable(label, unit))
        }
        BenchError::Allocation { size, align } => {
            warn!("{label}: failed to allocate {size} bytes aligned to {align}");
            Ok(BenchResult::allocation_failed(label, unit))
        }
        other => Err(other),
    }
}

/// 不支持时直接给出的结果行
pub(crate) fn not_applicable(label: &str, unit: &'static str) -> Outcome {
    warn!("{label}: not applicable on this platform");
    Ok(BenchResult::not_applicable(label, unit))
}
