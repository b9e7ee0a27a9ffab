//! 基准结果
//!
//! 每次基准调用产生一个 [`BenchResult`]，通过 `Display` 渲染为一行：
//! `<function>\tresulthash=<hex>\t<metric_name>=<metric>`。

use std::fmt;

use crate::config::{ALLOCATION_FAILED_SUFFIX, NOT_APPLICABLE_SUFFIX};

/// 测量区域的原始输出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// 被测循环耗时（纳秒）
    pub elapsed_ns: u64,
    /// 循环可观察副作用的哈希，防止被优化掉
    pub hash: u64,
}

impl Measurement {
    pub fn new(elapsed_ns: u64, hash: u64) -> Self {
        Self { elapsed_ns, hash }
    }

    /// 每纳秒完成的工作量
    ///
    /// 耗时按至少 1ns 计算，保证结果有限且非负。
    pub fn rate(&self, work: f64) -> f64 {
        work / self.elapsed_ns.max(1) as f64
    }
}

/// 单个基准的结果记录
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    /// 基准名称及实际参数
    pub function: String,
    /// 辅助哈希
    pub result_hash: u64,
    /// 指标值
    pub metric: f64,
    /// 指标单位
    pub metric_name: &'static str,
}

impl BenchResult {
    /// 由一次测量构造结果
    pub fn measured(
        function: impl Into<String>,
        measurement: Measurement,
        work: f64,
        metric_name: &'static str,
    ) -> Self {
        Self {
            function: function.into(),
            result_hash: measurement.hash,
            metric: measurement.rate(work),
            metric_name,
        }
    }

    /// 当前平台不支持该基准
    pub fn not_applicable(function: &str, metric_name: &'static str) -> Self {
        Self {
            function: format!("{function} {NOT_APPLICABLE_SUFFIX}"),
            result_hash: 0,
            metric: f64::NAN,
            metric_name,
        }
    }

    /// 缓冲区分配失败
    pub fn allocation_failed(function: &str, metric_name: &'static str) -> Self {
        Self {
            function: format!("{function} {ALLOCATION_FAILED_SUFFIX}"),
            result_hash: 0,
            metric: f64::NAN,
            metric_name,
        }
    }

    /// 指标是否为有效测量值
    pub fn is_valid(&self) -> bool {
        self.metric.is_finite() && self.metric >= 0.0
    }

    /// 按比例缩放指标（IPC → 带宽）
    pub fn scaled(mut self, factor: f64, metric_name: &'static str) -> Self {
        self.metric *= factor;
        self.metric_name = metric_name;
        self
    }
}

impl fmt::Display for BenchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\tresulthash={:x}\t{}=",
            self.function, self.result_hash, self.metric_name
        )?;
        // 与 printf("%.6f") 一致，哨兵值写作小写 nan
        if self.metric.is_nan() {
            f.write_str("nan")
        } else {
            write!(f, "{:.6}", self.metric)
        }
    }
}
