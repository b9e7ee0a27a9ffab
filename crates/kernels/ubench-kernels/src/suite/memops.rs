//! 访存基准：L1 中的最大访存 IPC/带宽，以及给定足迹下的向量访存速率

use ubench_core::config::{
    LOOP1K, LOOP1M, MAX_CACHELINE_SIZE, MAX_FOOTPRINT_LOG, MIN_FOOTPRINT_LOG, RANDOM_SEED,
};
use ubench_core::{AlignedBuffer, BenchError, Outcome, byte_string};

use super::{GOPS, not_applicable, report, resource_row};
use crate::regions::{MeasuredRegions, MemOp, Probe};

/// IPC 换算为带宽后的单位
const BANDWIDTH: &str = "GB/s";

/// 向量访存块的大小与对齐
const VECTOR_BLOCK: usize = 64;

fn scalar_memop_ipc<K: MeasuredRegions>(op: MemOp, label: &str) -> Outcome {
    let mut cell: u64 = 0;
    let region = K::scalar_memops(op, &mut cell, LOOP1M);
    report(label, region, (LOOP1M * LOOP1K) as f64, GOPS)
}

fn vector_memop_ipc<K: MeasuredRegions>(op: MemOp, label: &str) -> Outcome {
    if !K::supports(Probe::VectorMemops) {
        return not_applicable(label, GOPS);
    }
    let mut block = match AlignedBuffer::zeroed(VECTOR_BLOCK, VECTOR_BLOCK) {
        Ok(block) => block,
        Err(err) => return resource_row(label, GOPS, err),
    };
    let region = K::vector_memops(op, &mut block, LOOP1M);
    report(label, region, (LOOP1M * LOOP1K) as f64, GOPS)
}

pub fn max_scalar_load_ipc<K: MeasuredRegions>() -> Outcome {
    scalar_memop_ipc::<K>(MemOp::Load, "max_scalar_load_ipc")
}

pub fn max_scalar_load_bandwidth<K: MeasuredRegions>() -> Outcome {
    let result = scalar_memop_ipc::<K>(MemOp::Load, "max_scalar_load_bandwidth")?;
    Ok(result.scaled(K::SCALAR_BYTES as f64, BANDWIDTH))
}

pub fn max_vector_load_ipc<K: MeasuredRegions>() -> Outcome {
    vector_memop_ipc::<K>(MemOp::Load, "max_vector_load_ipc")
}

pub fn max_vector_load_bandwidth<K: MeasuredRegions>() -> Outcome {
    let result = vector_memop_ipc::<K>(MemOp::Load, "max_vector_load_bandwidth")?;
    Ok(result.scaled(K::VECTOR_BYTES as f64, BANDWIDTH))
}

pub fn max_scalar_store_ipc<K: MeasuredRegions>() -> Outcome {
    scalar_memop_ipc::<K>(MemOp::Store, "max_scalar_store_ipc")
}

pub fn max_scalar_store_bandwidth<K: MeasuredRegions>() -> Outcome {
    let result = scalar_memop_ipc::<K>(MemOp::Store, "max_scalar_store_bandwidth")?;
    Ok(result.scaled(K::SCALAR_BYTES as f64, BANDWIDTH))
}

pub fn max_vector_store_ipc<K: MeasuredRegions>() -> Outcome {
    vector_memop_ipc::<K>(MemOp::Store, "max_vector_store_ipc")
}

pub fn max_vector_store_bandwidth<K: MeasuredRegions>() -> Outcome {
    let result = vector_memop_ipc::<K>(MemOp::Store, "max_vector_store_bandwidth")?;
    Ok(result.scaled(K::VECTOR_BYTES as f64, BANDWIDTH))
}

/// 足迹扫描的指标单位，随向量宽度变化
fn footprint_unit(vector_bytes: u64, op: MemOp) -> &'static str {
    match (vector_bytes, op) {
        (32, MemOp::Load) => "Billion_32_byte_loads_per_sec",
        (32, MemOp::Store) => "Billion_32_byte_stores_per_sec",
        (16, MemOp::Load) => "Billion_16_byte_loads_per_sec",
        (16, MemOp::Store) => "Billion_16_byte_stores_per_sec",
        (_, MemOp::Load) => "Billion_vector_loads_per_sec",
        (_, MemOp::Store) => "Billion_vector_stores_per_sec",
    }
}

/// 外层遍数：16 以上每增加一级足迹减半，限制运行时间
pub fn footprint_passes(log_bytes: u32) -> u64 {
    if log_bytes > 16 {
        LOOP1M >> (log_bytes - 16)
    } else {
        LOOP1M
    }
}

fn vector_memops_at_footprint<K: MeasuredRegions>(
    op: MemOp,
    name: &'static str,
    log_bytes: u32,
) -> Outcome {
    if !(MIN_FOOTPRINT_LOG..=MAX_FOOTPRINT_LOG).contains(&log_bytes) {
        return Err(BenchError::invalid(
            name,
            format!("logb {log_bytes} is outside {MIN_FOOTPRINT_LOG}..={MAX_FOOTPRINT_LOG}"),
        ));
    }

    let label = format!("{name}({})", byte_string(log_bytes));
    let unit = footprint_unit(K::VECTOR_BYTES, op);
    if !K::supports(Probe::FootprintSweep) {
        return not_applicable(&label, unit);
    }

    // 随机内容避免惰性分配与压缩影响带宽
    let mut buffer = match AlignedBuffer::random(1usize << log_bytes, MAX_CACHELINE_SIZE, RANDOM_SEED)
    {
        Ok(buffer) => buffer,
        Err(err) => return resource_row(&label, unit, err),
    };
    let passes = footprint_passes(log_bytes);
    let region = K::footprint_sweep(op, &mut buffer, passes);
    let accesses = passes as f64 * (1u64 << log_bytes) as f64 / K::VECTOR_BYTES.max(1) as f64;
    report(&label, region, accesses, unit)
}

pub fn max_vector_loads_at_footprint<K: MeasuredRegions>(log_bytes: u32) -> Outcome {
    vector_memops_at_footprint::<K>(MemOp::Load, "max_vector_loads_at_footprint", log_bytes)
}

pub fn max_vector_stores_at_footprint<K: MeasuredRegions>(log_bytes: u32) -> Outcome {
    vector_memops_at_footprint::<K>(MemOp::Store, "max_vector_stores_at_footprint", log_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::GenericRegions;

    #[test]
    fn passes_shrink_above_64k() {
        assert_eq!(footprint_passes(11), LOOP1M);
        assert_eq!(footprint_passes(16), LOOP1M);
        assert_eq!(footprint_passes(17), LOOP1M / 2);
        assert_eq!(footprint_passes(34), LOOP1M >> 18);
    }

    #[test]
    fn footprint_outside_range_is_an_invocation_error() {
        assert!(max_vector_loads_at_footprint::<GenericRegions>(10).is_err());
        assert!(max_vector_stores_at_footprint::<GenericRegions>(35).is_err());
    }

    #[test]
    fn footprint_label_uses_byte_string() {
        let result = max_vector_loads_at_footprint::<GenericRegions>(12).unwrap();
        assert!(result.function.starts_with("max_vector_loads_at_footprint(4 KB)"));
        assert_eq!(result.metric_name, "Billion_vector_loads_per_sec");
    }

    #[test]
    fn bandwidth_keeps_sentinel_when_unsupported() {
        let result = max_scalar_store_bandwidth::<GenericRegions>().unwrap();
        assert_eq!(result.metric_name, "GB/s");
        assert!(result.metric.is_nan());
    }
}
