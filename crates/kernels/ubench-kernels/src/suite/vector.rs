//! 向量整数加法基准

use ubench_core::Outcome;
use ubench_core::config::{LOOP16M, LOOP1K, LOOP1M};

use super::{GOPS, not_applicable, report};
use crate::regions::{MeasuredRegions, Probe};

pub fn vector_int_add_latency<K: MeasuredRegions>(width: u32) -> Outcome {
    let label = format!("vector_int_add_latency(width={width})");
    if !K::supports(Probe::VectorAdd { width }) {
        return not_applicable(&label, GOPS);
    }
    let region = K::vector_add_latency(width, LOOP1M);
    report(&label, region, (LOOP1M * LOOP1K) as f64, GOPS)
}

pub fn max_vector_int_add_bandwidth<K: MeasuredRegions>(width: u32) -> Outcome {
    let label = format!("max_vector_int_add_bandwidth(width={width})");
    if !K::supports(Probe::VectorAdd { width }) {
        return not_applicable(&label, GOPS);
    }
    let region = K::vector_add_throughput(width, LOOP16M);
    report(&label, region, (LOOP16M * LOOP1K) as f64, GOPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{GenericRegions, HostRegions};

    #[test]
    fn unknown_width_is_not_applicable() {
        let result = vector_int_add_latency::<HostRegions>(96).unwrap();
        assert!(result.function.starts_with("vector_int_add_latency(width=96)"));
        assert!(result.function.ends_with("NOT APPLICABLE on Current Platform"));
    }

    #[test]
    fn generic_platform_has_no_vectors() {
        let result = max_vector_int_add_bandwidth::<GenericRegions>(128).unwrap();
        assert!(result.metric.is_nan());
    }
}
