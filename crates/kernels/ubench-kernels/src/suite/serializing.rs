//! 时间戳计数器读取吞吐

use ubench_core::Outcome;
use ubench_core::config::{LOOP1K, LOOP1M};

use super::report;
use crate::regions::MeasuredRegions;

pub fn rdtsc<K: MeasuredRegions>() -> Outcome {
    let region = K::timestamp_reads(false, LOOP1M);
    report("rdtsc", region, (LOOP1M * LOOP1K) as f64, "Billion_rdtsc_per_sec")
}

/// 序列化读取：x86_64 上为 `rdtscp`，aarch64 上在读取前插入 `isb`
pub fn rdtscp<K: MeasuredRegions>() -> Outcome {
    let region = K::timestamp_reads(true, LOOP1M);
    report("rdtscp", region, (LOOP1M * LOOP1K) as f64, "Billion_rdtscp_per_sec")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::GenericRegions;

    #[test]
    fn units_name_the_instruction() {
        assert_eq!(rdtsc::<GenericRegions>().unwrap().metric_name, "Billion_rdtsc_per_sec");
        assert_eq!(rdtscp::<GenericRegions>().unwrap().metric_name, "Billion_rdtscp_per_sec");
    }
}
