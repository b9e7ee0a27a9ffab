//! 分支预测基准：历史长度、跳转延迟与 BTB 容量

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use ubench_core::config::{LOOP16M, LOOP1G, MAX_BTB_LOGSIZE, RANDOM_SEED};
use ubench_core::{BenchError, Outcome};

use super::{BILLION_ITER, GOPS, report, resource_row};
use crate::regions::MeasuredRegions;

/// BTB 容量基准的单位
const BILLION_BRANCHES: &str = "Billion_Branches_per_sec";

/// 不超过 `n` 的最大 2 的幂，`n` 必须非零
fn floor_power_of_two(n: u32) -> usize {
    1usize << (31 - n.leading_zeros())
}

/// 随机方向表，每项为 0 或 1
fn random_pattern(len: usize) -> Result<Vec<u64>, BenchError> {
    let mut pattern = Vec::new();
    pattern
        .try_reserve_exact(len)
        .map_err(|_| BenchError::Allocation {
            size: len * std::mem::size_of::<u64>(),
            align: std::mem::align_of::<u64>(),
        })?;
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    pattern.extend((0..len).map(|_| u64::from(rng.next_u32() & 1)));
    Ok(pattern)
}

/// 在长度为 `2^⌊log2 N⌋` 的随机方向表上执行 16M 次条件分支
pub fn branch_history<K: MeasuredRegions>(n: u32) -> Outcome {
    if n == 0 {
        return Err(BenchError::invalid("branch_history", "history length must be at least 1"));
    }
    let len = floor_power_of_two(n);
    let label = format!("branch_history({len})");
    let pattern = match random_pattern(len) {
        Ok(pattern) => pattern,
        Err(err) => return resource_row(&label, BILLION_ITER, err),
    };
    let region = K::branch_history(&pattern, LOOP16M);
    report(&label, region, LOOP16M as f64, BILLION_ITER)
}

pub fn taken_branch_latency<K: MeasuredRegions>() -> Outcome {
    let region = K::taken_branches(LOOP1G);
    report("taken_branch_latency", region, LOOP1G as f64, GOPS)
}

pub fn indirect_branch_latency<K: MeasuredRegions>() -> Outcome {
    let region = K::indirect_branches(LOOP1G);
    report("indirect_branch_latency", region, LOOP1G as f64, GOPS)
}

fn check_logsize(benchmark: &'static str, logsize: u32) -> Result<(), BenchError> {
    if logsize > MAX_BTB_LOGSIZE {
        return Err(BenchError::invalid(
            benchmark,
            format!("logsize {logsize} exceeds {MAX_BTB_LOGSIZE}"),
        ));
    }
    Ok(())
}

/// 外层迭代次数，使分支总数约为 1G
fn btb_iterations(logsize: u32) -> u64 {
    1u64 << (30 - logsize)
}

/// 每次迭代经过 `2^logsize` 条无条件分支
pub fn btb_capacity<K: MeasuredRegions>(logsize: u32) -> Outcome {
    check_logsize("btb_capacity", logsize)?;
    let label = format!("btb_capacity(logsize={logsize})");
    let loops = btb_iterations(logsize);
    let region = K::unconditional_branches(logsize, loops);
    // 每次迭代末尾的回边分支也计入
    report(&label, region, (LOOP1G + loops) as f64, BILLION_BRANCHES)
}

/// 同 [`btb_capacity`]，分支方向由 `iteration & mask` 决定
pub fn btb_conditional_capacity<K: MeasuredRegions>(logsize: u32, mask: u32) -> Outcome {
    check_logsize("btb_conditional_capacity", logsize)?;
    let label = format!("btb_conditional_capacity(logsize={logsize},patternmask={mask:x})");
    let loops = btb_iterations(logsize);
    let region = K::conditional_branches(logsize, u64::from(mask), loops);
    report(&label, region, (LOOP1G + loops) as f64, BILLION_BRANCHES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::GenericRegions;

    #[test]
    fn history_length_rounds_down() {
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(100), 64);
        assert_eq!(floor_power_of_two(128), 128);
        assert_eq!(floor_power_of_two(u32::MAX), 1 << 31);
    }

    #[test]
    fn pattern_is_reproducible_and_binary() {
        let a = random_pattern(256).unwrap();
        let b = random_pattern(256).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|&x| x <= 1));
        assert!(a.contains(&0) && a.contains(&1));
    }

    #[test]
    fn zero_history_is_rejected() {
        assert!(branch_history::<GenericRegions>(0).is_err());
    }

    #[test]
    fn logsize_limit() {
        assert!(btb_capacity::<GenericRegions>(16).is_ok());
        assert!(matches!(
            btb_capacity::<GenericRegions>(17),
            Err(BenchError::InvalidParameter { .. })
        ));
        assert!(btb_conditional_capacity::<GenericRegions>(17, 1).is_err());
    }

    #[test]
    fn conditional_label_prints_mask_in_hex() {
        let result = btb_conditional_capacity::<GenericRegions>(3, 255).unwrap();
        assert!(result.function.starts_with("btb_conditional_capacity(logsize=3,patternmask=ff)"));
        assert_eq!(result.metric_name, "Billion_Branches_per_sec");
    }
}
