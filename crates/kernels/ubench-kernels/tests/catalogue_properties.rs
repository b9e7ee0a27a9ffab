//! 基准目录与参数域的属性测试

use proptest::prelude::*;
use ubench_core::{BenchError, Dispatcher, Plan};
use ubench_kernels::suite::{branch, copy, memops, stlf};
use ubench_kernels::{BENCHMARKS, GenericRegions};

fn is_invalid(outcome: Result<ubench_core::BenchResult, BenchError>) -> bool {
    matches!(outcome, Err(BenchError::InvalidParameter { .. }))
}

// ============================================================================
// 目录结构
// ============================================================================

#[test]
fn selectors_are_unique_and_prefixed() {
    let mut seen = std::collections::HashSet::new();
    for descriptor in BENCHMARKS {
        let selector = descriptor.selector();
        assert!(selector.starts_with("--"), "{selector}");
        assert!(seen.insert(selector), "duplicate {selector}");
        assert!(descriptor.arity() <= 5);
        assert!(!descriptor.help.is_empty());
    }
}

#[test]
fn every_selector_resolves_to_itself() {
    let dispatcher = Dispatcher::new(BENCHMARKS);
    for descriptor in BENCHMARKS {
        let found = dispatcher.lookup(descriptor.selector()).unwrap();
        assert_eq!(found.name, descriptor.name);
    }
}

#[test]
fn chained_invocations_consume_their_arguments() {
    let args = ["--btbcapacity", "4", "--rdtsc", "--btbcondcapacity", "3", "0xff"];
    match Dispatcher::new(BENCHMARKS).plan(&args).unwrap() {
        Plan::Run(invocations) => {
            let selectors: Vec<_> = invocations.iter().map(|i| i.descriptor.selector()).collect();
            assert_eq!(selectors, ["--btbcapacity", "--rdtsc", "--btbcondcapacity"]);
            assert_eq!(invocations[2].args, [3, 0xff]);
        }
        Plan::Help => panic!("expected a run plan"),
    }
}

#[test]
fn generic_platform_turns_every_region_into_a_row() {
    let outcomes = [
        memops::max_vector_load_ipc::<GenericRegions>(),
        memops::max_scalar_load_bandwidth::<GenericRegions>(),
        memops::max_vector_stores_at_footprint::<GenericRegions>(20),
        branch::indirect_branch_latency::<GenericRegions>(),
        branch::btb_capacity::<GenericRegions>(10),
        stlf::stlf_dependent_pointer_chase::<GenericRegions>(16),
        copy::max_avx_copy::<GenericRegions>(8, 0, 0, 1),
    ];
    for outcome in outcomes {
        let result = outcome.unwrap();
        assert!(result.function.ends_with("NOT APPLICABLE on Current Platform"));
        assert!(result.metric.is_nan());
        assert_eq!(result.result_hash, 0);
    }
}

// ============================================================================
// 参数域
// ============================================================================

proptest! {
    /// 属性测试: logsize 超过 16 总是调用错误
    #[test]
    fn prop_btb_logsize_limit(logsize in 0u32..64) {
        let outcome = branch::btb_capacity::<GenericRegions>(logsize);
        prop_assert_eq!(is_invalid(outcome), logsize > 16);
    }

    /// 属性测试: 足迹只接受 11..=34
    #[test]
    fn prop_footprint_range(logb in 0u32..64) {
        let outcome = memops::max_vector_loads_at_footprint::<GenericRegions>(logb);
        prop_assert_eq!(is_invalid(outcome), !(11..=34).contains(&logb));
    }

    /// 属性测试: rep movs 的元素宽度只能是 1/2/4/8
    #[test]
    fn prop_rep_movs_width(dsz in 0u32..16) {
        let outcome = copy::max_rep_movs::<GenericRegions>(dsz, 64, 0, 0, 0);
        prop_assert_eq!(is_invalid(outcome), ![1, 2, 4, 8].contains(&dsz));
    }

    /// 属性测试: 对齐偏移必须小于缓存行
    #[test]
    fn prop_alignment_below_cacheline(sa in 0u32..128, da in 0u32..128) {
        let outcome = copy::max_avx_copy::<GenericRegions>(6, sa, da, 0);
        prop_assert_eq!(is_invalid(outcome), sa >= 64 || da >= 64);
    }

    /// 属性测试: STLF 标签中的深度总是 2..=32 内的 2 的幂
    #[test]
    fn prop_stlf_depth_normalized(depth in any::<u32>()) {
        let d = stlf::normalize_depth(depth);
        prop_assert!(d.is_power_of_two());
        prop_assert!((2..=32).contains(&d));
        if (2..=32).contains(&depth) {
            prop_assert!(d <= depth && depth < 2 * d);
        }
    }
}
