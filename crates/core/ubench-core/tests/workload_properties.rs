//! 工作负载规划属性测试

use proptest::prelude::*;
use ubench_core::workload::{MAX_COPY_SIZE, OUTER_LOOP_COUNT_TABLE, required_bytes};
use ubench_core::{WorkloadPlan, outer_loop_count};

proptest! {
    /// 属性测试: 外层循环次数随拷贝大小单调不增
    #[test]
    fn prop_outer_loop_count_non_increasing(a in 0u64..=MAX_COPY_SIZE, b in 0u64..=MAX_COPY_SIZE) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(outer_loop_count(small) >= outer_loop_count(large));
    }

    /// 属性测试: 外层循环次数来自查找表
    #[test]
    fn prop_outer_loop_count_in_table(size in 0u64..=MAX_COPY_SIZE) {
        prop_assert!(OUTER_LOOP_COUNT_TABLE.contains(&outer_loop_count(size)));
    }

    /// 属性测试: 每次运行至少搬运一遍数据，且总字节数有上界
    #[test]
    fn prop_total_bytes_bounded(log in 0u32..=31) {
        let size = 1u64 << log;
        let total = outer_loop_count(size) * size;
        prop_assert!(total >= size);
        prop_assert!(total <= 1u64 << 36);
    }

    /// 属性测试: 分配大小不小于 2*copy + 2*cacheline，且源区与目的区不重叠
    #[test]
    fn prop_allocation_covers_both_ranges(
        copy in 0u64..(1u64 << 16),
        cacheline_log in 4u32..=7,
        src_seed in any::<usize>(),
        dst_seed in any::<usize>(),
    ) {
        let cacheline = 1usize << cacheline_log;
        let src_align = src_seed % cacheline;
        let dst_align = dst_seed % cacheline;
        let mut plan = WorkloadPlan::allocate("prop", copy, cacheline, src_align, dst_align).unwrap();

        prop_assert!(plan.allocated_bytes() as u64 >= required_bytes(copy, cacheline as u64));
        prop_assert!(plan.dst_offset() + copy as usize <= plan.allocated_bytes());
        prop_assert_eq!(plan.src_ptr() as usize % cacheline, src_align);
        prop_assert_eq!(plan.dst_ptr() as usize % cacheline, dst_align);

        let (src, dst) = plan.ranges();
        prop_assert!(src.end <= dst.start);
        prop_assert_eq!(plan.outer_loop_count(), outer_loop_count(copy));
    }
}
