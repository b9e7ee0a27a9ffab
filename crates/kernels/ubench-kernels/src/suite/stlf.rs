//! 存储到加载转发（STLF）指针追逐
//!
//! 每次迭代沿指针链追 D 次，把迭代计数写入链尾，再读回一个槽位。
//! 依赖形式读回刚写入的槽位，必须经由转发；独立形式读回链首。

use ubench_core::Outcome;
use ubench_core::config::{LOOP1M, MAX_CHASE_DEPTH, MIN_CHASE_DEPTH};

use super::{BILLION_ITER, report};
use crate::regions::{CHAIN_SLOTS, MeasuredRegions};

/// 把请求的深度规整为 2..=32 内的 2 的幂
///
/// 0 视为最小深度，其余取不超过它的最大 2 的幂。
pub fn normalize_depth(depth: u32) -> u32 {
    if depth == 0 {
        return MIN_CHASE_DEPTH;
    }
    (1u32 << (31 - depth.leading_zeros())).clamp(MIN_CHASE_DEPTH, MAX_CHASE_DEPTH)
}

fn pointer_chase<K: MeasuredRegions>(name: &str, depth: u32, dependent: bool) -> Outcome {
    let depth = normalize_depth(depth);
    let label = format!("{name}({depth})");
    let mut chain = [0u64; CHAIN_SLOTS];
    let region = K::store_forwarding(&mut chain, depth, dependent, LOOP1M);
    report(&label, region, LOOP1M as f64, BILLION_ITER)
}

pub fn stlf_dependent_pointer_chase<K: MeasuredRegions>(depth: u32) -> Outcome {
    pointer_chase::<K>("stlf_dependent_pointer_chase", depth, true)
}

pub fn stlf_independent_pointer_chase<K: MeasuredRegions>(depth: u32) -> Outcome {
    pointer_chase::<K>("stlf_independent_pointer_chase", depth, false)
}
