//! 整数 ALU 基准

use ubench_core::Outcome;
use ubench_core::config::{LOOP16M, LOOP1G, LOOP1K, LOOP1M};

use super::{GOPS, report};
use crate::regions::MeasuredRegions;

fn nonzero(flag: u32) -> &'static str {
    if flag != 0 { "nonzero" } else { "zero" }
}

/// 相互依赖的加法延迟
pub fn alu_latency<K: MeasuredRegions>() -> Outcome {
    let region = K::dependent_adds(LOOP1M);
    report("alu_latency", region, (LOOP1M * LOOP1K) as f64, GOPS)
}

/// 按寄存器移位的延迟，移位数取 `shift` 的低 8 位
pub fn shl_reg_latency<K: MeasuredRegions>(shift: u32) -> Outcome {
    let label = format!("shl_reg_latency({})", nonzero(shift));
    let region = K::shift_register(LOOP1M, shift as u8);
    report(&label, region, (LOOP1M * LOOP1K) as f64, GOPS)
}

/// 按立即数移位的延迟，非零参数一律移 1 位
pub fn shl_imm_latency<K: MeasuredRegions>(shift: u32) -> Outcome {
    let label = format!("shl_imm_latency({})", nonzero(shift));
    let region = K::shift_immediate(LOOP1M, shift != 0);
    report(&label, region, (LOOP1M * LOOP1K) as f64, GOPS)
}

pub fn cmov_reg_latency<K: MeasuredRegions>() -> Outcome {
    let region = K::conditional_moves(LOOP1M);
    report("cmov_reg_latency", region, (LOOP1M * LOOP1K) as f64, GOPS)
}

/// 寄存器间 mov 是否被消除
///
/// `single` 非零时每次循环迭代只有一对 add/mov；为零时展开 1024 对。
/// 两种形式都执行 `LOOP1G` 对。
pub fn mov_elimination<K: MeasuredRegions>(single: u32) -> Outcome {
    let label = format!("mov_elimination({single})");
    let region = K::move_elimination(LOOP1G, single == 0);
    report(&label, region, LOOP1G as f64, GOPS)
}

/// 8 条独立依赖链上的最大整数 IPC
pub fn max_alu_ipc<K: MeasuredRegions>() -> Outcome {
    let region = K::independent_adds(LOOP16M);
    report("max_alu_ipc", region, (LOOP16M * LOOP1K) as f64, GOPS)
}
