//! cputest 基准目录
//!
//! 顺序即帮助输出的顺序。所有入口都在构建时绑定到 [`HostRegions`]。

use ubench_core::{BenchFn, BenchmarkDescriptor};

use crate::regions::HostRegions;
use crate::suite::{alu, branch, copy, memops, serializing, stlf, vector};

pub static BENCHMARKS: &[BenchmarkDescriptor] = &[
    BenchmarkDescriptor::new(
        "--alu_latency",
        "Dependent ALU latency test (GOPS=back-2-back-add-latency*GHz)",
        BenchFn::Nullary(alu::alu_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--shl_reg_latency Sb",
        "Dependent SHL r64, r32=Sb test (GOPS=back-2-back-add-latency*GHz)",
        BenchFn::Unary(alu::shl_reg_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--shl_imm_latency Sb",
        "Dependent SHL reg, imm=Sb test (Sb=0,1 GOPS=back-2-back-add-latency*GHz)",
        BenchFn::Unary(alu::shl_imm_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--cmov_reg_latency",
        "Dependent CMOV reg, reg test (GOPS=back-2-back-cmov-latency*GHz)",
        BenchFn::Nullary(alu::cmov_reg_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--mov_elimination S",
        "S=1: no unrolling. S=0: Unroll. Tests if reg reg mov is eliminated (GOPS = elim ? ~GHz : ~(GHz/2))",
        BenchFn::Unary(alu::mov_elimination::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_alu_ipc",
        "MAX Integer IPC test (GOPS=IPC*GHz)",
        BenchFn::Nullary(alu::max_alu_ipc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--vector_int_add_latency W",
        "Dependent width-W vector int latency test (GOPS=back-2-back-add-latency*GHz)",
        BenchFn::Unary(vector::vector_int_add_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_int_add_bandwidth W",
        "MAX width-W vector int IPC test (GOPS=IPC*GHz)",
        BenchFn::Unary(vector::max_vector_int_add_bandwidth::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_rep_movs dsz cpsz sa da df",
        "dsz: data_size, cpsz: copy_size, sa: src_align, da: dst_align, df: direction flag",
        BenchFn::Quinary(copy::max_rep_movs::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--maxavxcopy lcpsz sa da fa",
        "lcpsz: log_copy_size, sa: src_align, da: dst_align, fa: force unaligned memop",
        BenchFn::Quaternary(copy::max_avx_copy::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_scalar_load_ipc",
        "MAX (L1) Scalar Load IPC test (GOPS=IPC*GHz)",
        BenchFn::Nullary(memops::max_scalar_load_ipc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_scalar_load_bandwidth",
        "MAX (L1) Scalar Load Bandwidth test (GBPS)",
        BenchFn::Nullary(memops::max_scalar_load_bandwidth::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_load_ipc",
        "MAX (L1) Vector Load IPC test (GOPS=IPC*GHz)",
        BenchFn::Nullary(memops::max_vector_load_ipc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_load_bandwidth",
        "MAX (L1) Vector Load Bandwidth test (GBPS)",
        BenchFn::Nullary(memops::max_vector_load_bandwidth::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_loads_at_footprint logb",
        "MAX Vector Loads for (1<<logb) bytes (Billion vector loads per sec)",
        BenchFn::Unary(memops::max_vector_loads_at_footprint::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_scalar_store_ipc",
        "MAX (L1) Scalar Store IPC test (GOPS=IPC*GHz)",
        BenchFn::Nullary(memops::max_scalar_store_ipc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_scalar_store_bandwidth",
        "MAX (L1) Scalar Store Bandwidth test (GBPS)",
        BenchFn::Nullary(memops::max_scalar_store_bandwidth::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_store_ipc",
        "MAX (L1) Vector Store IPC test (GOPS=IPC*GHz)",
        BenchFn::Nullary(memops::max_vector_store_ipc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_store_bandwidth",
        "MAX (L1) Vector Store Bandwidth test (GBPS)",
        BenchFn::Nullary(memops::max_vector_store_bandwidth::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--max_vector_stores_at_footprint logb",
        "MAX Vector Stores for (1<<logb) bytes (Billion vector stores per sec)",
        BenchFn::Unary(memops::max_vector_stores_at_footprint::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--branch_history N",
        "Branch History Test (Iter_per_sec = f(history_length))",
        BenchFn::Unary(branch::branch_history::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--taken_branch_latency",
        "Test for correctly predicted conditional branch",
        BenchFn::Nullary(branch::taken_branch_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--indirect_branch_latency",
        "Test for correctly predicted indirect branch",
        BenchFn::Nullary(branch::indirect_branch_latency::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--btbcapacity logsize",
        "Tests rate of prediction for a logsize unique uncond branches",
        BenchFn::Unary(branch::btb_capacity::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--btbcondcapacity logsize patternmask",
        "Tests rate of prediction for a logsize unique conditional branches with a pattern of taken/not-taken behavior that mimics patternmask",
        BenchFn::Binary(branch::btb_conditional_capacity::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--rdtsc",
        "Tests rate of execution of rdtsc (read time stamp counter non serializing)",
        BenchFn::Nullary(serializing::rdtsc::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--rdtscp",
        "Tests rate of execution of rdtscp (read time stamp counter serializing)",
        BenchFn::Nullary(serializing::rdtscp::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--stlf_dependent_pointer_chase D",
        "Tests basic store-to-load forwarding mechanism (dependent load)",
        BenchFn::Unary(stlf::stlf_dependent_pointer_chase::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--stlf_independent_pointer_chase D",
        "Tests basic store-to-load forwarding mechanism (no dependence)",
        BenchFn::Unary(stlf::stlf_independent_pointer_chase::<HostRegions>),
    ),
    BenchmarkDescriptor::new(
        "--copy_strategy V lcpsz sa da",
        "V: 0=rep movsb, 1=memcpy, 2=overlapping blocks, lcpsz: log_copy_size, sa: src_align, da: dst_align",
        BenchFn::Quaternary(copy::copy_strategy::<HostRegions>),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_order_and_size() {
        assert_eq!(BENCHMARKS.len(), 30);
        assert_eq!(BENCHMARKS[0].selector(), "--alu_latency");
        assert_eq!(BENCHMARKS[23].selector(), "--btbcapacity");
        assert_eq!(BENCHMARKS[29].selector(), "--copy_strategy");
    }

    #[test]
    fn placeholders_match_arity() {
        for descriptor in BENCHMARKS {
            let placeholders = descriptor.name.split_whitespace().count() - 1;
            assert_eq!(placeholders, descriptor.arity(), "{}", descriptor.name);
        }
    }
}
