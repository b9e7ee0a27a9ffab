//! x86_64 测量区域
//!
//! 序列使用 Intel 语法的内联汇编。AVX/AVX2/AVX-512 区域只在
//! [`HostCpu`] 检测到对应扩展后才会进入。

mod alu;
mod branch;
mod copy;
mod memory;
mod serializing;
mod stlf;
mod vector;

use ubench_core::{AlignedBuffer, BenchError, WorkloadPlan};

use super::{CHAIN_SLOTS, MeasuredRegions, MemOp, MoveWidth, Probe, Region};
use crate::host::HostCpu;

/// x86_64 测量区域实现
pub struct X86_64Regions;

impl X86_64Regions {
    fn require(probe: Probe, operation: &'static str) -> Result<(), BenchError> {
        if Self::supports(probe) {
            Ok(())
        } else {
            Err(BenchError::unsupported(operation, Self::ARCH))
        }
    }
}

impl MeasuredRegions for X86_64Regions {
    const ARCH: &'static str = "x86_64";
    const VECTOR_BYTES: u64 = 32;

    fn supports(probe: Probe) -> bool {
        let features = HostCpu::get().features;
        match probe {
            Probe::VectorAdd { width } => HostCpu::get().supports_vector_width(width),
            Probe::VectorMemops | Probe::FootprintSweep | Probe::WideCopy => features.avx,
            Probe::RepMovs => true,
        }
    }

    fn dependent_adds(loops: u64) -> Region {
        Ok(alu::dependent_adds(loops))
    }

    fn shift_immediate(loops: u64, by_one: bool) -> Region {
        Ok(alu::shift_immediate(loops, by_one))
    }

    fn shift_register(loops: u64, count: u8) -> Region {
        Ok(alu::shift_register(loops, count))
    }

    fn conditional_moves(loops: u64) -> Region {
        Ok(alu::conditional_moves(loops))
    }

    fn move_elimination(count: u64, unrolled: bool) -> Region {
        Ok(alu::move_elimination(count, unrolled))
    }

    fn independent_adds(loops: u64) -> Region {
        Ok(alu::independent_adds(loops))
    }

    fn vector_add_latency(width: u32, loops: u64) -> Region {
        Self::require(Probe::VectorAdd { width }, "vector_add_latency")?;
        // SAFETY: require 已确认对应扩展可用
        let measurement = match width {
            128 => vector::latency_128(loops),
            256 => unsafe { vector::latency_256(loops) },
            _ => unsafe { vector::latency_512(loops) },
        };
        Ok(measurement)
    }

    fn vector_add_throughput(width: u32, loops: u64) -> Region {
        Self::require(Probe::VectorAdd { width }, "vector_add_throughput")?;
        // SAFETY: require 已确认对应扩展可用
        let measurement = match width {
            128 => vector::throughput_128(loops),
            256 => unsafe { vector::throughput_256(loops) },
            _ => unsafe { vector::throughput_512(loops) },
        };
        Ok(measurement)
    }

    fn scalar_memops(op: MemOp, cell: &mut u64, loops: u64) -> Region {
        Ok(memory::scalar_memops(op, cell, loops))
    }

    fn vector_memops(op: MemOp, block: &mut AlignedBuffer, loops: u64) -> Region {
        Self::require(Probe::VectorMemops, "vector_memops")?;
        if block.len() < Self::VECTOR_BYTES as usize || block.align() < Self::VECTOR_BYTES as usize {
            return Err(BenchError::invalid(
                "vector_memops",
                format!("block of {} bytes aligned to {}", block.len(), block.align()),
            ));
        }
        // SAFETY: 已确认 AVX 可用，块大小与对齐满足 32 字节访存
        Ok(unsafe { memory::vector_memops(op, block, loops) })
    }

    fn footprint_sweep(op: MemOp, buffer: &mut AlignedBuffer, outer: u64) -> Region {
        Self::require(Probe::FootprintSweep, "footprint_sweep")?;
        if buffer.is_empty() || buffer.len() % memory::SWEEP_CHUNK != 0 || buffer.align() < 32 {
            return Err(BenchError::invalid(
                "footprint_sweep",
                format!("footprint of {} bytes is not a multiple of {}", buffer.len(), memory::SWEEP_CHUNK),
            ));
        }
        // SAFETY: 已确认 AVX 可用，缓冲区长度与对齐满足扫描要求
        Ok(unsafe { memory::footprint_sweep(op, buffer, outer) })
    }

    fn taken_branches(loops: u64) -> Region {
        Ok(branch::taken_branches(loops))
    }

    fn indirect_branches(loops: u64) -> Region {
        Ok(branch::indirect_branches(loops))
    }

    fn branch_history(pattern: &[u64], loops: u64) -> Region {
        if !pattern.len().is_power_of_two() {
            return Err(BenchError::invalid(
                "branch_history",
                format!("pattern length {} is not a power of two", pattern.len()),
            ));
        }
        Ok(branch::branch_history(pattern, loops))
    }

    fn unconditional_branches(logsize: u32, loops: u64) -> Region {
        branch::unconditional_branches(logsize, loops)
    }

    fn conditional_branches(logsize: u32, mask: u64, loops: u64) -> Region {
        branch::conditional_branches(logsize, mask, loops)
    }

    fn store_forwarding(
        chain: &mut [u64; CHAIN_SLOTS],
        depth: u32,
        dependent: bool,
        loops: u64,
    ) -> Region {
        stlf::store_forwarding(chain, depth, dependent, loops)
    }

    fn timestamp_reads(serializing: bool, loops: u64) -> Region {
        Ok(serializing::timestamp_reads(serializing, loops))
    }

    fn rep_movs(plan: &mut WorkloadPlan, width: MoveWidth, backwards: bool) -> Region {
        if plan.copy_bytes() % width.bytes() != 0 {
            return Err(BenchError::invalid(
                "rep_movs",
                format!("copy size {} is not a multiple of {}", plan.copy_bytes(), width.bytes()),
            ));
        }
        Ok(copy::rep_movs(plan, width, backwards))
    }

    fn wide_copy(
        plan: &mut WorkloadPlan,
        log_size: u32,
        aligned_src: bool,
        aligned_dst: bool,
    ) -> Region {
        Self::require(Probe::WideCopy, "wide_copy")?;
        if !(5..=ubench_core::config::MAX_LOG_COPY_SIZE).contains(&log_size)
            || plan.copy_bytes() != 1u64 << log_size
        {
            return Err(BenchError::invalid(
                "wide_copy",
                format!("log copy size {log_size} does not match the plan"),
            ));
        }
        if (aligned_src && plan.src_ptr() as usize % 32 != 0)
            || (aligned_dst && plan.dst_ptr() as usize % 32 != 0)
        {
            return Err(BenchError::invalid("wide_copy", "aligned access on unaligned address"));
        }
        // SAFETY: 已确认 AVX 可用，大小与对齐均已检查
        Ok(unsafe { copy::wide_copy(plan, log_size, aligned_src, aligned_dst) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rep_movs_is_always_supported() {
        assert!(X86_64Regions::supports(Probe::RepMovs));
        assert!(X86_64Regions::supports(Probe::VectorAdd { width: 128 }));
        assert!(!X86_64Regions::supports(Probe::VectorAdd { width: 64 }));
    }

    #[test]
    fn unsupported_width_is_reported() {
        assert!(matches!(
            X86_64Regions::vector_add_latency(100, 1),
            Err(BenchError::Unsupported { .. })
        ));
    }

    #[test]
    fn rep_movs_rejects_ragged_copy() {
        let mut plan = WorkloadPlan::allocate("test", 12, 64, 0, 0).unwrap();
        assert!(X86_64Regions::rep_movs(&mut plan, MoveWidth::Qword, false).is_err());
    }

    #[test]
    fn store_forwarding_runs() {
        let mut chain = [0u64; CHAIN_SLOTS];
        let m = X86_64Regions::store_forwarding(&mut chain, 2, true, 4).unwrap();
        assert_eq!(m.hash, 10);
    }
}
