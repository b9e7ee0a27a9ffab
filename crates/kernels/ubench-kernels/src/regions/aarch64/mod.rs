//! aarch64 测量区域
//!
//! 向量区域使用 NEON（128 位）。`rep movs`、AVX 拷贝与间接分支
//! 没有对应序列，保持默认的不支持实现。

mod alu;
mod branch;
mod memory;

use ubench_core::{AlignedBuffer, BenchError};

use super::{CHAIN_SLOTS, MeasuredRegions, MemOp, Probe, Region};
use crate::host::HostCpu;

/// aarch64 测量区域实现
pub struct Aarch64Regions;

impl Aarch64Regions {
    fn require(probe: Probe, operation: &'static str) -> Result<(), BenchError> {
        if Self::supports(probe) {
            Ok(())
        } else {
            Err(BenchError::unsupported(operation, Self::ARCH))
        }
    }
}

impl MeasuredRegions for Aarch64Regions {
    const ARCH: &'static str = "aarch64";
    const VECTOR_BYTES: u64 = 16;

    fn supports(probe: Probe) -> bool {
        let cpu = HostCpu::get();
        match probe {
            Probe::VectorAdd { width } => cpu.supports_vector_width(width),
            Probe::VectorMemops | Probe::FootprintSweep => cpu.features.neon,
            Probe::RepMovs | Probe::WideCopy => false,
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
        Ok(alu::vector_latency(loops))
    }

    fn vector_add_throughput(width: u32, loops: u64) -> Region {
        Self::require(Probe::VectorAdd { width }, "vector_add_throughput")?;
        Ok(alu::vector_throughput(loops))
    }

    fn scalar_memops(op: MemOp, cell: &mut u64, loops: u64) -> Region {
        Ok(memory::scalar_memops(op, cell, loops))
    }

    fn vector_memops(op: MemOp, block: &mut AlignedBuffer, loops: u64) -> Region {
        Self::require(Probe::VectorMemops, "vector_memops")?;
        if block.len() < Self::VECTOR_BYTES as usize {
            return Err(BenchError::invalid(
                "vector_memops",
                format!("block of {} bytes is smaller than a vector", block.len()),
            ));
        }
        Ok(memory::vector_memops(op, block, loops))
    }

    fn footprint_sweep(op: MemOp, buffer: &mut AlignedBuffer, outer: u64) -> Region {
        Self::require(Probe::FootprintSweep, "footprint_sweep")?;
        if buffer.is_empty() || buffer.len() % memory::SWEEP_CHUNK != 0 {
            return Err(BenchError::invalid(
                "footprint_sweep",
                format!("footprint of {} bytes is not a multiple of {}", buffer.len(), memory::SWEEP_CHUNK),
            ));
        }
        Ok(memory::footprint_sweep(op, buffer, outer))
    }

    fn taken_branches(loops: u64) -> Region {
        Ok(branch::taken_branches(loops))
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
        memory::store_forwarding(chain, depth, dependent, loops)
    }

    fn timestamp_reads(serializing: bool, loops: u64) -> Region {
        Ok(branch::timestamp_reads(serializing, loops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x86_only_probes_are_unsupported() {
        assert!(!Aarch64Regions::supports(Probe::RepMovs));
        assert!(!Aarch64Regions::supports(Probe::WideCopy));
        assert!(!Aarch64Regions::supports(Probe::VectorAdd { width: 256 }));
        assert!(Aarch64Regions::indirect_branches(1).is_err());
    }
}
