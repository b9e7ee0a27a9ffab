//! 存储到加载转发（STLF）指针追逐
//!
//! 每次迭代从链首追逐 `depth` 个指针，把计数写入到达的槽位，
//! 再把读取位置的值累加到哈希。读取位置为刚写入的槽位时，
//! 该读取必须从存储缓冲区转发。

use std::arch::asm;

use ubench_core::timer::timed;
use ubench_core::{BenchError, Measurement};

use crate::regions::{CHAIN_SLOTS, Region};

macro_rules! chase {
    ($depth:expr, $loops:expr, $start:expr, $read:expr, $acc:expr) => {
        // SAFETY: 链上每个槽位都指向下一个槽位，深度不超过 CHAIN_SLOTS - 1
        unsafe {
            asm!(
                "2:",
                "mov {p}, {start}",
                ".rept {depth}",
                "mov {p}, qword ptr [{p}]",
                ".endr",
                "mov qword ptr [{p}], {n}",
                "add {acc}, qword ptr [{read}]",
                "dec {n}",
                "jnz 2b",
                depth = const $depth,
                n = inout(reg) $loops => _,
                p = out(reg) _,
                acc = inout(reg) $acc,
                start = in(reg) $start,
                read = in(reg) $read,
                options(nostack),
            );
        }
    };
}

pub(super) fn store_forwarding(
    chain: &mut [u64; CHAIN_SLOTS],
    depth: u32,
    dependent: bool,
    loops: u64,
) -> Region {
    if !matches!(depth, 2 | 4 | 8 | 16 | 32) {
        return Err(BenchError::invalid(
            "store_forwarding",
            format!("chase depth {depth} is not a power of two in 2..=32"),
        ));
    }

    let base = chain.as_mut_ptr();
    for i in 0..CHAIN_SLOTS - 1 {
        // SAFETY: i + 1 < CHAIN_SLOTS
        unsafe { *base.add(i) = base.add(i + 1) as u64 };
    }
    let start = base;
    let read = if dependent {
        // SAFETY: depth < CHAIN_SLOTS
        unsafe { base.add(depth as usize) }
    } else {
        base
    };

    let mut acc: u64 = 0;
    let measurement = timed(|| {
        if loops > 0 {
            match depth {
                2 => chase!(2, loops, start, read, acc),
                4 => chase!(4, loops, start, read, acc),
                8 => chase!(8, loops, start, read, acc),
                16 => chase!(16, loops, start, read, acc),
                _ => chase!(32, loops, start, read, acc),
            }
        }
        acc
    });
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_reload_sees_the_stored_count() {
        let mut chain = [0u64; CHAIN_SLOTS];
        let m = store_forwarding(&mut chain, 4, true, 5).unwrap();
        assert_eq!(m.hash, 5 + 4 + 3 + 2 + 1);
        assert_eq!(chain[4], 1);
    }

    #[test]
    fn independent_reload_reads_the_chain_head() {
        let mut chain = [0u64; CHAIN_SLOTS];
        let m = store_forwarding(&mut chain, 32, false, 3).unwrap();
        let head = &chain[1] as *const u64 as u64;
        assert_eq!(m.hash, head.wrapping_mul(3));
    }

    #[test]
    fn odd_depths_are_rejected() {
        let mut chain = [0u64; CHAIN_SLOTS];
        assert!(store_forwarding(&mut chain, 3, true, 1).is_err());
    }
}
