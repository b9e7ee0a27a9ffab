//! 时间戳计数器读取

use std::arch::asm;

use ubench_core::Measurement;
use ubench_core::timer::timed;

pub(super) fn timestamp_reads(serializing: bool, loops: u64) -> Measurement {
    let mut lo: u32 = 0;
    let mut hi: u32 = 0;
    timed(|| {
        if serializing {
            for _ in 0..loops {
                // SAFETY: rdtscp 只写 eax/edx/ecx
                unsafe {
                    asm!(
                        ".rept 1024",
                        "rdtscp",
                        ".endr",
                        out("eax") lo,
                        out("edx") hi,
                        out("ecx") _,
                        options(nomem, nostack),
                    );
                }
            }
        } else {
            for _ in 0..loops {
                // SAFETY: rdtsc 只写 eax/edx
                unsafe {
                    asm!(
                        ".rept 1024",
                        "rdtsc",
                        ".endr",
                        out("eax") lo,
                        out("edx") hi,
                        options(nomem, nostack),
                    );
                }
            }
        }
        (u64::from(hi) << 32) | u64::from(lo)
    })
}
