//! 计时原语
//!
//! 测量区域只依赖单调时钟：Unix 上直接读 `CLOCK_MONOTONIC`，
//! 其余平台以进程内第一次读数为零点的 [`Instant`] 代替。

use std::sync::OnceLock;
use std::time::Instant;

use crate::result::Measurement;

fn since_first_read() -> u64 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = ORIGIN.get_or_init(Instant::now);
    u64::try_from(origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(unix)]
fn monotonic_clock() -> Option<u64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts 是有效的可写 timespec，CLOCK_MONOTONIC 在所有 Unix 上可用
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    if rc != 0 {
        return None;
    }
    let secs = u64::try_from(ts.tv_sec).ok()?;
    let nanos = u64::try_from(ts.tv_nsec).ok()?;
    Some(secs * 1_000_000_000 + nanos)
}

#[cfg(not(unix))]
fn monotonic_clock() -> Option<u64> {
    None
}

/// 单调时间戳（纳秒），只用于求差
pub fn timestamp_ns() -> u64 {
    monotonic_clock().unwrap_or_else(since_first_read)
}

/// 测量代码执行时间（纳秒）
pub fn measure<F, R>(f: F) -> (R, u64)
where
    F: FnOnce() -> R,
{
    let start = timestamp_ns();
    let result = f();
    (result, elapsed_since(start))
}

/// 自 `start` 以来经过的纳秒数
pub fn elapsed_since(start: u64) -> u64 {
    timestamp_ns().saturating_sub(start)
}

/// 计时一个测量区域，闭包返回结果哈希
///
/// 闭包内只能包含被测循环本身，缓冲区准备必须在调用之前完成。
pub fn timed<F>(region: F) -> Measurement
where
    F: FnOnce() -> u64,
{
    let (hash, elapsed_ns) = measure(region);
    Measurement::new(elapsed_ns, hash)
}
