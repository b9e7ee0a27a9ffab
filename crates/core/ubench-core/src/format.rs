//! 字节数格式化

/// 将 `1 << log_bytes` 渲染为 "N bytes|KB|MB|GB"
pub fn byte_string(log_bytes: u32) -> String {
    let (value, unit) = match log_bytes {
        0..=9 => (1u64 << log_bytes, "bytes"),
        10..=19 => (1u64 << (log_bytes - 10), "KB"),
        20..=29 => (1u64 << (log_bytes - 20), "MB"),
        _ => (1u64 << (log_bytes.min(63) - 30), "GB"),
    };
    format!("{value} {unit}")
}
