//! 基准参数解析
//!
//! 与 C 的 `strtoul(s, &end, 0)` 相同的进制规则：`0x`/`0X` 前缀为十六进制，
//! 以 `0` 开头为八进制，其余为十进制。数字之后不允许有任何字符。

use crate::error::BenchError;

/// 解析一个 C 风格的无符号整数
pub fn parse_c_integer(token: &str) -> Result<u64, BenchError> {
    let trimmed = token.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (digits, radix) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (&unsigned[1..], 8)
    } else {
        (unsigned, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(BenchError::NotANumber(token.to_string()));
    }

    u64::from_str_radix(digits, radix).map_err(|_| BenchError::OutOfRange(token.to_string()))
}

/// 解析一个基准参数（无符号 32 位）
pub fn parse_argument(token: &str) -> Result<u32, BenchError> {
    let value = parse_c_integer(token)?;
    u32::try_from(value).map_err(|_| BenchError::OutOfRange(token.to_string()))
}
