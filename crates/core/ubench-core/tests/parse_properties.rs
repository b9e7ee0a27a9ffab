//! 参数解析属性测试
//!
//! 使用 proptest 验证 C 风格整数解析与标准库按进制解析一致。

use proptest::prelude::*;
use ubench_core::parse::parse_argument;
use ubench_core::{BenchError, parse_c_integer};

// ============================================================================
// 合法输入
// ============================================================================

proptest! {
    /// 属性测试: 十进制与标准库解析一致
    #[test]
    fn prop_decimal_matches_std(value in 1u64..u64::MAX) {
        let token = value.to_string();
        prop_assert_eq!(parse_c_integer(&token).unwrap(), value);
    }

    /// 属性测试: 0x 前缀十六进制与 from_str_radix 一致
    #[test]
    fn prop_hex_matches_radix_parse(value in any::<u64>(), upper in any::<bool>()) {
        let token = if upper { format!("0X{value:X}") } else { format!("0x{value:x}") };
        prop_assert_eq!(parse_c_integer(&token).unwrap(), value);
    }

    /// 属性测试: 前导 0 的八进制
    #[test]
    fn prop_octal_matches_radix_parse(value in 1u64..(1u64 << 60)) {
        let token = format!("0{value:o}");
        prop_assert_eq!(parse_c_integer(&token).unwrap(), value);
    }

    /// 属性测试: 参数必须落在 u32 范围内
    #[test]
    fn prop_argument_range(value in any::<u64>()) {
        let parsed = parse_argument(&value.to_string());
        if value <= u64::from(u32::MAX) {
            prop_assert_eq!(u64::from(parsed.unwrap()), value);
        } else {
            prop_assert!(matches!(parsed, Err(BenchError::OutOfRange(_))), "expected out of range");
        }
    }
}

// ============================================================================
// 非法输入
// ============================================================================

proptest! {
    /// 属性测试: 数字后跟任意非数字字符都被拒绝
    #[test]
    fn prop_trailing_garbage_rejected(value in any::<u32>(), suffix in "[g-zG-Z.,_ -]{1,4}") {
        let token = format!("{value}{suffix}");
        prop_assert!(
            matches!(parse_c_integer(&token), Err(BenchError::NotANumber(_))),
            "{:?} accepted", token
        );
    }

    /// 属性测试: 解析错误信息包含原始记号
    #[test]
    fn prop_error_names_token(token in "[a-z]{1,8}") {
        let err = parse_c_integer(&token).unwrap_err();
        prop_assert_eq!(err.to_string(), format!("{token} is not a number"));
    }
}
