//! 基准描述符
//!
//! 注册表是一个不可变的、有序的 `&'static [BenchmarkDescriptor]`。
//! 每个描述符按参数个数携带对应签名的函数指针，参数个数由变体决定。

use crate::error::{BenchError, Outcome};

/// 按参数个数区分的基准入口
#[derive(Clone, Copy)]
pub enum BenchFn {
    Nullary(fn() -> Outcome),
    Unary(fn(u32) -> Outcome),
    Binary(fn(u32, u32) -> Outcome),
    Ternary(fn(u32, u32, u32) -> Outcome),
    Quaternary(fn(u32, u32, u32, u32) -> Outcome),
    Quinary(fn(u32, u32, u32, u32, u32) -> Outcome),
}

impl BenchFn {
    /// 参数个数（0～5）
    pub const fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
            Self::Ternary(_) => 3,
            Self::Quaternary(_) => 4,
            Self::Quinary(_) => 5,
        }
    }
}

/// 一个已注册的基准
#[derive(Clone, Copy)]
pub struct BenchmarkDescriptor {
    /// 命令行名称，空格之后为参数占位符（仅用于帮助）
    pub name: &'static str,
    /// 帮助文本
    pub help: &'static str,
    /// 入口
    pub func: BenchFn,
}

impl BenchmarkDescriptor {
    pub const fn new(name: &'static str, help: &'static str, func: BenchFn) -> Self {
        Self { name, help, func }
    }

    pub const fn arity(&self) -> usize {
        self.func.arity()
    }

    /// 名称中第一个空格之前的选择器部分
    pub fn selector(&self) -> &'static str {
        match self.name.split_once(' ') {
            Some((selector, _)) => selector,
            None => self.name,
        }
    }

    /// 命令行记号是否选中此基准
    pub fn matches(&self, token: &str) -> bool {
        self.selector() == token
    }

    /// 以恰好 `arity` 个参数调用基准
    pub fn invoke(&self, args: &[u32]) -> Outcome {
        let missing = || BenchError::MissingArgument {
            benchmark: self.selector().to_string(),
            expected: self.arity(),
            found: args.len(),
        };
        if args.len() != self.arity() {
            return Err(missing());
        }
        match (self.func, args) {
            (BenchFn::Nullary(f), []) => f(),
            (BenchFn::Unary(f), &[a]) => f(a),
            (BenchFn::Binary(f), &[a, b]) => f(a, b),
            (BenchFn::Ternary(f), &[a, b, c]) => f(a, b, c),
            (BenchFn::Quaternary(f), &[a, b, c, d]) => f(a, b, c, d),
            (BenchFn::Quinary(f), &[a, b, c, d, e]) => f(a, b, c, d, e),
            _ => Err(missing()),
        }
    }
}

impl std::fmt::Debug for BenchmarkDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkDescriptor")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish()
    }
}
