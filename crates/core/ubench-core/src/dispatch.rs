//! 命令行调度器
//!
//! 参数序列由若干 `--name [args...]` 组组成，自左向右处理。
//! 先完整解析出执行计划再依次运行：未知基准、参数缺失和格式错误
//! 在第一个基准运行前暴露，不产生任何输出。参数的取值范围由各基准
//! 自己校验，因此越界参数只在轮到该基准时终止运行，之前的结果行保留。

use std::io::Write;

use log::info;

use crate::error::BenchError;
use crate::parse::parse_argument;
use crate::registry::BenchmarkDescriptor;

/// 一次解析完成的基准调用
#[derive(Debug)]
pub struct Invocation<'r> {
    pub descriptor: &'r BenchmarkDescriptor,
    pub args: Vec<u32>,
}

/// 执行计划
#[derive(Debug)]
pub enum Plan<'r> {
    /// 打印帮助，不运行任何基准
    Help,
    /// 按顺序运行的基准
    Run(Vec<Invocation<'r>>),
}

/// 一次运行的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    HelpPrinted,
    /// 输出的结果行数
    Completed(usize),
}

/// 基于静态注册表的调度器
pub struct Dispatcher<'r> {
    registry: &'r [BenchmarkDescriptor],
}

fn is_help(token: &str) -> bool {
    matches!(token, "--help" | "-h")
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r [BenchmarkDescriptor]) -> Self {
        Self { registry }
    }

    /// 查找第一个匹配记号的描述符
    pub fn lookup(&self, token: &str) -> Option<&'r BenchmarkDescriptor> {
        self.registry.iter().find(|d| d.matches(token))
    }

    /// 将参数序列解析为执行计划
    pub fn plan<S: AsRef<str>>(&self, args: &[S]) -> Result<Plan<'r>, BenchError> {
        if args.is_empty() {
            return Ok(Plan::Help);
        }

        let mut invocations = Vec::new();
        let mut cursor = 0;
        while cursor < args.len() {
            let token = args[cursor].as_ref();
            if is_help(token) {
                return Ok(Plan::Help);
            }

            let descriptor = self
                .lookup(token)
                .ok_or_else(|| BenchError::UnknownBenchmark(token.to_string()))?;
            let arity = descriptor.arity();
            let rest = &args[cursor + 1..];
            if rest.len() < arity {
                return Err(BenchError::MissingArgument {
                    benchmark: token.to_string(),
                    expected: arity,
                    found: rest.len(),
                });
            }

            let parsed = rest[..arity]
                .iter()
                .map(|arg| parse_argument(arg.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            invocations.push(Invocation {
                descriptor,
                args: parsed,
            });
            cursor += 1 + arity;
        }

        Ok(Plan::Run(invocations))
    }

    /// 打印描述符表：名称右对齐到 40 列，制表符，帮助文本
    pub fn write_help<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for descriptor in self.registry {
            writeln!(out, "{:>40}\t{}", descriptor.name, descriptor.help)?;
        }
        out.flush()
    }

    /// 依次运行计划中的调用，每个结果输出一行
    pub fn execute<W: Write>(
        &self,
        invocations: &[Invocation<'r>],
        out: &mut W,
    ) -> Result<usize, BenchError> {
        for invocation in invocations {
            info!(
                "running {} {:?}",
                invocation.descriptor.selector(),
                invocation.args
            );
            let result = invocation.descriptor.invoke(&invocation.args)?;
            writeln!(out, "{result}")?;
            out.flush()?;
        }
        Ok(invocations.len())
    }

    /// 解析并运行整个参数序列
    pub fn run<S, W>(&self, args: &[S], out: &mut W) -> Result<RunOutcome, BenchError>
    where
        S: AsRef<str>,
        W: Write,
    {
        match self.plan(args)? {
            Plan::Help => {
                self.write_help(out)?;
                Ok(RunOutcome::HelpPrinted)
            }
            Plan::Run(invocations) => Ok(RunOutcome::Completed(self.execute(&invocations, out)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Outcome;
    use crate::registry::BenchFn;
    use crate::result::{BenchResult, Measurement};

    fn fixed() -> Outcome {
        Ok(BenchResult::measured(
            "fixed",
            Measurement::new(1_000, 0x2a),
            2_000.0,
            "GOPS",
        ))
    }

    fn echo(logsize: u32) -> Outcome {
        Ok(BenchResult::measured(
            format!("echo(logsize={logsize})"),
            Measurement::new(1, u64::from(logsize)),
            1.0,
            "Billion_Branches_per_sec",
        ))
    }

    fn pair(a: u32, b: u32) -> Outcome {
        Ok(BenchResult::measured(
            format!("pair({a},{b})"),
            Measurement::new(1, 0),
            0.0,
            "GOPS",
        ))
    }

    fn bounded(limit: u32) -> Outcome {
        if limit > 16 {
            return Err(BenchError::invalid("bounded", "limit must not exceed 16"));
        }
        Ok(BenchResult::not_applicable("bounded", "GOPS"))
    }

    const REGISTRY: &[BenchmarkDescriptor] = &[
        BenchmarkDescriptor::new("--fixed", "no arguments", BenchFn::Nullary(fixed)),
        BenchmarkDescriptor::new("--echo logsize", "one argument", BenchFn::Unary(echo)),
        BenchmarkDescriptor::new("--pair a b", "two arguments", BenchFn::Binary(pair)),
        BenchmarkDescriptor::new("--bounded n", "validates", BenchFn::Unary(bounded)),
    ];

    fn run(args: &[&str]) -> (Result<RunOutcome, BenchError>, String) {
        let mut out = Vec::new();
        let outcome = Dispatcher::new(REGISTRY).run(args, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn help_prints_table_only() {
        let (outcome, out) = run(&["--help"]);
        assert_eq!(outcome.unwrap(), RunOutcome::HelpPrinted);
        assert_eq!(out.lines().count(), REGISTRY.len());
        assert!(out.lines().all(|line| !line.contains("resulthash")));
        assert_eq!(
            out.lines().next().unwrap(),
            format!("{:>40}\tno arguments", "--fixed")
        );
    }

    #[test]
    fn help_short_circuits_later_benchmarks() {
        let (outcome, out) = run(&["--fixed", "-h", "--fixed"]);
        assert_eq!(outcome.unwrap(), RunOutcome::HelpPrinted);
        assert!(!out.contains("resulthash"));
    }

    #[test]
    fn empty_arguments_print_help() {
        let (outcome, _) = run(&[]);
        assert_eq!(outcome.unwrap(), RunOutcome::HelpPrinted);
    }

    #[test]
    fn prefix_match_consumes_one_argument() {
        let (outcome, out) = run(&["--echo", "4"]);
        assert_eq!(outcome.unwrap(), RunOutcome::Completed(1));
        assert_eq!(
            out,
            "echo(logsize=4)\tresulthash=4\tBillion_Branches_per_sec=4.000000\n"
        );
    }

    #[test]
    fn hex_and_octal_arguments() {
        let (_, out) = run(&["--pair", "0x10", "010"]);
        assert!(out.starts_with("pair(16,8)"));
    }

    #[test]
    fn chained_benchmarks_run_in_order() {
        let (outcome, out) = run(&["--echo", "3", "--fixed"]);
        assert_eq!(outcome.unwrap(), RunOutcome::Completed(2));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("echo(logsize=3)"));
        assert!(lines[1].starts_with("fixed\tresulthash=2a\tGOPS=2.000000"));
    }

    #[test]
    fn unknown_token_fails_before_running() {
        let (outcome, out) = run(&["--fixed", "--nonexistent_test"]);
        let err = outcome.unwrap_err();
        assert_eq!(err.to_string(), "--nonexistent_test test not found");
        assert!(out.is_empty());
    }

    #[test]
    fn full_descriptor_name_is_not_a_selector() {
        let (outcome, _) = run(&["--echo logsize", "4"]);
        assert!(matches!(outcome, Err(BenchError::UnknownBenchmark(_))));
    }

    #[test]
    fn missing_arguments_are_errors() {
        let (outcome, out) = run(&["--pair", "1"]);
        assert!(matches!(
            outcome,
            Err(BenchError::MissingArgument { expected: 2, found: 1, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_argument_is_fatal() {
        let (outcome, _) = run(&["--echo", "4x"]);
        assert_eq!(outcome.unwrap_err().to_string(), "4x is not a number");
    }

    #[test]
    fn benchmark_parameter_errors_propagate() {
        let (outcome, out) = run(&["--fixed", "--bounded", "17"]);
        assert!(matches!(outcome, Err(BenchError::InvalidParameter { .. })));
        assert!(out.starts_with("fixed"));
    }

    #[test]
    fn unsupported_results_still_print() {
        let (outcome, out) = run(&["--bounded", "1"]);
        assert_eq!(outcome.unwrap(), RunOutcome::Completed(1));
        assert!(out.contains("NOT APPLICABLE on Current Platform"));
    }
}
