//! cputest
//!
//! 用法：`cputest --benchmark [args...] [--benchmark [args...]]...`
//! 每个执行的基准向标准输出写一行结果；`--help` 打印基准目录。

use std::io;

use anyhow::Context;
use log::{debug, info};
use ubench_core::{Dispatcher, RunOutcome};
use ubench_kernels::{BENCHMARKS, HostCpu};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();
    info!("{}", HostCpu::get());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut out = io::stdout().lock();
    let outcome = Dispatcher::new(BENCHMARKS)
        .run(&args, &mut out)
        .context("benchmark invocation failed")?;

    match outcome {
        RunOutcome::HelpPrinted => debug!("printed {} descriptors", BENCHMARKS.len()),
        RunOutcome::Completed(count) => debug!("{count} benchmark(s) completed"),
    }
    Ok(())
}
