// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use sea_core::init_tracing;
use sea_render_vk::{AshDriver, BootstrapError, DeviceContext, ResourceError};
use tracing::{error, info};

use crate::config::load_cfg;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Offscreen target width in pixels (overrides the config file)
    #[arg(long)]
    width: Option<u32>,
    /// Offscreen target height in pixels (overrides the config file)
    #[arg(long)]
    height: Option<u32>,
    /// Optional TOML config; a missing file means defaults
    #[arg(long, default_value = "sea.toml")]
    config: PathBuf,
}

/// One-line stderr diagnostic naming the stage that failed.
fn diagnostic(e: &anyhow::Error) -> String {
    if let Some(b) = e.downcast_ref::<BootstrapError>() {
        format!("failed to init {}", b.stage())
    } else if let Some(r) = e.downcast_ref::<ResourceError>() {
        format!("failed to init {}", r.stage())
    } else {
        format!("failed to load config: {e:#}")
    }
}

fn run(args: &Args) -> Result<()> {
    let cfg = load_cfg(&args.config)?;
    let instance_cfg = cfg.instance.to_instance_config()?;
    let size = cfg.target.size(args.width, args.height);

    let mut ctx = DeviceContext::new(AshDriver::new());
    ctx.init(&instance_cfg)?;
    if let Some(report) = ctx.report() {
        println!("{report}");
    }
    println!("vulkan ready");

    let target = ctx.create_offscreen_target(size)?;
    println!(
        "offscreen target ready ({}x{}, {:?})",
        target.extent().width,
        target.extent().height,
        target.format()
    );

    ctx.cleanup();
    info!("teardown complete");
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{}", diagnostic(&e));
            ExitCode::FAILURE
        }
    }
}
