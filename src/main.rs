// src/main.rs

//! Thin command-line consumer of the display topology manager, standing in
//! for the remote command dispatcher: one subcommand per exposed operation.

use anyhow::{bail, Result};
use log::info;

const USAGE: &str = "\
Usage:
  displayctl query
  displayctl set-primary <device>
  displayctl rotate <device> <angle> <width> <height>
  displayctl resolution <device> <width> <height> <bpp> <frequency>";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    run(&args)
}

#[cfg(windows)]
fn run(args: &[String]) -> Result<()> {
    use anyhow::Context;
    use displayctl::DisplayManager;

    let mut manager = DisplayManager::system();
    match args[0].as_str() {
        "query" => {
            let topology = manager.query_topology()?;
            info!("{} display(s) attached", topology.len());
            println!("{}", serde_json::to_string_pretty(&topology)?);
        }
        "set-primary" => {
            let [device] = parse_args::<1>(args)?;
            println!("{}", manager.set_primary(&device)?);
        }
        "rotate" => {
            let [device, angle, width, height] = parse_args::<4>(args)?;
            let angle: i32 = angle.parse().context("angle must be an integer")?;
            let width: u32 = width.parse().context("width must be an integer")?;
            let height: u32 = height.parse().context("height must be an integer")?;
            println!("{}", manager.rotate(angle, width, height, &device)?);
        }
        "resolution" => {
            let [device, width, height, bpp, frequency] = parse_args::<5>(args)?;
            let width: u32 = width.parse().context("width must be an integer")?;
            let height: u32 = height.parse().context("height must be an integer")?;
            let bpp: u32 = bpp.parse().context("bpp must be an integer")?;
            let frequency: u32 = frequency.parse().context("frequency must be an integer")?;
            println!(
                "{}",
                manager.change_resolution(&device, width, height, bpp, frequency)?
            );
        }
        other => bail!("unknown subcommand {other:?}\n{USAGE}"),
    }
    Ok(())
}

#[cfg(windows)]
fn parse_args<const N: usize>(args: &[String]) -> Result<[String; N]> {
    let rest = &args[1..];
    if rest.len() != N {
        bail!("expected {N} argument(s) after {:?}\n{USAGE}", args[0]);
    }
    Ok(std::array::from_fn(|i| rest[i].clone()))
}

#[cfg(not(windows))]
fn run(_args: &[String]) -> Result<()> {
    info!("displayctl invoked on a non-Windows host");
    bail!("the Win32 display subsystem is only available on Windows");
}
