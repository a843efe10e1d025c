//! Audio device listing command.

use clap::Args;
use osc3x_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// Only show the default output device
    #[arg(long)]
    default: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let default_name = default_output_device().map(|d| d.name);

    if args.default {
        match default_name {
            Some(name) => println!("Default output: {name}"),
            None => println!("No default output device."),
        }
        return Ok(());
    }

    let devices = list_output_devices()?;
    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices");
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if default_name.as_deref() == Some(device.name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, marker
        );
    }
    println!();
    println!("Tip: Use device index or partial name with --device:");
    println!("  osc3x render song.mid --play --device 0");

    Ok(())
}
