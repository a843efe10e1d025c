//! Preset inspection command.

use crate::commands::common::{load_preset, preset_label};
use clap::Args;
use osc3x_config::{
    PresetFile, factory_presets, list_presets_in_dir, preset_name_from_path, user_presets_dir,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetArgs {
    /// Preset name or path to a preset file
    #[arg(required_unless_present = "list")]
    name: Option<String>,

    /// List factory and user presets
    #[arg(long, conflicts_with = "name")]
    list: bool,

    /// Write the resolved preset to this file
    #[arg(long, requires = "name")]
    save: Option<PathBuf>,
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    if args.list {
        return list_presets();
    }
    let Some(name) = args.name else {
        anyhow::bail!("no preset given");
    };

    let preset = load_preset(&name)?;
    println!("Preset: {}", preset_label(&preset, &name));
    if let Some(desc) = &preset.description {
        println!("  {desc}");
    }
    println!();
    for (i, osc) in preset.oscillators.iter().enumerate() {
        let detune = match i {
            1 => format!("  detune {:+.2} st", preset.detune2),
            2 => format!("  detune {:+.2} st", preset.detune3),
            _ => String::new(),
        };
        println!(
            "  osc{}  {:8} level {:.2}  pan {:+.2}{}",
            i + 1,
            osc.kind.name(),
            osc.level,
            osc.pan,
            detune
        );
    }
    println!(
        "  filter {} at {} Hz, Q {:.2}",
        preset.filter.kind.name(),
        preset.filter.frequency,
        preset.filter.q
    );

    if let Some(path) = args.save {
        preset.save(&path)?;
        println!("\nSaved to {}", path.display());
    }
    Ok(())
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for preset in factory_presets() {
        let name = preset.name.as_deref().unwrap_or("");
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", name, desc);
    }
    println!();

    let dir = user_presets_dir();
    println!("User Presets ({}):", dir.display());
    println!("=============");
    let user_presets = if dir.is_dir() {
        list_presets_in_dir(&dir)?
    } else {
        Vec::new()
    };
    if user_presets.is_empty() {
        println!("  (none)");
    }
    for path in user_presets {
        let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
        println!("  {name}");
    }
    Ok(())
}
