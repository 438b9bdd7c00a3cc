//! Settings file management.

use anyhow::Context;
use clap::{Args, Subcommand};
use flick_config::{FileStorage, PersistedSettings, SCHEMA_VERSION, SettingsStorage};
use std::path::PathBuf;

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Write the factory defaults to a settings file
    Init {
        /// Settings file path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the contents of a settings file
    Show {
        /// Settings file path
        path: PathBuf,
    },
}

pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    match args.command {
        SettingsCommand::Init { path, force } => init(path, force),
        SettingsCommand::Show { path } => show(path),
    }
}

fn init(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    FileStorage::new(&path)
        .save(&PersistedSettings::default())
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote default settings");
    println!("Wrote factory defaults to {}", path.display());
    Ok(())
}

fn show(path: PathBuf) -> anyhow::Result<()> {
    let record = FileStorage::new(&path)
        .load()
        .with_context(|| format!("reading {}", path.display()))?
        .with_context(|| format!("{} not found", path.display()))?;

    println!("Settings: {}", path.display());
    if record.version != SCHEMA_VERSION {
        println!(
            "  version {} (expected {SCHEMA_VERSION}; the pedal would replace this with defaults)",
            record.version
        );
    } else {
        println!("  version {}", record.version);
    }

    let record = record.sanitized();
    println!("\nReverb:");
    println!("  decay          {:.3}", record.decay);
    println!("  diffusion      {:.3}", record.diffusion);
    println!("  input cutoff   {:.3}", record.input_cutoff);
    println!("  tank cutoff    {:.3}", record.tank_cutoff);
    println!("  mod speed      {:.3}", record.tank_mod_speed);
    println!("  mod depth      {:.3}", record.tank_mod_depth);
    println!("  mod shape      {:.3}", record.tank_mod_shape);
    println!("  pre-delay      {:.3}", record.pre_delay);

    println!("\nRouting:");
    println!("  mono/stereo    {:?}", record.mono_stereo());
    println!("  makeup gain    {:?}", record.makeup());

    let on_off = |bypassed: bool| if bypassed { "off" } else { "on" };
    println!("\nEffects:");
    println!("  reverb         {}", on_off(record.bypass_reverb));
    println!("  delay          {}", on_off(record.bypass_delay));
    println!("  tremolo        {}", on_off(record.bypass_tremolo));
    Ok(())
}
