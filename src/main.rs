//! FX Motion headless driver
//!
//! Runs a scene for a number of host frames through the fixed-step driver
//! and prints the final frame as JSON.
//!
//! Usage: `fx-motion [settings.json] [--frames N] [--fps HZ] [--quality low|medium|high]`

use std::path::PathBuf;

use clap::Parser;
use glam::{Mat4, Vec3};
use serde::Serialize;

use fx_motion::effects::{EffectEvaluator, EffectInputs, ShaderParams};
use fx_motion::fields::{GridLight, LightBar, LightBars, LightGrid, Sticker, Stickers};
use fx_motion::motion::{CordSegment, LightCord};
use fx_motion::vertex::InstanceRaw;
use fx_motion::{QualityPreset, Settings};

#[derive(Debug, Parser)]
#[command(name = "fx-motion")]
#[command(about = "Run an FX Motion scene headless and print the final frame")]
struct Args {
    /// Settings document (JSON); defaults are used when omitted
    settings: Option<PathBuf>,
    /// Host frames to run
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Host frame rate
    #[arg(long, default_value_t = 60.0, value_parser = parse_fps)]
    fps: f32,
    /// Quality preset applied over the settings (low, medium or high)
    #[arg(long, value_parser = parse_quality)]
    quality: Option<QualityPreset>,
}

fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value.parse().map_err(|_| format!("bad fps: {value}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("fps must be > 0: {value}"))
    }
}

fn parse_quality(value: &str) -> Result<QualityPreset, String> {
    QualityPreset::parse(value).ok_or_else(|| format!("unknown quality: {value}"))
}

/// Everything a host would upload for one frame
#[derive(Serialize)]
struct FrameSummary<'a> {
    frames: u32,
    time: f32,
    sim_time: f32,
    cord_ticks: u64,
    cord_head: Vec3,
    cord_segments: &'a [CordSegment],
    grid: &'a [GridLight],
    bars: &'a [LightBar],
    stickers: &'a [Sticker],
    effects: Vec<(&'static str, &'a ShaderParams)>,
    instance_bytes: usize,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => {
            log::info!("Using default settings");
            Settings::default()
        }
    };
    if let Some(quality) = args.quality {
        settings.apply_preset(quality);
        settings.validate()?;
    }

    let mut stepper = settings.stepper()?;
    let mut cord = LightCord::new(settings.cord.clone(), settings.noise_seed)?;
    let mut grid = LightGrid::new(settings.grid)?;
    let mut bars = LightBars::new(settings.bars)?;
    let mut stickers = Stickers::new(settings.stickers)?;
    let mut effects: Vec<EffectEvaluator> =
        settings.effects.iter().copied().map(EffectEvaluator::new).collect();

    let instance_count = grid.lights().len() + bars.bars().len() + stickers.stickers().len();
    let mut instances = vec![InstanceRaw::default(); instance_count];

    log::info!(
        "Running {} frames at {} fps ({} Hz simulation)",
        args.frames,
        args.fps,
        settings.quality.sim_rate()
    );

    let frame_dt = 1.0 / args.fps;
    let mut time = 0.0f32;
    for _ in 0..args.frames {
        time += frame_dt;

        for step in stepper.advance(frame_dt) {
            cord.tick(step);
        }

        grid.update(cord.noise(), time);
        bars.update(time);
        stickers.update(time);

        // Sweep the effector back and forth along z
        let effector = Mat4::from_translation(Vec3::new(0.0, 0.0, (time * 0.5).sin() * 2.0));
        let inputs = EffectInputs::new(effector);
        for effect in &mut effects {
            effect.evaluate(&inputs, time);
        }

        let (grid_out, rest) = instances.split_at_mut(grid.lights().len());
        let (bar_out, sticker_out) = rest.split_at_mut(bars.bars().len());
        grid.write_instances(grid_out);
        bars.write_instances(bar_out);
        stickers.write_instances(sticker_out);
    }

    if !cord.state().is_finite() {
        log::warn!("Cord state is not finite after {} ticks", cord.state().ticks);
    }

    let summary = FrameSummary {
        frames: args.frames,
        time,
        sim_time: stepper.sim_time(),
        cord_ticks: cord.state().ticks,
        cord_head: cord.state().head(),
        cord_segments: cord.segments(),
        grid: grid.lights(),
        bars: bars.bars(),
        stickers: stickers.stickers(),
        effects: effects
            .iter()
            .map(|e| (e.kind().name(), e.params()))
            .collect(),
        instance_bytes: bytemuck::cast_slice::<InstanceRaw, u8>(&instances).len(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("FX Motion (native) starting...");

    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
