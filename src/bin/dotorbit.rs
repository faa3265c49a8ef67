use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use dotorbit::{
    CpuStage, EffectConfig, Layout, LogoEffect, RecordingStage, Rect, Rgba8, Size, Stage,
};

#[derive(Parser, Debug)]
#[command(name = "dotorbit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the effect at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Render a range of scroll offsets as numbered PNGs.
    Sweep(SweepArgs),
    /// Print the composed frame at one scroll offset as JSON.
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct StageArgs {
    /// Effect configuration JSON; defaults to the built-in two-dot logo.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Logo reference rectangle as `x,y,w,h`; defaults to a centered 400x100 box.
    #[arg(long, value_parser = parse_logo)]
    logo: Option<Rect>,

    /// Background color as hex; transparent when omitted.
    #[arg(long, value_parser = parse_color)]
    background: Option<Rgba8>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    stage: StageArgs,

    /// Scroll offset in pixels.
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[command(flatten)]
    stage: StageArgs,

    /// First scroll offset.
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Last scroll offset (inclusive).
    #[arg(long)]
    to: f64,

    /// Scroll increment between frames.
    #[arg(long, default_value_t = 100.0)]
    step: f64,

    /// Directory receiving `frame_0000.png`, `frame_0001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[command(flatten)]
    stage: StageArgs,

    /// Scroll offset in pixels.
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn parse_logo(s: &str) -> Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid logo rectangle '{s}': {e}"))?;
    let &[x, y, w, h] = parts.as_slice() else {
        return Err(format!("logo rectangle must be x,y,w,h, got '{s}'"));
    };
    if w < 0.0 || h < 0.0 {
        return Err(format!("logo rectangle size must be >= 0, got '{s}'"));
    }
    Ok(Rect::new(x, y, x + w, y + h))
}

fn parse_color(s: &str) -> Result<Rgba8, String> {
    Rgba8::from_hex(s)
}

fn load_config(args: &StageArgs) -> anyhow::Result<EffectConfig> {
    match &args.config {
        Some(path) => EffectConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(EffectConfig::default()),
    }
}

fn layout_for(args: &StageArgs) -> Layout {
    let layout = Layout::new(Size::new(f64::from(args.width), f64::from(args.height)));
    match args.logo {
        Some(logo) => layout.with_logo(logo),
        None => layout,
    }
}

fn cpu_stage(args: &StageArgs, config: &EffectConfig) -> CpuStage {
    let stage = CpuStage::with_anchors(args.width, args.height, config.anchor_names());
    match args.background {
        Some(bg) => stage.with_background(bg),
        None => stage,
    }
}

fn start(
    config: &EffectConfig,
    stage: &mut dyn Stage,
    layout: Layout,
) -> anyhow::Result<LogoEffect> {
    LogoEffect::init(config, stage, layout)?
        .context("effect disabled: anchor elements missing from the stage")
}

fn save_png(stage: &CpuStage, out: &Path) -> anyhow::Result<()> {
    let frame = stage.finish()?;
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_config(&args.stage)?;
    let mut stage = cpu_stage(&args.stage, &config);
    let mut effect = start(&config, &mut stage, layout_for(&args.stage))?;
    effect.on_scroll(args.scroll, &mut stage)?;
    save_png(&stage, &args.out)?;
    effect.cleanup(&mut stage);

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    if !(args.step.is_finite() && args.step > 0.0) {
        anyhow::bail!("--step must be > 0");
    }
    if !(args.from.is_finite() && args.to.is_finite()) || args.to < args.from {
        anyhow::bail!("--to must be >= --from");
    }
    let config = load_config(&args.stage)?;
    let mut stage = cpu_stage(&args.stage, &config);
    let mut effect = start(&config, &mut stage, layout_for(&args.stage))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let count = ((args.to - args.from) / args.step).floor() as u64 + 1;
    for i in 0..count {
        let scroll = args.from + args.step * i as f64;
        effect.on_scroll(scroll, &mut stage)?;
        let out = args.out_dir.join(format!("frame_{i:04}.png"));
        save_png(&stage, &out)?;
    }
    effect.cleanup(&mut stage);

    eprintln!("wrote {count} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let config = load_config(&args.stage)?;
    let mut stage = RecordingStage::with_anchors(config.anchor_names());
    let mut effect = start(&config, &mut stage, layout_for(&args.stage))?;
    let frame = effect.on_scroll(args.scroll, &mut stage)?;
    let json = serde_json::to_string_pretty(frame).context("serialize frame")?;
    println!("{json}");
    Ok(())
}
