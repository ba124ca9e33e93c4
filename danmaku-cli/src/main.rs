//! Danmaku CLI Tool
//!
//! Command-line interface for inspecting danmaku comment streams and
//! replaying them headlessly against a virtual viewport.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use danmaku_core::CommentRecord;
use danmaku_engine::{CommentManager, Extents, RenderBackend};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "danmaku")]
#[command(about = "Danmaku comment overlay engine - stream inspection and headless playback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a comment stream
    Info {
        /// Input comment stream path
        input: PathBuf,
    },

    /// Replay a comment stream against a virtual viewport
    Simulate {
        /// Input comment stream path
        input: PathBuf,

        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Playback start in milliseconds
        #[arg(long, default_value = "0")]
        from: u64,

        /// Playback end in milliseconds (defaults to the last comment's expiry)
        #[arg(long)]
        to: Option<u64>,

        /// Virtual timer interval in milliseconds
        #[arg(long, default_value = "41")]
        tick: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => info(input)?,

        Commands::Simulate {
            input,
            width,
            height,
            from,
            to,
            tick,
        } => simulate(input, width, height, from, to, tick)?,
    }

    Ok(())
}

fn load_records(input: &PathBuf) -> Result<Vec<CommentRecord>> {
    let bytes = fs::read(input)
        .with_context(|| format!("Failed to read comment stream {}", input.display()))?;
    danmaku_parser::parse(&bytes).context("Failed to parse comment stream")
}

fn info(input: PathBuf) -> Result<()> {
    let records = load_records(&input)?;

    println!("\n=== Comment Stream Information ===");
    println!("Comments: {}", records.len());

    if let Some(first) = records.iter().map(|r| r.start_time_ms).min() {
        let last = records.iter().map(|r| r.start_time_ms).max().unwrap_or(first);
        println!(
            "Time span: {} ms - {} ms ({:.2} seconds)",
            first,
            last,
            (last - first) as f64 / 1000.0
        );
    }

    let scrolling = records.iter().filter(|r| r.mode.is_scrolling()).count();
    println!(
        "Modes: {} scrolling, {} static",
        scrolling,
        records.len() - scrolling
    );

    println!("\n=== Comments (first 10 entries) ===");
    let mut ordered: Vec<&CommentRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.start_time_ms);
    for (i, record) in ordered.iter().take(10).enumerate() {
        println!(
            "  [{}] {} ms mode={:?} size={} color={} {:?}",
            i, record.start_time_ms, record.mode, record.size, record.color.to_hex(), record.text
        );
    }
    if records.len() > 10 {
        println!("  ... and {} more entries", records.len() - 10);
    }

    Ok(())
}

fn simulate(
    input: PathBuf,
    width: u32,
    height: u32,
    from: u64,
    to: Option<u64>,
    tick: u64,
) -> Result<()> {
    let records = load_records(&input)?;

    let end = to.unwrap_or_else(|| {
        records
            .iter()
            .map(|r| r.start_time_ms + r.duration_ms)
            .max()
            .unwrap_or(from)
    });

    println!(
        "Simulating {} comments at {}x{} from {} ms to {} ms ({} ms ticks)",
        records.len(),
        width,
        height,
        from,
        end,
        tick
    );

    let mut manager = CommentManager::new(TraceRenderer::default());
    manager.set_bounds(width, height);
    manager.load(records);
    manager.resume();

    let step = tick.max(1);
    let mut time = from;
    while time <= end {
        manager.advance(time);
        manager.tick_by(step);
        time += step;
    }

    println!("\n=== Summary ===");
    println!("Activated: {}", manager.renderer().mounted);
    println!("Peak concurrent: {}", manager.renderer().peak);
    println!("Still active at {} ms: {}", end, manager.active().len());

    Ok(())
}

/// Render backend that traces placements instead of drawing glyphs
///
/// Extents are estimated from the character count and font size; real
/// glyph metrics belong to the host renderer.
#[derive(Default)]
struct TraceRenderer {
    labels: HashMap<u32, String>,
    mounted: u64,
    active: usize,
    peak: usize,
}

impl RenderBackend for TraceRenderer {
    fn mount(&mut self, id: u32, comment: &CommentRecord) -> Extents {
        println!(
            "  + [{}] {:?} color={} font={:?}",
            id,
            comment.text,
            comment.color.to_hex(),
            comment.font_string()
        );
        self.labels.insert(id, comment.text.clone());
        self.mounted += 1;
        self.active += 1;
        self.peak = self.peak.max(self.active);

        let chars = comment.text.chars().count() as u32;
        Extents::new(chars * comment.size, comment.size + comment.size / 5)
    }

    fn set_position(&mut self, _id: u32, _x: f64, _y: f64) {}

    fn unmount(&mut self, id: u32) {
        let label = self.labels.remove(&id).unwrap_or_default();
        println!("  - [{}] {:?}", id, label);
        self.active = self.active.saturating_sub(1);
    }
}
