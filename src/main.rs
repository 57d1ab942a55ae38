use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use pageflip::config::{PixelFormat, SurfaceConfig};
use pageflip::display::{CompletionMode, SoftwareDisplay};
use pageflip::driver::VideoDriver;

/// Drive the page-flip synchronizer against a software display:
/// - frames are generated on this thread and submitted as fast as allowed
/// - a vsync thread completes at most one flip per refresh period
#[derive(Parser, Debug)]
#[command(name = "flipdemo")]
#[command(about = "Present generated frames through the page-flip synchronizer")]
struct Args {
    /// Surface width in pixels
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Pixel format
    #[arg(short, long, default_value = "rgb565",
          help = "Pixel format: rgb565, xrgb8888, argb8888")]
    format: PixelFormat,

    /// Pages in the pool
    #[arg(short, long, default_value_t = 3,
          help = "Off-screen pages: 2 for double buffering, 3 for triple buffering")]
    pages: usize,

    /// Frames to present
    #[arg(short = 'n', long, default_value_t = 120)]
    frames: u32,

    /// Display refresh rate
    #[arg(short, long, default_value_t = 60,
          help = "Refresh rate of the emulated display in Hz")]
    refresh_hz: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = SurfaceConfig::new(args.width, args.height, args.format, args.pages);
    config.validate().context("invalid surface configuration")?;

    let display = Arc::new(SoftwareDisplay::new(CompletionMode::Manual));
    let vsync = display
        .spawn_vsync(args.refresh_hz)
        .context("failed to start vsync")?;

    let mut driver = VideoDriver::new(display.clone());
    driver
        .configure(config)
        .context("failed to configure surface")?;

    let started = Instant::now();
    let mut frame = vec![0u8; config.frame_bytes()];
    for index in 0..args.frames {
        fill_frame(&mut frame, index);
        driver
            .submit_frame(&frame)
            .with_context(|| format!("failed to submit frame {index}"))?;
    }
    driver.teardown();
    let elapsed = started.elapsed();
    vsync.stop();

    let stats = driver.stats();
    log::info!(
        "presented {} frames in {:.2?} ({:.1} fps)",
        display.presented(),
        elapsed,
        display.presented() as f64 / elapsed.as_secs_f64()
    );
    log::info!(
        "flips issued {}, completed {}, pending waits {}, page waits {}",
        stats.flips_issued,
        stats.flips_completed,
        stats.pending_waits,
        stats.page_waits
    );
    Ok(())
}

/// Fill the frame with a solid byte value that changes every frame
fn fill_frame(frame: &mut [u8], index: u32) {
    frame.fill((index % 251) as u8);
}
