//! Liveness under repeated signal/wait cycling
//!
//! A producer that blocks on every frame must always be woken by the
//! completion that frees its page; a lost wakeup shows up here as a stall.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{PATIENCE, solid_frame, test_config, test_surface};
use pageflip::display::{CompletionMode, SoftwareDisplay};
use pageflip::driver::VideoDriver;

#[test]
fn test_producer_never_misses_a_wakeup() {
    const FRAMES: u64 = 200;
    let (display, mut surface) = test_surface(CompletionMode::Manual, 2);
    let coordinator = surface.coordinator().clone();

    let producer = thread::spawn(move || {
        for index in 0..FRAMES {
            surface.submit_frame(&solid_frame(index as u8)).unwrap();
        }
        surface
    });

    // This thread plays the display, completing flips as they arrive.
    let deadline = Instant::now() + PATIENCE;
    while !producer.is_finished() {
        assert!(Instant::now() < deadline, "producer stalled");
        if display.wait_for_pending_flip(Duration::from_millis(5)) {
            display.complete_next_flip();
        }
    }

    let surface = producer.join().unwrap();
    while display.complete_next_flip() {}

    let stats = coordinator.stats();
    assert_eq!(stats.flips_issued, FRAMES);
    assert_eq!(stats.flips_completed, FRAMES);
    assert_eq!(stats.peak_pending, 1);
    assert_eq!(display.writes_to_scanout(), 0);
    assert_eq!(
        display.scanout_contents(),
        Some(solid_frame((FRAMES - 1) as u8))
    );

    surface.teardown();
    assert_eq!(display.live_resources(), 0);
}

#[test]
fn test_vsync_thread_paces_driver() {
    const FRAMES: u64 = 30;
    let display = Arc::new(SoftwareDisplay::new(CompletionMode::Manual));
    let vsync = display.spawn_vsync(1000).unwrap();

    let mut driver = VideoDriver::new(display.clone());
    driver.configure(test_config(3)).unwrap();
    for index in 0..FRAMES {
        driver.submit_frame(&solid_frame(index as u8)).unwrap();
    }
    driver.teardown();
    vsync.stop();

    let stats = driver.stats();
    assert_eq!(stats.flips_issued, FRAMES);
    assert_eq!(stats.flips_completed, FRAMES);
    assert_eq!(stats.peak_pending, 1);
    assert_eq!(display.presented(), FRAMES);
    assert_eq!(display.writes_to_scanout(), 0);
    assert_eq!(display.live_resources(), 0);
    assert_eq!(display.in_flight_releases(), 0);
}
