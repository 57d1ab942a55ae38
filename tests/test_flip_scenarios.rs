//! End-to-end flip scenarios
//!
//! Each scenario drives a surface against a software display acting as the
//! test double for the hardware compositor.

mod common;

use std::thread;

use common::{assert_blocked, solid_frame, test_surface, wait_until};
use pageflip::core::PageState;
use pageflip::display::CompletionMode;

/// Double buffering with a display that completes every flip immediately:
/// the pages alternate and no frame is ever written into the visible page.
#[test]
fn test_double_buffer_alternates_pages() {
    let (display, mut surface) = test_surface(CompletionMode::Immediate, 2);

    let mut shown = Vec::new();
    for value in 1..=3u8 {
        surface.submit_frame(&solid_frame(value)).unwrap();
        shown.push(surface.current_page().unwrap());
        assert_eq!(display.scanout_contents(), Some(solid_frame(value)));
    }

    assert_eq!(shown, vec![0, 1, 0]);
    assert_eq!(display.writes_to_scanout(), 0);
    assert_eq!(display.presented(), 3);

    let stats = surface.coordinator().stats();
    assert_eq!(stats.flips_issued, 3);
    assert_eq!(stats.flips_completed, 3);
    assert_eq!(stats.peak_pending, 1);

    surface.teardown();
    assert_eq!(display.live_resources(), 0);
}

/// A single page: the second submission has to wait for the first flip to
/// land before it can reuse the page, and then shows the second frame.
#[test]
fn test_single_page_waits_for_completion() {
    let (display, mut surface) = test_surface(CompletionMode::Manual, 1);
    let coordinator = surface.coordinator().clone();

    surface.submit_frame(&solid_frame(1)).unwrap();
    assert_eq!(coordinator.pending_count(), 1);
    assert_eq!(display.pending_flips(), 1);

    let producer = thread::spawn(move || {
        surface.submit_frame(&solid_frame(2)).unwrap();
        surface
    });

    assert!(wait_until(|| coordinator.stats().page_waits == 1));
    assert_blocked(&producer, "second submit_frame");
    assert_eq!(display.presented(), 0);

    assert!(display.complete_next_flip());
    assert_eq!(display.presented(), 1);

    let surface = producer.join().unwrap();
    assert_eq!(display.writes_to_scanout(), 1);
    assert!(display.complete_next_flip());
    assert_eq!(display.scanout_contents(), Some(solid_frame(2)));
    assert_eq!(surface.current_page(), Some(0));
    assert_eq!(surface.page_states(), vec![PageState::Displayed]);

    surface.teardown();
    assert_eq!(display.live_resources(), 0);
}

/// Teardown right after a submission must hold every resource until the
/// outstanding flip completes, then release each exactly once.
#[test]
fn test_teardown_waits_for_pending_flip() {
    let (display, mut surface) = test_surface(CompletionMode::Manual, 2);
    surface.submit_frame(&solid_frame(9)).unwrap();
    assert_eq!(surface.coordinator().pending_count(), 1);

    let teardown = thread::spawn(move || surface.teardown());
    assert_blocked(&teardown, "teardown");
    assert_eq!(display.live_resources(), 2);

    assert!(display.complete_next_flip());
    teardown.join().unwrap();

    assert_eq!(display.live_resources(), 0);
    assert_eq!(display.double_releases(), 0);
    assert_eq!(display.in_flight_releases(), 0);
}

/// With three pages the producer can run one frame ahead of the display:
/// the third page is still free while a flip is outstanding.
#[test]
fn test_triple_buffer_keeps_spare_page() {
    let (display, mut surface) = test_surface(CompletionMode::Manual, 3);

    surface.submit_frame(&solid_frame(1)).unwrap();
    assert!(display.complete_next_flip());
    surface.submit_frame(&solid_frame(2)).unwrap();

    assert_eq!(surface.current_page(), Some(0));
    assert_eq!(surface.next_page(), Some(2));
    assert_eq!(
        surface.page_states(),
        vec![PageState::Displayed, PageState::Acquired, PageState::Acquired]
    );
    assert_eq!(surface.coordinator().stats().page_waits, 0);

    assert!(display.complete_next_flip());
    assert_eq!(
        surface.page_states(),
        vec![PageState::Free, PageState::Displayed, PageState::Acquired]
    );
    surface.teardown();
}
