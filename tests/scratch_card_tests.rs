use image::{Rgba, RgbaImage};
use scratch_pay::assets::LoadedImages;
use scratch_pay::input::{CanvasRect, InputEvent};
use scratch_pay::layout::Size;
use scratch_pay::scratcher::{CardState, ScratchCard, ScratchConfig};
use scratch_pay::surface::PixelReadPolicy;
use scratch_pay::types::{alpha_of, Point};
use std::cell::Cell;
use std::rc::Rc;

fn images(w: u32, h: u32) -> LoadedImages {
    LoadedImages {
        cover: RgbaImage::from_pixel(w, h, Rgba([90, 90, 90, 255])),
        reveal: RgbaImage::from_pixel(w, h, Rgba([250, 200, 0, 255])),
    }
}

fn mounted_card(config: ScratchConfig, w: u32, h: u32) -> (ScratchCard, Rc<Cell<u32>>) {
    let fired = Rc::new(Cell::new(0));
    let seen = fired.clone();
    let mut card = ScratchCard::new(config, Box::new(move || seen.set(seen.get() + 1)));
    card.mount(images(w, h), w as usize).expect("mount");
    (card, fired)
}

/// Press, drag along `points`, release.
fn stroke(card: &mut ScratchCard, points: &[(f32, f32)]) {
    let rect = CanvasRect::default();
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        card.handle_input(&InputEvent::PointerDown(Point::new(x, y)), rect);
    }
    for &(x, y) in iter {
        card.handle_input(&InputEvent::PointerMove(Point::new(x, y)), rect);
    }
    card.handle_input(&InputEvent::PointerUp, rect);
}

/// Horizontal sweeps every `step` rows, `step` px apart along each row.
fn sweep_rows(card: &mut ScratchCard, width: f32, rows: &[f32], step: f32) {
    for &y in rows {
        let mut points = Vec::new();
        let mut x = 0.0;
        while x <= width {
            points.push((x, y));
            x += step;
        }
        stroke(card, &points);
    }
}

#[test]
fn cleared_ratio_never_decreases_while_scratching() {
    let (mut card, _) = mounted_card(ScratchConfig::default(), 400, 300);
    let mut last = 0.0;
    for y in [20.0, 60.0, 100.0, 140.0] {
        sweep_rows(&mut card, 400.0, &[y], 30.0);
        let ratio = card.progress().cleared_ratio;
        assert!(ratio >= last, "{ratio} < {last}");
        assert!((0.0..=1.0).contains(&ratio));
        last = ratio;
    }
    assert!(last > 0.0);
}

#[test]
fn completion_fires_exactly_once_and_clears_the_cover() {
    let (mut card, fired) = mounted_card(ScratchConfig::default(), 300, 200);
    // Covers the whole card several times over; many samples land past the threshold.
    sweep_rows(&mut card, 300.0, &[0.0, 40.0, 80.0, 120.0, 160.0, 200.0], 10.0);
    sweep_rows(&mut card, 300.0, &[20.0, 100.0, 180.0], 10.0);

    assert_eq!(card.state(), CardState::Revealed);
    assert!(card.progress().done);
    assert_eq!(fired.get(), 1);
    assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 0));
}

#[test]
fn completion_can_land_on_a_throttled_move_sample() {
    let (mut card, fired) = mounted_card(ScratchConfig::default(), 160, 80);
    let rect = CanvasRect::default();
    card.handle_input(&InputEvent::PointerDown(Point::new(0.0, 40.0)), rect);
    // Eight moves across a short card erase nearly all of it before release.
    for i in 1..=8 {
        let x = i as f32 * 20.0;
        card.handle_input(&InputEvent::PointerMove(Point::new(x, 40.0)), rect);
    }
    assert_eq!(card.state(), CardState::Revealed);
    assert_eq!(fired.get(), 1);
    // Input after completion is ignored, including the release.
    assert!(card.handle_input(&InputEvent::PointerUp, rect).is_none());
    assert_eq!(fired.get(), 1);
}

#[test]
fn resize_while_ready_resets_progress_and_repaints_cover() {
    let (mut card, fired) = mounted_card(ScratchConfig::default(), 400, 300);
    sweep_rows(&mut card, 400.0, &[50.0, 150.0], 20.0);
    assert!(card.progress().cleared_ratio > 0.0);

    card.resize(200).unwrap();
    assert_eq!(card.state(), CardState::Ready);
    assert_eq!(card.draw_size(), Some(Size::new(200, 150)));
    assert_eq!(card.progress().cleared_ratio, 0.0);
    assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 255));
    assert_eq!(fired.get(), 0);
}

#[test]
fn resize_that_keeps_the_draw_size_still_resets_progress() {
    let fired = Rc::new(Cell::new(0));
    let seen = fired.clone();
    let mut card = ScratchCard::new(ScratchConfig::default(), Box::new(move || seen.set(seen.get() + 1)));
    card.mount(images(400, 300), 900).unwrap();
    stroke(&mut card, &[(200.0, 150.0)]);
    assert!(card.progress().cleared_ratio > 0.0);

    card.resize(1000).unwrap(); // still capped at natural width
    assert_eq!(card.draw_size(), Some(Size::new(400, 300)));
    assert_eq!(card.state(), CardState::Ready);
    assert_eq!(card.progress().cleared_ratio, 0.0);
    assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 255));
    assert_eq!(fired.get(), 0);
}

#[test]
fn resize_after_reveal_stays_revealed() {
    let (mut card, fired) = mounted_card(ScratchConfig::default(), 160, 80);
    sweep_rows(&mut card, 160.0, &[0.0, 40.0, 80.0], 10.0);
    assert_eq!(card.state(), CardState::Revealed);

    card.resize(80).unwrap();
    assert_eq!(card.state(), CardState::Revealed);
    assert_eq!(card.draw_size(), Some(Size::new(80, 40)));
    assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 0));
    assert_eq!(fired.get(), 1);
}

#[test]
fn restricted_pixel_reads_never_complete() {
    let config = ScratchConfig { pixel_reads: PixelReadPolicy::Restricted, ..ScratchConfig::default() };
    let (mut card, fired) = mounted_card(config, 160, 80);
    sweep_rows(&mut card, 160.0, &[0.0, 40.0, 80.0], 10.0);

    assert_eq!(card.state(), CardState::Ready);
    assert!(card.is_unmeasurable());
    assert_eq!(fired.get(), 0);
    // The strokes still erased the cover.
    assert!(card.cover_layer().unwrap().pixels.iter().all(|&p| alpha_of(p) == 0));
}
