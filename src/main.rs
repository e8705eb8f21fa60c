// What you SEE:
// • A scratch card: drag with the left mouse button to scratch the cover away.
// • Once most of it is gone the cover vanishes and the reward shows in full.
// • A few seconds later a payment popup offers wallets (1-4) or a typed UPI id
//   (TAB to type, ENTER to pay). ESC closes the popup, or quits otherwise.
//
// `scratch-pay link` prints the payment links without opening a window.

use clap::Parser;
use minifb::Key;
use scratch_pay::assets;
use scratch_pay::config::{Cli, Command, LinkArgs, PlayArgs};
use scratch_pay::dispatch::{intent_uri, Platform, PlatformDispatcher, SystemNavigator};
use scratch_pay::draw::{
    blit, draw_circle, draw_text_5x7, fill_rect, key_to_char, text_width_5x7, Drawer,
};
use scratch_pay::error::Error;
use scratch_pay::input::CanvasRect;
use scratch_pay::logging;
use scratch_pay::payment::{build_links, Amount, WalletApp};
use scratch_pay::popup::{FileStore, PopupCoordinator};
use scratch_pay::scratcher::{CardState, ScratchCard};
use scratch_pay::surface::composite_over;
use scratch_pay::types::FrameBuffer;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

const MARGIN: usize = 16;  // visual: gap left/right of the card
const CARD_TOP: i32 = 28;  // visual: room for the HUD line above the card
const MAX_PAYEE_LEN: usize = 48;

const BG: u32 = 0xFF_1E_1E_2A;
const WHITE: u32 = 0xFF_FF_FF_FF;
const YELLOW: u32 = 0xFF_FF_CC_33;
const RED: u32 = 0xFF_FF_55_55;
const PANEL: u32 = 0xFF_2E_2E_40;
const PANEL_EDGE: u32 = 0xFF_55_55_77;

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    match cli.command {
        Command::Play(args) => run_play(&args),
        Command::Link(args) => run_link(&args),
    }
}

fn run_link(args: &LinkArgs) -> Result<(), Error> {
    let desc = args.payment.descriptor(None)?;
    let target = WalletApp::from_package(&args.target);
    let links = build_links(&desc, target);
    let user_agent = args.payment.user_agent.clone().unwrap_or_else(Platform::host_user_agent);
    let platform = Platform::from_user_agent(&user_agent);

    println!("canonical: {}", links.canonical);
    println!("{}: {}", target.display_name(), links.app);
    if let Some(package) = target.package() {
        if platform.supports_intents() {
            println!("intent: {}", intent_uri(&links, package));
        }
    }
    Ok(())
}

/// Wallet shortcuts shown in the popup.
const WALLET_KEYS: [(Key, Key, WalletApp); 4] = [
    (Key::Key1, Key::NumPad1, WalletApp::PhonePe),
    (Key::Key2, Key::NumPad2, WalletApp::Paytm),
    (Key::Key3, Key::NumPad3, WalletApp::GooglePay),
    (Key::Key4, Key::NumPad4, WalletApp::Bhim),
];

#[derive(Default)]
struct PaymentPanel {
    entry: String,        // typed UPI id
    editing: bool,        // TAB toggles typing mode
    status: Option<String>,
}

enum PanelAction {
    Nothing,
    Close,
    Pay(WalletApp, Option<String>),
}

fn run_play(args: &PlayArgs) -> Result<(), Error> {
    /* --- Images ---
       Visual: nothing yet; the window opens only once both images decoded. */
    let images = assets::load_pair(&args.overlay, &args.reveal, args.load_timeout())?;

    /* --- Payment setup --- */
    let amount = args.payment.amount()?;
    let user_agent = args.payment.user_agent.clone().unwrap_or_else(Platform::host_user_agent);
    let dispatcher = PlatformDispatcher::for_user_agent(&user_agent);
    let mut nav = SystemNavigator;

    /* --- Card + popup ---
       Visual: the completion callback only flips a flag; the popup decides when to show. */
    let config = args.scratch_config();
    let revealed = Rc::new(Cell::new(false));
    let flag = revealed.clone();
    let mut card = ScratchCard::new(config, Box::new(move || flag.set(true)));
    let mut popup = PopupCoordinator::new(FileStore::open(&args.session), args.popup_delay());
    let mut panel = PaymentPanel {
        entry: args.payment.payee.clone().unwrap_or_default(),
        ..PaymentPanel::default()
    };

    let mut drawer = Drawer::new("Scratch & Pay", args.width, args.height)?;
    let (w, _) = drawer.size();
    card.mount(images, container_width(w))?;
    let label = format!("RS {amount}");
    let mut last_size = drawer.size();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() {
        let now = Instant::now();
        let (w, h) = drawer.size();

        /* 1) Re-layout on a real window resize only. Visual: the card is rebuilt and resets. */
        if (w, h) != last_size {
            card.resize(container_width(w))?;
            last_size = (w, h);
        }
        let (w, h) = (w.max(1), h.max(1));
        let (card_w, card_h) = card.draw_size().map(|s| (s.width, s.height)).unwrap_or((0, 0));
        let origin_x = (w.saturating_sub(card_w) / 2) as i32;
        let rect = CanvasRect { left: origin_x as f32, top: CARD_TOP as f32 };

        /* 2) Pointer input. Visual: holes appear under the brush. */
        let pointer = drawer.poll_pointer();
        if !popup.is_visible() {
            for event in &pointer {
                card.handle_input(event, rect);
            }
        }

        /* 3) Popup timing. */
        if revealed.get() {
            popup.on_revealed(now);
        }
        let popup_open = popup.poll(now);

        /* 4) Keys. */
        if popup_open {
            match panel_action(&drawer, &mut panel) {
                PanelAction::Nothing => {}
                PanelAction::Close => popup.close(),
                PanelAction::Pay(target, payee) => {
                    let desc = args.payment.descriptor(payee.as_deref())?;
                    dispatcher.pay(&desc, target, &mut nav);
                    panel.status = Some(format!("OPENING {}...", target.display_name()));
                }
            }
        } else if drawer.key_pressed_once(Key::Escape) {
            break;
        }

        /* 5) Compose the frame: reveal layer + amount, cover on top, HUD. */
        let mut screen = FrameBuffer::filled(w, h, BG);
        if let (Some(reveal), Some(cover)) = (card.reveal_layer(), card.cover_layer()) {
            let mut layer = reveal.clone();
            let tx = (layer.width as i32 - text_width_5x7(&label)) / 2;
            let ty = layer.height as i32 / 2 - 3;
            draw_text_5x7(&mut layer, tx, ty, &label, WHITE);
            let frame = composite_over(cover, &layer);
            blit(&mut screen, &frame, origin_x, CARD_TOP);
        }

        if card.state() == CardState::Ready && !popup_open {
            if let Some((mx, my)) = drawer.mouse_pos() {
                draw_circle(&mut screen, mx as i32, my as i32, config.brush_radius as i32, YELLOW);
            }
        }

        let hud = match card.state() {
            CardState::Initial => "LOADING".to_string(),
            CardState::Ready => format!("SCRATCH {:.0}%", card.progress().cleared_ratio * 100.0),
            CardState::Revealed => "REVEALED!".to_string(),
        };
        draw_text_5x7(&mut screen, 8, 8, &hud, WHITE);
        if card.is_unmeasurable() {
            let y = CARD_TOP + card_h as i32 + 8;
            draw_text_5x7(&mut screen, 8, y, "PROGRESS UNAVAILABLE - CARD CANNOT COMPLETE", RED);
        }

        if popup_open {
            draw_payment_panel(&mut screen, &panel, amount);
        }

        /* 6) Present. */
        drawer.present(&screen)?;
    }

    Ok(())
}

fn container_width(window_width: usize) -> usize {
    window_width.saturating_sub(2 * MARGIN)
}

fn panel_action(drawer: &Drawer, panel: &mut PaymentPanel) -> PanelAction {
    let shift = drawer.shift_down();
    for key in drawer.keys_pressed() {
        if panel.editing {
            match key {
                Key::Escape | Key::Tab => panel.editing = false,
                Key::Backspace => {
                    panel.entry.pop();
                }
                Key::Enter | Key::NumPadEnter => {
                    let id = panel.entry.trim();
                    if !id.is_empty() {
                        return PanelAction::Pay(WalletApp::Generic, Some(id.to_string()));
                    }
                }
                other => {
                    if let Some(c) = key_to_char(other, shift) {
                        if panel.entry.len() < MAX_PAYEE_LEN {
                            panel.entry.push(c);
                        }
                    }
                }
            }
            continue;
        }

        match key {
            Key::Escape => return PanelAction::Close,
            Key::Tab => panel.editing = true,
            _ => {
                if let Some(&(_, _, app)) =
                    WALLET_KEYS.iter().find(|(digit, pad, _)| key == *digit || key == *pad)
                {
                    return PanelAction::Pay(app, None);
                }
            }
        }
    }
    PanelAction::Nothing
}

/// Visual: a centered dialog listing wallets, the typed UPI id and a status line.
fn draw_payment_panel(screen: &mut FrameBuffer, panel: &PaymentPanel, amount: Amount) {
    let pw = (screen.width as i32 - 20).clamp(40, 300);
    let ph = 190;
    let px = (screen.width as i32 - pw) / 2;
    let py = (screen.height as i32 - ph).max(0) / 2;

    fill_rect(screen, px - 1, py - 1, pw + 2, ph + 2, PANEL_EDGE);
    fill_rect(screen, px, py, pw, ph, PANEL);

    let cursor = if panel.editing { "_" } else { "" };
    let entry_color = if panel.editing { YELLOW } else { WHITE };
    let mut lines: Vec<(String, u32, i32)> = vec![
        ("COMPLETE PAYMENT".to_string(), YELLOW, 12),
        (format!("RS {amount}"), WHITE, 18),
        ("UPI APPS".to_string(), WHITE, 12),
    ];
    for (i, (_, _, app)) in WALLET_KEYS.iter().enumerate() {
        lines.push((format!("{} {}", i + 1, app.display_name()), WHITE, 11));
    }
    lines.push(("OR ENTER UPI ID (TAB)".to_string(), WHITE, 12));
    lines.push((format!("> {}{}", panel.entry, cursor), entry_color, 18));
    if let Some(status) = &panel.status {
        lines.push((status.clone(), YELLOW, 12));
    }
    lines.push(("ESC CLOSE".to_string(), PANEL_EDGE, 12));

    let mut y = py + 12;
    for (text, color, gap) in &lines {
        draw_text_5x7(screen, px + 12, y, text, *color);
        y += gap;
    }
}
