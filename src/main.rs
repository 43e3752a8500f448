mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::{info, warn};

use alien_invader::compute::InputState;
use alien_invader::config::GameConfig;
use alien_invader::entities::EndReason;
use alien_invader::logger;
use alien_invader::render::draw_snapshot;
use alien_invader::worker::CancelToken;
use alien_invader::Session;

use display::TerminalCanvas;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that never report key releases: OS key
/// repeat fires at ≥ 15 Hz, so 8 frames (≈130 ms) is refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// How often the input thread checks whether it should exit.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

fn sample_input(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputState {
    InputState {
        up: is_held(key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame),
        down: is_held(key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame),
        left: is_held(key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
        right: is_held(key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
        fire: is_held(key_frame, &[KeyCode::Char(' ')], frame),
        quit: false,
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
}

/// Drive one session until the player quits or asks for another round.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key, and each frame samples which keys are still fresh.
/// This lets Space and the arrows be held together.
fn game_loop<W: Write>(
    canvas: &mut TerminalCanvas<W>,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<LoopExit> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut quit = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    if is_quit(code, modifiers) {
                        quit = true;
                    }
                    if !session.is_running() && matches!(code, KeyCode::Char('r') | KeyCode::Char('R')) {
                        return Ok(LoopExit::Restart);
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        if quit && !session.is_running() {
            return Ok(LoopExit::Quit);
        }

        let mut input = sample_input(&key_frame, frame);
        input.quit = quit;
        let dt = frame_start.duration_since(last);
        last = frame_start;

        let snapshot = session.tick(&input, dt);
        if snapshot.end_reason == Some(EndReason::Quit) {
            return Ok(LoopExit::Quit);
        }

        draw_snapshot(canvas, &snapshot)?;
        canvas.draw_overlay(&snapshot)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    logger::init(logger::DEFAULT_LOG_PATH).context("failed to initialise logging")?;
    let config = GameConfig::load();
    config.validate().context("invalid configuration")?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release events; terminals without the kitty protocol fall
    // back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    info!(keyboard_enhanced, "terminal ready");

    // Dedicated input thread, polled so it can be stopped and joined.
    let (tx, rx) = mpsc::channel::<Event>();
    let input_token = CancelToken::new();
    let reader_token = input_token.clone();
    let reader = thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || -> std::io::Result<()> {
            while !reader_token.is_cancelled() {
                if event::poll(INPUT_POLL)? && tx.send(event::read()?).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Ok(())
        })?;

    let result = run(out, &rx, &config);

    input_token.cancel();
    match reader.join() {
        Ok(Err(e)) => warn!(error = %e, "input reader failed"),
        Err(_) => warn!("input reader panicked"),
        Ok(Ok(())) => {}
    }

    // Always restore the terminal
    let mut out = stdout();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: W, rx: &mpsc::Receiver<Event>, config: &GameConfig) -> anyhow::Result<()> {
    let mut canvas = TerminalCanvas::new(out, config.bounds())?;
    loop {
        let mut session = Session::start(config.clone())?;
        let exit = game_loop(&mut canvas, &mut session, rx)?;
        let reason = session.end();
        info!(?reason, "round over");
        canvas.writer().flush()?;
        if let LoopExit::Quit = exit {
            break;
        }
    }
    Ok(())
}
