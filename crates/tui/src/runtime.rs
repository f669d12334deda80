//! Runtime: event loop and input routing for the console.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop over terminal input, UI ticks, and in-flight
//!   request completions.
//! - Execute returned `Effect`s: navigation directly, everything else
//!   through the command layer.
//! - Run the post-update reconciliation choke point after every processed
//!   event, so the path-resolution loop advances no matter which event
//!   mutated state.
//!
//! Input is read on a dedicated thread that blocks on
//! `crossterm::event::read()` and forwards events over a channel; keeping
//! `read()` off the async loop avoids lost events on some terminals.
//! Ticking is adaptive: fast while something animates, slow when idle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::{stream::FuturesUnordered, StreamExt};
use ratatui::{prelude::CrosstermBackend, Terminal};
use snaptty_api::ServerClient;
use snaptty_types::{Effect, ExecOutcome, Msg};
use tokio::{
    signal,
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::app::App;
use crate::cmd;
use crate::ui::component::Component;
use crate::ui::main_component::MainView;

/// Spawn a dedicated input thread that blocks on terminal input and
/// forwards `crossterm` events over a Tokio channel.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(event) => {
                if sender.blocking_send(event).is_err() {
                    break;
                }
            }
            Err(error) => {
                tracing::warn!("failed to read terminal event: {error}");
                break;
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

/// Process a batch of effects to quiescence.
///
/// Navigation effects swap views (their enter/exit hooks may queue more
/// effects); the rest become commands. Afterwards the post-update
/// reconciliation runs until it stops producing work — this is the
/// `componentDidUpdate` of the original design, made explicit.
fn drain_effects(
    app: &mut App,
    main_view: &mut MainView,
    effects: &mut Vec<Effect>,
    pending: &mut FuturesUnordered<JoinHandle<ExecOutcome>>,
) {
    while !effects.is_empty() {
        let batch: Vec<Effect> = effects.drain(..).collect();
        let mut queued = Vec::new();
        let mut requests = Vec::new();
        for effect in batch {
            match effect {
                Effect::SwitchTo(route) => main_view.switch_route(app, route, &mut queued),
                Effect::GoBack => main_view.go_back(app, &mut queued),
                Effect::ShowModal(modal) => queued.extend(main_view.set_open_modal(app, Some(modal))),
                Effect::CloseModal => {
                    main_view.set_open_modal(app, None);
                }
                other => requests.push(other),
            }
        }
        cmd::run_cmds(app, cmd::from_effects(requests), pending);
        effects.extend(queued);
    }

    loop {
        let follow_up = app.post_update();
        if follow_up.is_empty() {
            break;
        }
        // reconciliation only ever requests backend work, never navigation
        cmd::run_cmds(app, cmd::from_effects(follow_up), pending);
    }
}

/// Entry point for the TUI runtime: terminal setup, event processing, and
/// teardown.
pub async fn run_app(client: Arc<ServerClient>) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut app = App::new(client);
    let mut main_view = MainView::new();
    let mut terminal = setup_terminal()?;

    let mut pending: FuturesUnordered<JoinHandle<ExecOutcome>> = FuturesUnordered::new();
    let mut effects: Vec<Effect> = main_view.enter_initial_route(&mut app);
    drain_effects(&mut app, &mut main_view, &mut effects, &mut pending);

    // Ticking strategy: fast while animating, slow when idle.
    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(1000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    loop {
        let needs_animation = app.executing || app.form.estimate_running();
        let target_interval = if needs_animation { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(input_event) = maybe_event else { break };
                match input_event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                            break;
                        }
                        effects.extend(main_view.handle_key_events(&mut app, key));
                    }
                    Event::Resize(width, height) => {
                        effects.extend(main_view.handle_message(&mut app, &Msg::Resize(width, height)));
                    }
                    _ => {}
                }
                needs_render = true;
            }

            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(&mut app, &Msg::Tick));
                needs_render = needs_animation || !effects.is_empty();
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                let outcome = joined.unwrap_or_else(|error| ExecOutcome::TaskAborted(error.to_string()));
                effects.extend(main_view.handle_message(&mut app, &Msg::ExecCompleted(Box::new(outcome))));
                app.executing = !pending.is_empty();
                needs_render = true;
            }

            _ = signal::ctrl_c() => { break; }
        }

        drain_effects(&mut app, &mut main_view, &mut effects, &mut pending);
        app.executing = !pending.is_empty();

        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}
