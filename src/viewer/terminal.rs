//! Full-screen terminal viewer

use super::Viewer;
use crate::chart::{ChartOwner, TerminalEngine, Viewport, ViewportSize};
use crate::config::Config;
use crate::feed::ConnectionManager;
use crate::ui;
use crate::ws::WsConfig;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

/// Run the chart in the terminal until `q`, Esc or Ctrl-C
pub async fn run_terminal(config: &Config, url: String) -> anyhow::Result<()> {
    enable_raw_mode().map_err(|e| anyhow::anyhow!("Failed to enable raw mode: {}", e))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        anyhow::bail!("Failed to enter alternate screen: {}", e);
    }

    let result = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(mut terminal) => {
            let _ = terminal.hide_cursor();
            let result = run_loop(&mut terminal, config, url).await;
            let _ = terminal.show_cursor();
            result
        }
        Err(e) => Err(anyhow::anyhow!("Failed to init terminal: {}", e)),
    };

    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: &Config,
    url: String,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    let viewport = Viewport::new(ViewportSize::new(size.width, size.height));
    let owner = ChartOwner::new(TerminalEngine::new(config.chart.max_points), ui::chart_container)
        .with_fixed_height(config.chart.height);
    let mut viewer = Viewer::new(owner, viewport);
    viewer.mount()?;

    let manager = ConnectionManager::with_config(
        WsConfig::new(url)
            .reconnect_interval(config.feed.reconnect_interval())
            .channel_capacity(config.feed.channel_capacity),
    );
    let mut connection = manager.connect();

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    spawn_input_reader(input_tx);

    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    let mut force_redraw = true;

    loop {
        if viewer.take_dirty() | std::mem::take(&mut force_redraw) {
            terminal.draw(|frame| {
                ui::draw(
                    frame,
                    viewer.display(),
                    viewer.ready_state(),
                    viewer.owner().surface(),
                )
            })?;
        }

        tokio::select! {
            event = connection.next_event() => {
                let Some(event) = event else { break };
                viewer.on_connection_event(event);
            }
            input = input_rx.recv() => {
                match input {
                    Some(Event::Key(key)) if is_quit(&key) => break,
                    Some(Event::Resize(width, height)) => {
                        viewer.on_resize(ViewportSize::new(width, height));
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            _ = redraw.tick() => force_redraw = true,
        }
    }

    viewer.unmount();
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || {
        while let Ok(event) = crossterm::event::read() {
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
    }
}
