//! Interactive terminal loop.
//!
//! Owns the terminal while the dashboard runs: raw mode, alternate screen,
//! hidden cursor. Input is polled with a short timeout so worker results are
//! merged and redrawn even when no key is pressed.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

use crate::application::Dashboard;
use crate::error::CloudscopeResult;
use crate::ui::input::key_to_command;
use crate::ui::render::{
    render_header, render_help_bar, render_row, render_separator, render_status, truncate, Style,
};
use crate::ui::terminal::TerminalCapabilities;
use crate::ui::theme::Glyphs;

const TICK: Duration = Duration::from_millis(100);
/// Header, two separators, status line and help bar.
const CHROME_ROWS: usize = 5;
const OUTPUT_ROWS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    /// Tree rows to show; 0 fits the terminal height.
    pub max_rows: usize,
    pub caps: TerminalCapabilities,
}

/// Restores the terminal on drop, including on early return.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(stdout: &mut Stdout) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the dashboard until the user quits.
pub fn run(dashboard: &mut Dashboard, mut options: AppOptions) -> CloudscopeResult<()> {
    let mut stdout = io::stdout();
    let _guard = TerminalGuard::enter(&mut stdout)?;

    let mut dirty = true;
    let mut was_busy = dashboard.is_busy();
    loop {
        if dashboard.drain() > 0 {
            dirty = true;
        }
        let busy = dashboard.is_busy();
        if busy != was_busy {
            was_busy = busy;
            dirty = true;
        }
        if dirty {
            draw(&mut stdout, dashboard, &options)?;
            dirty = false;
        }

        if !event::poll(TICK)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(command) = key_to_command(key) {
                    tracing::trace!(?command, "key");
                    if dashboard.handle(command) {
                        break;
                    }
                    dirty = true;
                }
            }
            Event::Resize(width, height) => {
                options.caps.width = width;
                options.caps.height = height;
                dirty = true;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Tree rows that fit, given the terminal height and the output pane.
fn tree_rows(options: &AppOptions, output_rows: usize) -> usize {
    let available = (options.caps.height as usize)
        .saturating_sub(CHROME_ROWS + output_rows)
        .max(1);
    match options.max_rows {
        0 => available,
        n => n.min(available),
    }
}

fn draw(stdout: &mut Stdout, dashboard: &mut Dashboard, options: &AppOptions) -> io::Result<()> {
    let style = Style {
        glyphs: Glyphs::new(options.caps.supports_unicode),
        color: options.caps.supports_color,
        width: options.caps.width as usize,
    };

    let output: Vec<String> = dashboard
        .output()
        .map(|o| {
            o.lines()
                .take(OUTPUT_ROWS)
                .map(|l| match style.width {
                    0 => l.to_string(),
                    width => truncate(l, width),
                })
                .collect()
        })
        .unwrap_or_default();
    let rows = dashboard.visible_rows(tree_rows(options, output.len()));

    let mut lines = Vec::with_capacity(rows.len() + output.len() + CHROME_ROWS);
    lines.push(render_header(
        dashboard.title(),
        &dashboard.breadcrumb(),
        dashboard.failed_listings(),
        dashboard.is_busy(),
        &style,
    ));
    lines.push(render_separator(&style));
    lines.extend(rows.iter().map(|row| render_row(row, &style)));
    lines.push(render_separator(&style));
    lines.push(render_status(dashboard.status(), &style));
    lines.extend(output);
    lines.push(render_help_bar(dashboard.available_actions(), &style));

    queue!(stdout, terminal::Clear(ClearType::All))?;
    for (y, line) in lines.iter().enumerate() {
        queue!(stdout, cursor::MoveTo(0, y as u16), Print(line))?;
    }
    stdout.flush()
}
