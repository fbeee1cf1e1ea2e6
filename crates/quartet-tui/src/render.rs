use crate::app::App;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use quartet_core::GameState;
use std::io;

/// Inner width of one tile
const TILE_WIDTH: usize = 14;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    let columns = app.columns();
    let grid_width = (columns * (TILE_WIDTH + 1) + 1) as u16;
    let total_width = grid_width + 34; // grid + gap + info panel
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = if term_height > 24 { 2 } else { 1 };

    match &app.game {
        Some(game) => {
            let rows = render_grid(stdout, app, game, start_x, start_y)?;
            render_info_panel(stdout, app, game, start_x + grid_width + 3, start_y)?;
            render_controls(stdout, app, start_x, start_y + rows * 2 + 2)?;
        }
        None => {
            execute!(
                stdout,
                MoveTo(start_x, start_y),
                SetForegroundColor(app.theme.info),
                Print("No board yet. Press n to build one, q to quit.")
            )?;
            render_controls(stdout, app, start_x, start_y + 2)?;
        }
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

/// Draw the board; returns the number of tile rows
fn render_grid(
    stdout: &mut io::Stdout,
    app: &App,
    game: &GameState,
    x: u16,
    y: u16,
) -> io::Result<u16> {
    let theme = &app.theme;
    let columns = app.columns();
    let rows = game.len().div_ceil(columns);
    let rule = format!("+{}", format!("{}+", "-".repeat(TILE_WIDTH)).repeat(columns));

    execute!(
        stdout,
        MoveTo(x, y),
        SetBackgroundColor(theme.bg),
        SetForegroundColor(theme.border),
        Print(&rule)
    )?;

    for row in 0..rows {
        let tile_y = y + 1 + row as u16 * 2;
        execute!(stdout, MoveTo(x, tile_y))?;

        for col in 0..columns {
            let pos = row * columns + col;
            execute!(
                stdout,
                SetBackgroundColor(theme.bg),
                SetForegroundColor(theme.border),
                Print("|")
            )?;
            render_tile(stdout, app, game, pos)?;
        }
        execute!(
            stdout,
            SetBackgroundColor(theme.bg),
            SetForegroundColor(theme.border),
            Print("|"),
            MoveTo(x, tile_y + 1),
            Print(&rule)
        )?;
    }

    Ok(rows as u16)
}

fn render_tile(stdout: &mut io::Stdout, app: &App, game: &GameState, pos: usize) -> io::Result<()> {
    let theme = &app.theme;
    let name = game
        .record(pos)
        .map(|r| r.display_name())
        .unwrap_or_default();

    let (fg, bg) = match game.visible_group(pos) {
        Some(group) => (theme.locked_fg, theme.group(group)),
        None if pos == app.cursor => (theme.fg, theme.cursor_bg),
        None if app.is_selected(pos) => (theme.fg, theme.selected_bg),
        None => (theme.fg, theme.bg),
    };
    // the cursor stays visible on colored tiles
    let (left, right) = if pos == app.cursor { ('>', '<') } else { (' ', ' ') };

    execute!(
        stdout,
        SetBackgroundColor(bg),
        SetForegroundColor(fg),
        Print(format!("{}{}{}", left, fit(&name, TILE_WIDTH - 2), right))
    )
}

/// Center `text` in `width` columns, truncating with a trailing '~'
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        let cut: String = text.chars().take(width - 1).collect();
        return format!("{}~", cut);
    }
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - len - left))
}

fn render_info_panel(
    stdout: &mut io::Stdout,
    app: &App,
    game: &GameState,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let mut line = y;

    execute!(
        stdout,
        SetBackgroundColor(theme.bg),
        MoveTo(x, line),
        SetForegroundColor(theme.fg),
        Print("QUARTET"),
    )?;
    line += 2;

    let status = if game.is_won() {
        ("Solved!", theme.success)
    } else if game.is_revealed() {
        ("Revealed", theme.error)
    } else if app.generating {
        ("Building...", theme.info)
    } else {
        ("In progress", theme.info)
    };
    execute!(
        stdout,
        MoveTo(x, line),
        SetForegroundColor(status.1),
        Print(status.0),
        MoveTo(x, line + 1),
        SetForegroundColor(theme.info),
        Print(format!("Mistakes: {}", game.mistakes())),
        MoveTo(x, line + 2),
        Print(format!(
            "Selected: {}/{}",
            game.selection().len(),
            game.group_size()
        )),
    )?;
    line += 4;

    let groups: Vec<(usize, String, Option<String>)> = if game.is_revealed() {
        app.revealed
            .iter()
            .map(|g| {
                let rule = g.formed_by.as_ref().map(|r| r.to_string());
                (g.index, g.connection.to_string(), rule)
            })
            .collect()
    } else {
        game.solved_groups()
            .iter()
            .map(|&g| (g, game.connection_of(g).to_string(), None))
            .collect()
    };

    for (index, connection, rule) in groups {
        execute!(
            stdout,
            MoveTo(x, line),
            SetForegroundColor(theme.group(index)),
            Print("## "),
            SetForegroundColor(theme.fg),
            Print(&connection),
        )?;
        line += 1;
        if let Some(rule) = rule {
            execute!(
                stdout,
                MoveTo(x + 3, line),
                SetForegroundColor(theme.info),
                Print(format!("({})", rule)),
            )?;
            line += 1;
        }
    }

    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    execute!(stdout, SetBackgroundColor(theme.bg))?;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Space", "Select"),
        ("Enter", "Submit"),
        ("c", "Clear"),
        ("r", "Reveal"),
        ("n", "New board"),
        ("t", "Theme"),
        ("q", "Quit"),
    ];

    // Display in 2 columns (4 items each)
    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 4;
        let row = i % 4;
        let cx = x + (col as u16) * 24;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.chars().count() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.cursor_bg),
        Print(&padded),
        SetBackgroundColor(Color::Reset)
    )?;

    Ok(())
}
