//! Rendering of the quiz board with `ratatui`.
//!
//! Drawing only reads from the controller; all changes go through commands.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::controller::Controller;
use crate::game::{PlaybackStatus, Team, format_timer};
use crate::playback::TrackInfo;

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Key help for the footer. Buzz keys depend on the number of teams.
fn controls_text(teams: usize) -> String {
    let buzz = match teams {
        0 => None,
        1 => Some("[1] buzz".to_string()),
        n => Some(format!("[1-{n}] buzz")),
    };
    buzz.into_iter()
        .chain(
            [
                "[enter/l] next song",
                "[space/p] pause/resume",
                "[y/n] correct/incorrect",
                "[+/-] playback time",
                "[r] reload songs",
                "[d] songs directory",
                "[q] quit",
            ]
            .map(String::from),
        )
        .collect::<Vec<String>>()
        .join(" | ")
}

fn song_text(info: Option<&TrackInfo>) -> String {
    match info {
        Some(TrackInfo {
            name,
            artist: Some(artist),
        }) => format!("{name} - {artist}"),
        Some(TrackInfo { name, artist: None }) => name.clone(),
        None => "-".to_string(),
    }
}

fn status_text(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Stopped => "Stopped",
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
    }
}

fn team_line(team: &Team, guessing: bool) -> String {
    let marker = if guessing { ">" } else { " " };
    format!("{marker} [{}] {:<20} {:>6}", team.index + 1, team.name, team.score)
}

/// Render the whole board. `notice` is the last operator message, if any.
pub fn draw(frame: &mut Frame, controller: &Controller, notice: Option<&str>) {
    let game = controller.game();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new("Press a team key when you know the song")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" buzzquiz ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let now_playing = controller.now_playing();
    let mut parts = vec![
        format!("Song: {}", song_text(now_playing.as_ref())),
        status_text(game.status()).to_string(),
        format!("Backend: {}", controller.backend()),
    ];
    if controller.can_start_next() {
        parts.push(format!("Songs left: {}", controller.queue_len()));
    }
    let status = Paragraph::new(parts.join(" • "))
        .block(Block::bordered().padding(LEFT_PAD).title(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Timer
    let progress = game.progress();
    let gauge_color = match game.status() {
        PlaybackStatus::Playing => Color::Green,
        PlaybackStatus::Paused => Color::Yellow,
        PlaybackStatus::Stopped => Color::DarkGray,
    };
    let gauge = Gauge::default()
        .block(Block::bordered().title(" timer "))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(progress.fraction)
        .label(format!(
            "{} / {}",
            format_timer(progress.elapsed_ms),
            format_timer(game.duration_ms())
        ));
    frame.render_widget(gauge, chunks[2]);

    // Teams
    let guessing = game.guessing_team();
    let items: Vec<ListItem> = game
        .teams()
        .iter()
        .map(|team| {
            let is_guessing = guessing == Some(team.index);
            let item = ListItem::new(team_line(team, is_guessing));
            if is_guessing {
                item.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                item
            }
        })
        .collect();
    let title = match guessing.and_then(|i| game.teams().get(i)) {
        Some(team) => format!(" teams ({} is guessing: y/n) ", team.name),
        None => " teams ".to_string(),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, chunks[3]);

    let notice_par = Paragraph::new(notice.unwrap_or(""))
        .bold()
        .block(Block::bordered().padding(LEFT_PAD).title(" notice "))
        .wrap(Wrap { trim: true });
    frame.render_widget(notice_par, chunks[4]);

    let footer = Paragraph::new(controls_text(game.teams().len()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
