//! UI rendering using ratatui
//!
//! One render function per screen:
//! - Setup: mode, level and player list
//! - Intermission: whose turn is next
//! - Playing: headword, numbered options, answer feedback
//! - Summary: ranking and reviewed words
//! - Error: message display

use crate::app::screen::ActiveGame;
use crate::app::{AppCoordinator, Screen, SetupField, SetupForm};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use sinonimoak::GameMode;

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Setup(form) => render_setup(frame, form),
        Screen::Intermission(game) => render_intermission(frame, game),
        Screen::Playing(game) => render_playing(frame, game),
        Screen::Summary { game, notice } => render_summary(frame, game, notice.as_deref()),
        Screen::Error { message } => render_error(frame, message),
    }
}

fn render_setup(frame: &mut Frame, form: &SetupForm) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(1), // Mode
            Constraint::Length(1), // Level
            Constraint::Length(1), // Spacer
            Constraint::Min(4),    // Players
            Constraint::Length(1), // Start
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let title = Paragraph::new("SINONIMOAK")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, layout[0]);

    let mode = match form.mode {
        GameMode::Regular => "Regular",
        GameMode::Daily => "Daily challenge",
    };
    render_setup_row(frame, layout[1], form, SetupField::Mode, &format!("< {} >", mode));
    let level = match form.mode {
        GameMode::Regular => format!("< {} >", form.level),
        GameMode::Daily => "all levels".to_string(),
    };
    render_setup_row(frame, layout[2], form, SetupField::Level, &level);

    // Player list with the name being typed at the bottom
    let mut items: Vec<ListItem> = form
        .players
        .iter()
        .enumerate()
        .map(|(i, name)| ListItem::new(format!("{}. {}", i + 1, name)))
        .collect();
    if form.focus == SetupField::Players {
        items.push(ListItem::new(format!("+ [{}]_", form.name_input)).style(Style::default().fg(Color::Cyan)));
    }
    let border = if form.focus == SetupField::Players {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let players = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!("Players ({}/{})", form.players.len(), form.max_players())),
    );
    frame.render_widget(players, layout[4]);

    render_setup_row(frame, layout[5], form, SetupField::Start, "Press Enter");

    let footer = Paragraph::new("↑↓ Navigate  ←→ Change  Enter Add/Start  Backspace Remove  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[6]);
}

fn render_setup_row(frame: &mut Frame, area: Rect, form: &SetupForm, field: SetupField, value: &str) {
    let selected = form.focus == field;
    let style = if selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let prefix = if selected { "> " } else { "  " };
    let row = Paragraph::new(format!("{}{:<8} {}", prefix, field.label(), value)).style(style);
    frame.render_widget(row, area);
}

fn render_intermission(frame: &mut Frame, game: &ActiveGame) {
    let session = &game.session;
    let name = session.current_player().map(|p| p.name.as_str()).unwrap_or("");

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Percentage(35),
        ])
        .margin(2)
        .split(frame.area());

    let turn = Paragraph::new(format!("{}'s turn", name))
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(turn, layout[1]);

    let detail = Paragraph::new(format!(
        "Player {} of {}  ·  {} questions",
        session.current_player_index() + 1,
        session.players().len(),
        session.questions_per_player()
    ))
    .style(Style::default().fg(Color::White))
    .alignment(Alignment::Center);
    frame.render_widget(detail, layout[2]);

    let hint = Paragraph::new("Press Enter when ready  ·  Esc to leave")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[3]);
}

fn render_playing(frame: &mut Frame, game: &ActiveGame) {
    let session = &game.session;
    let Some(question) = session.current_question() else {
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Headword
            Constraint::Min(6),    // Options
            Constraint::Length(2), // Feedback
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(frame.area());

    render_header(frame, layout[0], game);

    let headword = Paragraph::new(question.word.headword.to_uppercase())
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(headword, layout[1]);

    let answered = session.last_answer();
    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = match answered {
                Some(_) if *option == question.correct_answer => Style::default().fg(Color::Green).bold(),
                Some((_, chosen)) if option.as_str() == chosen => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::DarkGray),
                None => Style::default().fg(Color::White),
            };
            ListItem::new(format!("  {}. {}", i + 1, option)).style(style)
        })
        .collect();
    let options = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Which one is a synonym?"),
    );
    frame.render_widget(options, layout[2]);

    let (feedback, color) = match answered {
        Some((outcome, _)) if outcome.is_correct => (
            format!("Correct! +{} (speed bonus {})", outcome.points, outcome.bonus),
            Color::Green,
        ),
        Some(_) => (format!("Wrong. The answer was {}", question.correct_answer), Color::Red),
        None => (String::new(), Color::White),
    };
    let feedback = Paragraph::new(feedback)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(feedback, layout[3]);

    let keys = if answered.is_some() {
        "Enter Next  Esc Leave game".to_string()
    } else {
        format!("{}  Esc Leave game", answer_keys(question.options.len()))
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[4]);
}

/// Player, progress and score
fn render_header(frame: &mut Frame, area: Rect, game: &ActiveGame) {
    let session = &game.session;
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(16),
            Constraint::Length(14),
        ])
        .split(inner);

    let label = match (session.mode(), session.level(), game.challenge_date) {
        (GameMode::Daily, _, Some(date)) => format!("Daily {}", date),
        (_, Some(level), _) => format!("Level {}", level),
        _ => String::new(),
    };
    let player = session.current_player();
    let name = player.map(|p| p.name.as_str()).unwrap_or("");
    let who = Paragraph::new(format!("{}  ·  {}", name, label)).style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(who, columns[0]);

    let progress = Paragraph::new(format!(
        "{}/{}",
        session.current_question_index() + 1,
        session.questions_per_player()
    ))
    .alignment(Alignment::Center);
    frame.render_widget(progress, columns[1]);

    let score = Paragraph::new(format!("Score: {}", player.map(|p| p.score).unwrap_or(0)))
        .style(Style::default().fg(Color::Magenta).bold())
        .alignment(Alignment::Right);
    frame.render_widget(score, columns[2]);
}

fn render_summary(frame: &mut Frame, game: &ActiveGame, notice: Option<&str>) {
    let session = &game.session;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(6),    // Ranking | words
            Constraint::Length(1), // Notice
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(frame.area());

    let title = Paragraph::new("GAME OVER")
        .style(Style::default().fg(Color::Red).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout[1]);

    let ranking: Vec<ListItem> = session
        .ranking()
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let prefix = match i {
                0 => "🥇",
                1 => "🥈",
                2 => "🥉",
                _ => "  ",
            };
            let style = if i == 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!(
                "{} {} - {} pts, {}/{} right, {}",
                prefix,
                player.name,
                player.score,
                player.correct_answers,
                session.questions_per_player(),
                format_time(player.time_secs)
            ))
            .style(style)
        })
        .collect();
    let ranking = List::new(ranking).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Ranking"),
    );
    frame.render_widget(ranking, columns[0]);

    let review: Vec<Line> = session
        .played_words()
        .iter()
        .map(|word| {
            Line::from(vec![
                Span::styled(word.headword.clone(), Style::default().fg(Color::Cyan).bold()),
                Span::raw(format!(": {}", word.synonyms.join(", "))),
            ])
        })
        .collect();
    let review = Paragraph::new(review).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Words"),
    );
    frame.render_widget(review, columns[1]);

    if let Some(notice) = notice {
        let notice = Paragraph::new(notice)
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center);
        frame.render_widget(notice, layout[2]);
    }

    let footer = Paragraph::new("Enter New game  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

fn render_error(frame: &mut Frame, message: &str) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Percentage(40),
        ])
        .margin(2)
        .split(area);

    let error = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center);
    frame.render_widget(error, layout[1]);

    let hint = Paragraph::new("Press Esc to go back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[2]);
}

/// Digit keys that pick one of `count` options
fn answer_keys(count: usize) -> String {
    match count {
        0 | 1 => "1 Answer".to_string(),
        n => format!("1-{} Answer", n),
    }
}

/// Seconds as m:ss
fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
