use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::forms::{MatchField, PhaseField};
use crate::state::{AppState, Focus, Match, NoticeLevel, Team};

pub fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    render_phases(frame, body[0], state);
    render_matches(frame, body[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    let area = frame.size();
    if state.is_viewing {
        render_match_detail(frame, area, state);
    }
    if state.is_registering_phase {
        render_phase_form(frame, area, state);
    }
    if state.is_registering_match {
        render_match_form(frame, area, state);
    }
    if let Some(target) = &state.confirm_delete {
        render_confirm_delete(frame, area, target);
    }
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
    render_notices(frame, area, state);
}

fn header_text(state: &AppState) -> String {
    let title = format!(
        "TOURNAMENT ADMIN | Phases: {} | Matches: {}",
        state.phases.len(),
        state.matches.len()
    );
    let line1 = format!("  .-.  {title}");
    let line2 = " /___\\".to_string();
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.confirm_delete.is_some() {
        "y/Enter Delete | n/Esc Cancel".to_string()
    } else if state.is_registering_phase || state.is_registering_match {
        "Tab/↓ Next field | Shift-Tab/↑ Prev | ←/→ Choose | Enter Save | Esc Cancel".to_string()
    } else if state.is_viewing {
        "Esc/Enter Close".to_string()
    } else {
        "Tab Focus | j/k Move | [/] Page | Enter/v View | x Delete | P New phase | M New match | r Refresh | ? Help | q Quit".to_string()
    }
}

fn table_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn highlight_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

fn render_phases(frame: &mut Frame, area: Rect, state: &AppState) {
    let header = Row::new(["Name", "Start Date", "End Date"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = state.phases.iter().map(|phase| {
        Row::new([
            phase.name.clone(),
            phase.start_date.clone(),
            phase.end_date.clone(),
        ])
    });
    let widths = [
        Constraint::Min(20),
        Constraint::Length(20),
        Constraint::Length(20),
    ];
    let focused = state.focus == Focus::Phases;
    let table = Table::new(rows, widths)
        .header(header)
        .block(table_block(format!("Phases ({})", state.phases.len()), focused))
        .highlight_style(highlight_style());

    let mut table_state = TableState::default();
    if focused && !state.phases.is_empty() {
        table_state.select(Some(state.phase_selected));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let header = Row::new(["Team A", "Team B", "Start Date", "Goals", "Actions"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let range = state.match_page_range();
    let page_start = range.start;
    let rows = state.matches[range].iter().map(|m| {
        Row::new([
            m.team_a.name.clone(),
            m.team_b.name.clone(),
            m.start_date.clone(),
            m.goals.clone(),
            "v view  x delete".to_string(),
        ])
    });
    let widths = [
        Constraint::Min(14),
        Constraint::Min(14),
        Constraint::Length(20),
        Constraint::Length(8),
        Constraint::Length(17),
    ];
    let focused = state.focus == Focus::Matches;
    let title = format!(
        "Matches ({}) page {}/{}",
        state.matches.len(),
        state.match_page() + 1,
        state.match_page_count()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(table_block(title, focused))
        .highlight_style(highlight_style());

    let mut table_state = TableState::default();
    if focused && !state.matches.is_empty() {
        table_state.select(Some(state.match_selected - page_start));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the match detail modal, one labelled line per field.
pub fn match_detail_text(m: &Match) -> String {
    [
        format!("Team A:     {}", m.team_a.name),
        format!("Team B:     {}", m.team_b.name),
        format!("Start Date: {}", m.start_date),
        format!("End Date:   {}", m.end_date),
        format!("Goals:      {}", m.goals),
    ]
    .join("\n")
}

fn render_match_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);
    let text = state
        .viewing_match
        .as_ref()
        .map(match_detail_text)
        .unwrap_or_default();
    let detail = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Match Details").borders(Borders::ALL));
    frame.render_widget(detail, popup);
}

fn render_confirm_delete(frame: &mut Frame, area: Rect, target: &Match) {
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);
    let text = format!(
        "Are you sure you want to delete this match?\n\n{} vs {}\n\n[y] Yes    [n] No",
        target.team_a.name, target.team_b.name
    );
    let prompt = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Delete Match").borders(Borders::ALL));
    frame.render_widget(prompt, popup);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::styled(format!("{marker}{label:<12}{value}"), style)
}

fn form_status_lines(submitting: bool, error: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::raw("")];
    if submitting {
        lines.push(Line::styled("Saving...", Style::default().fg(Color::Yellow)));
    }
    if let Some(err) = error {
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    lines
}

fn render_phase_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);
    let form = &state.phase_form;
    let mut lines = vec![
        field_line("Name", &form.name, form.field == PhaseField::Name),
        field_line("Start Date", &form.start_date, form.field == PhaseField::StartDate),
        field_line("End Date", &form.end_date, form.field == PhaseField::EndDate),
    ];
    lines.extend(form_status_lines(form.submitting, form.error.as_deref()));
    let widget = Paragraph::new(lines)
        .block(Block::default().title("Register New Phase").borders(Borders::ALL));
    frame.render_widget(widget, popup);
}

fn team_label(teams: &[Team], id: Option<&str>) -> String {
    match id {
        Some(id) => teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string()),
        None if teams.is_empty() => "(loading teams)".to_string(),
        None => "(choose)".to_string(),
    }
}

fn render_match_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);
    let form = &state.match_form;
    let phase = match &form.phase {
        Some(id) => state
            .phases
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.clone()),
        None => "(none)".to_string(),
    };
    let picker = |value: String| format!("◀ {value} ▶");
    let mut lines = vec![
        field_line(
            "Team A",
            &picker(team_label(&state.teams, form.team_a.as_deref())),
            form.field == MatchField::TeamA,
        ),
        field_line(
            "Team B",
            &picker(team_label(&state.teams, form.team_b.as_deref())),
            form.field == MatchField::TeamB,
        ),
        field_line("Phase", &picker(phase), form.field == MatchField::Phase),
        field_line("Start Date", &form.start_date, form.field == MatchField::StartDate),
        field_line("End Date", &form.end_date, form.field == MatchField::EndDate),
    ];
    lines.extend(form_status_lines(form.submitting, form.error.as_deref()));
    let widget = Paragraph::new(lines)
        .block(Block::default().title("Register New Match").borders(Borders::ALL));
    frame.render_widget(widget, popup);
}

fn render_notices(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.notices.is_empty() || area.width < 20 {
        return;
    }
    let width = 48.min(area.width);
    let height = (state.notices.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };
    let lines: Vec<Line> = state
        .notices
        .iter()
        .map(|notice| {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            Line::styled(notice.text.clone(), Style::default().fg(color))
        })
        .collect();
    frame.render_widget(Clear, popup);
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Tournament Admin - Help",
        "",
        "Tables:",
        "  Tab          Switch phases / matches",
        "  j/k or ↑/↓   Move",
        "  [ / ]        Previous / next match page",
        "  Enter / v    View match",
        "  x / Del      Delete match",
        "  P            Register phase",
        "  M            Register match",
        "  r            Refresh lists",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Forms:",
        "  Tab / ↑ / ↓  Move between fields",
        "  ← / →        Pick team or phase",
        "  Enter        Save",
        "  Esc          Cancel",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
