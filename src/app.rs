use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};

use crate::config::AdminConfig;
use crate::state::{AppState, Delta, Focus, ProviderCommand, apply_delta};

pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    notice_ttl: Duration,
}

impl App {
    pub fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: &AdminConfig) -> Self {
        Self {
            state: AppState::with_page_size(config.matches_page_size),
            should_quit: false,
            cmd_tx,
            notice_ttl: config.notice_ttl,
        }
    }

    /// Initial load: both lists are requested at once.
    pub fn mount(&mut self) {
        self.request(ProviderCommand::FetchMatches);
        self.request(ProviderCommand::FetchPhases);
    }

    pub fn apply(&mut self, delta: Delta) {
        if let Some(followup) = apply_delta(&mut self.state, delta) {
            self.request(followup);
        }
    }

    pub fn drain(&mut self, rx: &mpsc::Receiver<Delta>) {
        while let Ok(delta) = rx.try_recv() {
            self.apply(delta);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.state.expire_notices(now, self.notice_ttl);
    }

    pub fn request(&mut self, cmd: ProviderCommand) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Backend unavailable");
            return false;
        };
        let label = command_label(&cmd);
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {label} request failed"));
            false
        } else {
            self.state.push_log(format!("[INFO] {label} request sent"));
            true
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if self.state.confirm_delete.is_some() {
            self.on_confirm_key(key);
        } else if self.state.is_registering_phase {
            self.on_phase_form_key(key);
        } else if self.state.is_registering_match {
            self.on_match_form_key(key);
        } else if self.state.is_viewing {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('v') | KeyCode::Char('b')
            ) {
                self.close_view();
            }
        } else {
            self.on_table_key(key);
        }
    }

    fn on_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Tab => self.state.toggle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char(']') | KeyCode::PageDown => self.state.next_match_page(),
            KeyCode::Char('[') | KeyCode::PageUp => self.state.prev_match_page(),
            KeyCode::Char('v') | KeyCode::Enter => self.view_selected(),
            KeyCode::Char('x') | KeyCode::Delete => self.ask_delete_selected(),
            KeyCode::Char('P') => self.open_register_phase(),
            KeyCode::Char('M') => self.open_register_match(),
            KeyCode::Char('r') => {
                self.request(ProviderCommand::FetchMatches);
                self.request(ProviderCommand::FetchPhases);
            }
            _ => {}
        }
    }

    pub fn view_selected(&mut self) {
        if self.state.focus != Focus::Matches {
            return;
        }
        let Some(selected) = self.state.selected_match().cloned() else {
            self.state.push_log("[INFO] No match selected");
            return;
        };
        self.state.viewing_match = Some(selected);
        self.state.is_viewing = true;
    }

    /// Hides the detail modal. The viewed match is kept until the next view.
    pub fn close_view(&mut self) {
        self.state.is_viewing = false;
    }

    pub fn ask_delete_selected(&mut self) {
        if self.state.focus != Focus::Matches {
            return;
        }
        self.state.confirm_delete = self.state.selected_match().cloned();
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.confirm_delete = None;
            }
            _ => {}
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.state.confirm_delete.take() else {
            return;
        };
        self.request(ProviderCommand::DeleteMatch {
            match_id: target.id,
        });
    }

    pub fn open_register_phase(&mut self) {
        self.state.is_registering_phase = true;
    }

    /// The match form needs the tournament's teams, so opening it loads them.
    pub fn open_register_match(&mut self) {
        self.state.is_registering_match = true;
        self.request(ProviderCommand::FetchTeams);
    }

    fn on_phase_form_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.phase_form;
        match key.code {
            KeyCode::Esc => self.state.is_registering_phase = false,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input(c),
            KeyCode::Enter => {
                if let Some(phase) = form.submit() {
                    self.request(ProviderCommand::RegisterPhase(phase));
                }
            }
            _ => {}
        }
    }

    fn on_match_form_key(&mut self, key: KeyEvent) {
        let state = &mut self.state;
        match key.code {
            KeyCode::Esc => state.is_registering_match = false,
            KeyCode::Tab | KeyCode::Down => state.match_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => state.match_form.prev_field(),
            KeyCode::Right => state.match_form.cycle(&state.teams, &state.phases, true),
            KeyCode::Left => state.match_form.cycle(&state.teams, &state.phases, false),
            KeyCode::Backspace => state.match_form.backspace(),
            KeyCode::Char(c) => state.match_form.input(c),
            KeyCode::Enter => {
                if let Some(new_match) = state.match_form.submit() {
                    self.request(ProviderCommand::RegisterMatch(new_match));
                }
            }
            _ => {}
        }
    }
}

fn command_label(cmd: &ProviderCommand) -> &'static str {
    match cmd {
        ProviderCommand::FetchMatches => "Matches",
        ProviderCommand::FetchPhases => "Phases",
        ProviderCommand::FetchTeams => "Teams",
        ProviderCommand::DeleteMatch { .. } => "Delete match",
        ProviderCommand::RegisterPhase(_) => "Register phase",
        ProviderCommand::RegisterMatch(_) => "Register match",
    }
}
