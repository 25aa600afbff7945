use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::forms::{MatchForm, PhaseForm};

const MAX_LOGS: usize = 200;
const MAX_NOTICES: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "_id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(alias = "_id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub team_a: Team,
    #[serde(default)]
    pub team_b: Team,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub goals: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    #[serde(alias = "_id", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
}

/// Body of `POST /tournaments/{id}/phases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhase {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

/// Body of `POST /tournaments/{id}/matches`. Teams and phase are sent as ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub team_a: String,
    pub team_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

// Backends disagree on whether ids and goals are strings or numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Phases,
    Matches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    Phase,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub raised_at: Instant,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub focus: Focus,
    pub phases: Vec<Phase>,
    pub phase_selected: usize,
    pub matches: Vec<Match>,
    pub match_selected: usize,
    pub matches_page_size: usize,
    pub teams: Vec<Team>,
    pub viewing_match: Option<Match>,
    pub is_viewing: bool,
    pub is_registering_phase: bool,
    pub is_registering_match: bool,
    pub confirm_delete: Option<Match>,
    pub phase_form: PhaseForm,
    pub match_form: MatchForm,
    pub notices: VecDeque<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(matches_page_size: usize) -> Self {
        Self {
            focus: Focus::Matches,
            phases: Vec::new(),
            phase_selected: 0,
            matches: Vec::new(),
            match_selected: 0,
            matches_page_size: matches_page_size.max(1),
            teams: Vec::new(),
            viewing_match: None,
            is_viewing: false,
            is_registering_phase: false,
            is_registering_match: false,
            confirm_delete: None,
            phase_form: PhaseForm::default(),
            match_form: MatchForm::default(),
            notices: VecDeque::new(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// True while any modal or prompt captures the keyboard.
    pub fn modal_open(&self) -> bool {
        self.is_viewing
            || self.is_registering_phase
            || self.is_registering_match
            || self.confirm_delete.is_some()
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.match_selected)
    }

    pub fn selected_phase(&self) -> Option<&Phase> {
        self.phases.get(self.phase_selected)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Phases => Focus::Matches,
            Focus::Matches => Focus::Phases,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Phases => self.phase_selected = wrap_next(self.phase_selected, self.phases.len()),
            Focus::Matches => {
                self.match_selected = wrap_next(self.match_selected, self.matches.len())
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::Phases => self.phase_selected = wrap_prev(self.phase_selected, self.phases.len()),
            Focus::Matches => {
                self.match_selected = wrap_prev(self.match_selected, self.matches.len())
            }
        }
    }

    pub fn match_page(&self) -> usize {
        self.match_selected / self.matches_page_size
    }

    pub fn match_page_count(&self) -> usize {
        self.matches.len().div_ceil(self.matches_page_size).max(1)
    }

    /// Index range of `matches` shown on the current page.
    pub fn match_page_range(&self) -> Range<usize> {
        let start = (self.match_page() * self.matches_page_size).min(self.matches.len());
        let end = (start + self.matches_page_size).min(self.matches.len());
        start..end
    }

    pub fn next_match_page(&mut self) {
        let page = self.match_page();
        if page + 1 < self.match_page_count() {
            self.match_selected = (page + 1) * self.matches_page_size;
        }
    }

    pub fn prev_match_page(&mut self) {
        let page = self.match_page();
        if page > 0 {
            self.match_selected = (page - 1) * self.matches_page_size;
        }
    }

    pub fn clamp_selection(&mut self) {
        self.phase_selected = clamp_index(self.phase_selected, self.phases.len());
        self.match_selected = clamp_index(self.match_selected, self.matches.len());
    }

    fn reselect_match(&mut self, selected_id: Option<String>) {
        if let Some(id) = selected_id {
            if let Some(pos) = self.matches.iter().position(|m| m.id == id) {
                self.match_selected = pos;
                return;
            }
        }
        self.match_selected = clamp_index(self.match_selected, self.matches.len());
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let text = text.into();
        let prefix = match level {
            NoticeLevel::Info => "[INFO]",
            NoticeLevel::Success => "[OK]",
            NoticeLevel::Error => "[ERROR]",
        };
        self.push_log(format!("{prefix} {text}"));
        self.notices.push_back(Notice {
            level,
            text,
            raised_at: Instant::now(),
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    pub fn expire_notices(&mut self, now: Instant, ttl: Duration) {
        self.notices
            .retain(|notice| now.saturating_duration_since(notice.raised_at) < ttl);
    }

    pub fn has_error_notice(&self, text: &str) -> bool {
        self.notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.text == text)
    }
}

fn wrap_next(selected: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (selected + 1) % total
}

fn wrap_prev(selected: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    if selected == 0 { total - 1 } else { selected - 1 }
}

fn clamp_index(selected: usize, total: usize) -> usize {
    if total == 0 { 0 } else { selected.min(total - 1) }
}

/// Results coming back from the provider thread.
#[derive(Debug, Clone)]
pub enum Delta {
    SetMatches(Vec<Match>),
    SetPhases(Vec<Phase>),
    SetTeams(Vec<Team>),
    MatchDeleted { id: String },
    Registered(RegistrationKind),
    RegistrationFailed {
        kind: RegistrationKind,
        message: String,
    },
    Notice {
        level: NoticeLevel,
        text: String,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchMatches,
    FetchPhases,
    FetchTeams,
    DeleteMatch { match_id: String },
    RegisterPhase(NewPhase),
    RegisterMatch(NewMatch),
}

/// Applies a provider result. Returns the follow-up request the screen owes
/// the backend, if any (a registration completing means the matching list is
/// stale).
pub fn apply_delta(state: &mut AppState, delta: Delta) -> Option<ProviderCommand> {
    match delta {
        Delta::SetMatches(matches) => {
            let selected_id = state.selected_match().map(|m| m.id.clone());
            state.matches = matches;
            state.reselect_match(selected_id);
            None
        }
        Delta::SetPhases(phases) => {
            state.phases = phases;
            state.phase_selected = clamp_index(state.phase_selected, state.phases.len());
            state.match_form.forget_phase_if_missing(&state.phases);
            None
        }
        Delta::SetTeams(teams) => {
            state.teams = teams;
            state.match_form.forget_teams_if_missing(&state.teams);
            None
        }
        Delta::MatchDeleted { id } => {
            state.matches.retain(|m| m.id != id);
            state.match_selected = clamp_index(state.match_selected, state.matches.len());
            state.push_notice(NoticeLevel::Success, "Match deleted successfully!");
            None
        }
        Delta::Registered(RegistrationKind::Phase) => {
            state.is_registering_phase = false;
            state.phase_form.reset();
            state.push_notice(NoticeLevel::Success, "Phase registered");
            Some(ProviderCommand::FetchPhases)
        }
        Delta::Registered(RegistrationKind::Match) => {
            state.is_registering_match = false;
            state.match_form.reset();
            state.push_notice(NoticeLevel::Success, "Match registered");
            Some(ProviderCommand::FetchMatches)
        }
        Delta::RegistrationFailed { kind, message } => {
            match kind {
                RegistrationKind::Phase => state.phase_form.fail(message.clone()),
                RegistrationKind::Match => state.match_form.fail(message.clone()),
            }
            state.push_notice(NoticeLevel::Error, message);
            None
        }
        Delta::Notice { level, text } => {
            state.push_notice(level, text);
            None
        }
        Delta::Log(msg) => {
            state.push_log(msg);
            None
        }
    }
}
