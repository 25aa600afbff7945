#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reqwest::StatusCode;
use tournament_admin::api::{ApiReply, TournamentBackend};
use tournament_admin::app::App;
use tournament_admin::session::{Session, SessionStore};
use tournament_admin::state::{AppState, Delta, Match, NewMatch, NewPhase, Phase, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Reject(StatusCode),
    Transport,
}

fn reply<T>(outcome: Outcome, value: impl FnOnce() -> T) -> Result<ApiReply<T>> {
    match outcome {
        Outcome::Accept => Ok(ApiReply::Success(value())),
        Outcome::Reject(status) => Ok(ApiReply::Failure { status }),
        Outcome::Transport => Err(anyhow!("connection refused")),
    }
}

/// In-memory stand-in for the tournament REST backend.
pub struct FakeBackend {
    pub matches: Mutex<Vec<Match>>,
    pub phases: Mutex<Vec<Phase>>,
    pub teams: Vec<Team>,
    pub list_outcome: Mutex<Outcome>,
    pub delete_outcome: Mutex<Outcome>,
    pub create_outcome: Mutex<Outcome>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(matches: Vec<Match>, phases: Vec<Phase>, teams: Vec<Team>) -> Self {
        Self {
            matches: Mutex::new(matches),
            phases: Mutex::new(phases),
            teams,
            list_outcome: Mutex::new(Outcome::Accept),
            delete_outcome: Mutex::new(Outcome::Accept),
            create_outcome: Mutex::new(Outcome::Accept),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn seeded() -> Self {
        Self::new(
            vec![
                sample_match("m1", "Lions", "Tigers"),
                sample_match("m2", "Bears", "Wolves"),
                sample_match("m3", "Eagles", "Hawks"),
            ],
            vec![sample_phase("p1", "Group Stage")],
            vec![team("t1", "Lions"), team("t2", "Tigers"), team("t3", "Bears")],
        )
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn team_named(&self, id: &str) -> Team {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .unwrap_or_else(|| team(id, id))
    }
}

impl TournamentBackend for FakeBackend {
    fn list_matches(&self, tournament_id: &str, token: Option<&str>) -> Result<ApiReply<Vec<Match>>> {
        self.record(format!("list_matches {tournament_id} {token:?}"));
        let outcome = *self.list_outcome.lock().expect("outcome lock");
        reply(outcome, || self.matches.lock().expect("matches lock").clone())
    }

    fn list_phases(&self, tournament_id: &str, token: Option<&str>) -> Result<ApiReply<Vec<Phase>>> {
        self.record(format!("list_phases {tournament_id} {token:?}"));
        let outcome = *self.list_outcome.lock().expect("outcome lock");
        reply(outcome, || self.phases.lock().expect("phases lock").clone())
    }

    fn list_teams(&self, tournament_id: &str, token: Option<&str>) -> Result<ApiReply<Vec<Team>>> {
        self.record(format!("list_teams {tournament_id} {token:?}"));
        let outcome = *self.list_outcome.lock().expect("outcome lock");
        reply(outcome, || self.teams.clone())
    }

    fn delete_match(&self, match_id: &str, token: Option<&str>) -> Result<ApiReply<()>> {
        self.record(format!("delete_match {match_id} {token:?}"));
        let outcome = *self.delete_outcome.lock().expect("outcome lock");
        reply(outcome, || {
            self.matches
                .lock()
                .expect("matches lock")
                .retain(|m| m.id != match_id);
        })
    }

    fn create_phase(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        phase: &NewPhase,
    ) -> Result<ApiReply<()>> {
        self.record(format!("create_phase {tournament_id} {token:?}"));
        let outcome = *self.create_outcome.lock().expect("outcome lock");
        reply(outcome, || {
            let mut phases = self.phases.lock().expect("phases lock");
            let id = format!("p{}", phases.len() + 1);
            phases.push(Phase {
                id,
                name: phase.name.clone(),
                start_date: phase.start_date.clone(),
                end_date: phase.end_date.clone(),
            });
        })
    }

    fn create_match(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        new_match: &NewMatch,
    ) -> Result<ApiReply<()>> {
        self.record(format!("create_match {tournament_id} {token:?}"));
        let outcome = *self.create_outcome.lock().expect("outcome lock");
        reply(outcome, || {
            let team_a = self.team_named(&new_match.team_a);
            let team_b = self.team_named(&new_match.team_b);
            let mut matches = self.matches.lock().expect("matches lock");
            let id = format!("m{}", matches.len() + 1);
            matches.push(Match {
                id,
                team_a,
                team_b,
                start_date: new_match.start_date.clone(),
                end_date: new_match.end_date.clone(),
                goals: String::new(),
            });
        })
    }
}

pub fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn sample_match(id: &str, home: &str, away: &str) -> Match {
    Match {
        id: id.to_string(),
        team_a: team(&format!("{id}-a"), home),
        team_b: team(&format!("{id}-b"), away),
        start_date: "2026-06-11 18:00".to_string(),
        end_date: "2026-06-11 20:00".to_string(),
        goals: "1-0".to_string(),
    }
}

pub fn sample_phase(id: &str, name: &str) -> Phase {
    Phase {
        id: id.to_string(),
        name: name.to_string(),
        start_date: "2026-06-11".to_string(),
        end_date: "2026-06-27".to_string(),
    }
}

pub fn session(tournament_id: Option<&str>, token: Option<&str>) -> SessionStore {
    SessionStore::Fixed(Session {
        selected_tournament_id: tournament_id.map(str::to_string),
        token: token.map(str::to_string),
    })
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.on_key(key(KeyCode::Char(c)));
    }
}

/// Applies worker results until `done` holds. Panics after two quiet seconds.
pub fn pump_until(app: &mut App, rx: &Receiver<Delta>, done: impl Fn(&AppState) -> bool) {
    while !done(&app.state) {
        let delta = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("worker should answer in time");
        app.apply(delta);
    }
}
