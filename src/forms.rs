//! Register-phase and register-match forms hosted by the matches screen.
//!
//! Each form owns its field buffers and its own validation. The screen only
//! opens the form, forwards keys and sends what `submit` hands back.

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use crate::state::{NewMatch, NewPhase, Phase, Team};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

pub fn parse_form_date(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn validate_range(start: &str, end: &str) -> Result<(String, String)> {
    let Some(start_at) = parse_form_date(start) else {
        bail!("Start date must look like YYYY-MM-DD or YYYY-MM-DD HH:MM");
    };
    let Some(end_at) = parse_form_date(end) else {
        bail!("End date must look like YYYY-MM-DD or YYYY-MM-DD HH:MM");
    };
    if end_at < start_at {
        bail!("End date is before start date");
    }
    Ok((start.trim().to_string(), end.trim().to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseField {
    #[default]
    Name,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseForm {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub field: PhaseField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl PhaseForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            PhaseField::Name => PhaseField::StartDate,
            PhaseField::StartDate => PhaseField::EndDate,
            PhaseField::EndDate => PhaseField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.field = match self.field {
            PhaseField::Name => PhaseField::EndDate,
            PhaseField::StartDate => PhaseField::Name,
            PhaseField::EndDate => PhaseField::StartDate,
        };
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            PhaseField::Name => &mut self.name,
            PhaseField::StartDate => &mut self.start_date,
            PhaseField::EndDate => &mut self.end_date,
        }
    }

    pub fn input(&mut self, c: char) {
        if self.submitting {
            return;
        }
        self.buffer_mut().push(c);
    }

    pub fn backspace(&mut self) {
        if self.submitting {
            return;
        }
        self.buffer_mut().pop();
    }

    pub fn validate(&self) -> Result<NewPhase> {
        let name = self.name.trim();
        if name.is_empty() {
            bail!("Phase name is required");
        }
        let (start_date, end_date) = validate_range(&self.start_date, &self.end_date)?;
        Ok(NewPhase {
            name: name.to_string(),
            start_date,
            end_date,
        })
    }

    /// Returns the request to send, or `None` when a submit is already in
    /// flight or the fields do not validate (the reason lands in `error`).
    pub fn submit(&mut self) -> Option<NewPhase> {
        if self.submitting {
            return None;
        }
        match self.validate() {
            Ok(phase) => {
                self.submitting = true;
                self.error = None;
                Some(phase)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchField {
    #[default]
    TeamA,
    TeamB,
    Phase,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Default)]
pub struct MatchForm {
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub phase: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub field: MatchField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl MatchForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            MatchField::TeamA => MatchField::TeamB,
            MatchField::TeamB => MatchField::Phase,
            MatchField::Phase => MatchField::StartDate,
            MatchField::StartDate => MatchField::EndDate,
            MatchField::EndDate => MatchField::TeamA,
        };
    }

    pub fn prev_field(&mut self) {
        self.field = match self.field {
            MatchField::TeamA => MatchField::EndDate,
            MatchField::TeamB => MatchField::TeamA,
            MatchField::Phase => MatchField::TeamB,
            MatchField::StartDate => MatchField::Phase,
            MatchField::EndDate => MatchField::StartDate,
        };
    }

    /// Steps the picker under the cursor. Teams wrap around the list; the
    /// phase picker also passes through "no phase".
    pub fn cycle(&mut self, teams: &[Team], phases: &[Phase], forward: bool) {
        if self.submitting {
            return;
        }
        let team_ids: Vec<&str> = teams.iter().map(|t| t.id.as_str()).collect();
        let phase_ids: Vec<&str> = phases.iter().map(|p| p.id.as_str()).collect();
        match self.field {
            MatchField::TeamA => self.team_a = cycle_required(&team_ids, self.team_a.as_deref(), forward),
            MatchField::TeamB => self.team_b = cycle_required(&team_ids, self.team_b.as_deref(), forward),
            MatchField::Phase => {
                self.phase = cycle_optional(&phase_ids, self.phase.as_deref(), forward)
            }
            MatchField::StartDate | MatchField::EndDate => {}
        }
    }

    pub fn input(&mut self, c: char) {
        if self.submitting {
            return;
        }
        match self.field {
            MatchField::StartDate => self.start_date.push(c),
            MatchField::EndDate => self.end_date.push(c),
            MatchField::TeamA | MatchField::TeamB | MatchField::Phase => {}
        }
    }

    pub fn backspace(&mut self) {
        if self.submitting {
            return;
        }
        match self.field {
            MatchField::StartDate => {
                self.start_date.pop();
            }
            MatchField::EndDate => {
                self.end_date.pop();
            }
            MatchField::TeamA | MatchField::TeamB | MatchField::Phase => {}
        }
    }

    pub fn forget_teams_if_missing(&mut self, teams: &[Team]) {
        let known = |id: &Option<String>| {
            id.as_ref()
                .is_some_and(|id| teams.iter().any(|t| &t.id == id))
        };
        if !known(&self.team_a) {
            self.team_a = None;
        }
        if !known(&self.team_b) {
            self.team_b = None;
        }
    }

    pub fn forget_phase_if_missing(&mut self, phases: &[Phase]) {
        if let Some(id) = &self.phase {
            if !phases.iter().any(|p| &p.id == id) {
                self.phase = None;
            }
        }
    }

    pub fn validate(&self) -> Result<NewMatch> {
        let (Some(team_a), Some(team_b)) = (&self.team_a, &self.team_b) else {
            bail!("Pick both teams");
        };
        if team_a == team_b {
            bail!("A team cannot play itself");
        }
        let (start_date, end_date) = validate_range(&self.start_date, &self.end_date)?;
        Ok(NewMatch {
            team_a: team_a.clone(),
            team_b: team_b.clone(),
            phase: self.phase.clone(),
            start_date,
            end_date,
        })
    }

    pub fn submit(&mut self) -> Option<NewMatch> {
        if self.submitting {
            return None;
        }
        match self.validate() {
            Ok(new_match) => {
                self.submitting = true;
                self.error = None;
                Some(new_match)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

fn cycle_required(ids: &[&str], current: Option<&str>, forward: bool) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let pos = current.and_then(|id| ids.iter().position(|candidate| *candidate == id));
    let next = match (pos, forward) {
        (None, true) => 0,
        (None, false) => ids.len() - 1,
        (Some(pos), true) => (pos + 1) % ids.len(),
        (Some(0), false) => ids.len() - 1,
        (Some(pos), false) => pos - 1,
    };
    Some(ids[next].to_string())
}

fn cycle_optional(ids: &[&str], current: Option<&str>, forward: bool) -> Option<String> {
    let pos = current.and_then(|id| ids.iter().position(|candidate| *candidate == id));
    let next = match (pos, forward) {
        (None, true) => ids.first(),
        (None, false) => ids.last(),
        (Some(pos), true) => ids.get(pos + 1),
        (Some(0), false) => None,
        (Some(pos), false) => ids.get(pos - 1),
    };
    next.map(|id| id.to_string())
}
