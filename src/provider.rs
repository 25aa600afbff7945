use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::Result;

use crate::api::{ApiReply, TournamentBackend};
use crate::session::SessionStore;
use crate::state::{Delta, NoticeLevel, ProviderCommand, RegistrationKind};

const NO_TOURNAMENT: &str = "No tournament ID found";
const MIN_WORKERS: usize = 2;
const MAX_WORKERS: usize = 32;

/// Starts the worker that executes backend commands off the UI thread.
///
/// Commands run on a dedicated pool of `workers` threads, never fewer than
/// two, and finish in whatever order the server answers. Nothing is cancelled or
/// de-duplicated. The worker stops once every command sender is dropped.
pub fn spawn_provider<B>(
    backend: Arc<B>,
    session: SessionStore,
    workers: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()>
where
    B: TournamentBackend + ?Sized + 'static,
{
    thread::spawn(move || {
        let pool = build_request_pool(workers);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Request pool unavailable, using one thread per request".to_string(),
            ));
        }
        let session = Arc::new(session);
        for cmd in cmd_rx {
            let backend = Arc::clone(&backend);
            let session = Arc::clone(&session);
            let tx = tx.clone();
            let job = move || run_command(backend.as_ref(), &session, cmd, &tx);
            match pool.as_ref() {
                Some(pool) => pool.spawn(job),
                None => {
                    thread::spawn(job);
                }
            }
        }
    })
}

fn build_request_pool(workers: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.clamp(MIN_WORKERS, MAX_WORKERS))
        .thread_name(|idx| format!("tournament-request-{idx}"))
        .build()
        .ok()
}

/// Executes one command to completion and reports through `tx`.
pub fn run_command<B>(backend: &B, session: &SessionStore, cmd: ProviderCommand, tx: &Sender<Delta>)
where
    B: TournamentBackend + ?Sized,
{
    // Storage is read per request, like the surrounding app expects.
    let session = session.load();
    let token = session.token();

    match cmd {
        ProviderCommand::FetchMatches => {
            let Some(tournament_id) = session.tournament_id() else {
                notice_error(tx, NO_TOURNAMENT);
                return;
            };
            report_list(
                tx,
                "matches",
                backend
                    .list_matches(tournament_id, token)
                    .and_then(ApiReply::escalate),
                Delta::SetMatches,
            );
        }
        ProviderCommand::FetchPhases => {
            let Some(tournament_id) = session.tournament_id() else {
                notice_error(tx, NO_TOURNAMENT);
                return;
            };
            report_list(
                tx,
                "phases",
                backend
                    .list_phases(tournament_id, token)
                    .and_then(ApiReply::escalate),
                Delta::SetPhases,
            );
        }
        ProviderCommand::FetchTeams => {
            let Some(tournament_id) = session.tournament_id() else {
                notice_error(tx, NO_TOURNAMENT);
                return;
            };
            report_list(
                tx,
                "teams",
                backend
                    .list_teams(tournament_id, token)
                    .and_then(ApiReply::escalate),
                Delta::SetTeams,
            );
        }
        ProviderCommand::DeleteMatch { match_id } => match backend
            .delete_match(&match_id, token)
            .and_then(ApiReply::escalate)
        {
            Ok(ApiReply::Success(())) => {
                let _ = tx.send(Delta::Log(format!("[INFO] Deleted match {match_id}")));
                let _ = tx.send(Delta::MatchDeleted { id: match_id });
            }
            Ok(ApiReply::Failure { status }) => {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] DELETE match {match_id} answered {status}"
                )));
                notice_error(tx, "Failed to delete match");
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] DELETE match {match_id} error: {err:#}"
                )));
                notice_error(tx, format!("Failed to delete match: {err:#}"));
            }
        },
        ProviderCommand::RegisterPhase(phase) => {
            let Some(tournament_id) = session.tournament_id() else {
                registration_failed(tx, RegistrationKind::Phase, NO_TOURNAMENT.to_string());
                return;
            };
            report_registration(
                tx,
                RegistrationKind::Phase,
                backend.create_phase(tournament_id, token, &phase),
            );
        }
        ProviderCommand::RegisterMatch(new_match) => {
            let Some(tournament_id) = session.tournament_id() else {
                registration_failed(tx, RegistrationKind::Match, NO_TOURNAMENT.to_string());
                return;
            };
            report_registration(
                tx,
                RegistrationKind::Match,
                backend.create_match(tournament_id, token, &new_match),
            );
        }
    }
}

fn report_list<T>(
    tx: &Sender<Delta>,
    what: &str,
    result: Result<ApiReply<Vec<T>>>,
    wrap: impl FnOnce(Vec<T>) -> Delta,
) {
    match result {
        Ok(ApiReply::Success(items)) => {
            let _ = tx.send(Delta::Log(format!("[INFO] Loaded {} {what}", items.len())));
            let _ = tx.send(wrap(items));
        }
        Ok(ApiReply::Failure { status }) => {
            let _ = tx.send(Delta::Log(format!("[WARN] GET {what} answered {status}")));
            notice_error(tx, format!("Failed to fetch {what}"));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] {what} fetch error: {err:#}")));
            notice_error(tx, format!("Error fetching {what}"));
        }
    }
}

fn report_registration(tx: &Sender<Delta>, kind: RegistrationKind, result: Result<ApiReply<()>>) {
    let what = match kind {
        RegistrationKind::Phase => "phase",
        RegistrationKind::Match => "match",
    };
    match result {
        Ok(ApiReply::Success(())) => {
            let _ = tx.send(Delta::Log(format!("[INFO] Registered {what}")));
            let _ = tx.send(Delta::Registered(kind));
        }
        Ok(ApiReply::Failure { status }) => {
            registration_failed(tx, kind, format!("Failed to register {what} ({status})"));
        }
        Err(err) => {
            registration_failed(tx, kind, format!("Error registering {what}: {err:#}"));
        }
    }
}

fn registration_failed(tx: &Sender<Delta>, kind: RegistrationKind, message: String) {
    let _ = tx.send(Delta::RegistrationFailed { kind, message });
}

fn notice_error(tx: &Sender<Delta>, text: impl Into<String>) {
    let _ = tx.send(Delta::Notice {
        level: NoticeLevel::Error,
        text: text.into(),
    });
}
