use std::fs;
use std::path::PathBuf;

use reqwest::StatusCode;
use tournament_admin::api::{
    ApiReply, HttpBackend, interpret_create_response, interpret_delete_response,
    interpret_list_response, parse_matches_json, parse_phases_json, parse_teams_json,
};
use tournament_admin::state::{Match, NewMatch, Phase};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_matches_fixture() {
    let raw = read_fixture("matches.json");
    let envelope = parse_matches_json(&raw).expect("fixture should parse");
    assert!(envelope.success);
    let rows = envelope.data.expect("data should be present");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, "m-100");
    assert_eq!(rows[0].team_a.name, "Atlético Norte");
    assert_eq!(rows[0].team_b.name, "Deportivo Sur");
    assert_eq!(rows[0].goals, "2-1");
}

#[test]
fn numeric_ids_and_goals_become_strings() {
    let raw = read_fixture("matches.json");
    let rows = parse_matches_json(&raw)
        .expect("fixture should parse")
        .data
        .expect("data should be present");
    assert_eq!(rows[1].id, "101");
    assert_eq!(rows[1].team_a.id, "t-3");
    assert_eq!(rows[1].team_b.id, "4");
    assert_eq!(rows[1].goals, "3");
    assert_eq!(rows[2].end_date, "");
    assert_eq!(rows[2].goals, "");
}

#[test]
fn parses_phases_and_teams_fixtures() {
    let phases = parse_phases_json(&read_fixture("phases.json"))
        .expect("fixture should parse")
        .data
        .expect("data should be present");
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[1].name, "Octavos");
    assert_eq!(phases[1].start_date, "2026-06-28");

    let teams = parse_teams_json(&read_fixture("teams.json"))
        .expect("fixture should parse")
        .data
        .expect("data should be present");
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[2].id, "t-3");
}

#[test]
fn list_needs_status_200_and_success_flag() {
    let ok = interpret_list_response::<Phase>(StatusCode::OK, &read_fixture("phases.json"))
        .expect("body should parse");
    assert!(matches!(ok, ApiReply::Success(ref items) if items.len() == 2));

    let refused = interpret_list_response::<Match>(StatusCode::OK, &read_fixture("refused.json"))
        .expect("body should parse");
    assert_eq!(
        refused,
        ApiReply::Failure {
            status: StatusCode::OK
        }
    );

    let not_ok =
        interpret_list_response::<Match>(StatusCode::NO_CONTENT, &read_fixture("matches.json"))
            .expect("status alone decides");
    assert_eq!(
        not_ok,
        ApiReply::Failure {
            status: StatusCode::NO_CONTENT
        }
    );

    let forbidden = interpret_list_response::<Match>(StatusCode::FORBIDDEN, "<html>")
        .expect("body is not read on failure");
    assert!(matches!(forbidden, ApiReply::Failure { .. }));
}

#[test]
fn garbage_body_on_200_is_an_error() {
    assert!(interpret_list_response::<Match>(StatusCode::OK, "<html>oops</html>").is_err());
}

#[test]
fn null_body_is_a_refusal() {
    let reply = interpret_list_response::<Match>(StatusCode::OK, "null").expect("null parses");
    assert!(matches!(reply, ApiReply::Failure { .. }));
}

#[test]
fn delete_succeeds_only_on_200() {
    assert_eq!(interpret_delete_response(StatusCode::OK), ApiReply::Success(()));
    assert_eq!(
        interpret_delete_response(StatusCode::NO_CONTENT),
        ApiReply::Failure {
            status: StatusCode::NO_CONTENT
        }
    );
    assert!(matches!(
        interpret_delete_response(StatusCode::NOT_FOUND),
        ApiReply::Failure { .. }
    ));
}

#[test]
fn create_accepts_201_unless_body_refuses() {
    assert_eq!(
        interpret_create_response(StatusCode::CREATED, r#"{"success":true}"#),
        ApiReply::Success(())
    );
    assert_eq!(
        interpret_create_response(StatusCode::OK, ""),
        ApiReply::Success(())
    );
    assert!(matches!(
        interpret_create_response(StatusCode::OK, r#"{"success":false}"#),
        ApiReply::Failure { .. }
    ));
    assert!(matches!(
        interpret_create_response(StatusCode::BAD_REQUEST, r#"{"success":true}"#),
        ApiReply::Failure { .. }
    ));
}

#[test]
fn new_match_serializes_with_wire_names() {
    let body = NewMatch {
        team_a: "t-1".to_string(),
        team_b: "t-2".to_string(),
        phase: None,
        start_date: "2026-06-11 18:00".to_string(),
        end_date: "2026-06-11 20:00".to_string(),
    };
    let json = serde_json::to_value(&body).expect("serializable");
    assert_eq!(json["teamA"], "t-1");
    assert_eq!(json["teamB"], "t-2");
    assert_eq!(json["startDate"], "2026-06-11 18:00");
    assert!(json.get("phase").is_none());
}

#[test]
fn backend_urls_join_cleanly() {
    let backend = HttpBackend::new("https://api.example.org/");
    assert_eq!(
        backend.url("/tournaments/t1/matches"),
        "https://api.example.org/tournaments/t1/matches"
    );
    assert_eq!(backend.url("matches/m1"), "https://api.example.org/matches/m1");
}

#[test]
fn envelope_without_data_parses_as_empty() {
    let envelope = parse_matches_json(r#"{"success":true}"#).expect("missing data is allowed");
    assert!(envelope.success);
    assert!(envelope.data.is_none());

    let reply = interpret_list_response::<Match>(StatusCode::OK, r#"{"success":true}"#)
        .expect("body should parse");
    assert_eq!(reply, ApiReply::Success(Vec::new()));
}

#[test]
fn error_statuses_escalate_with_the_status_code() {
    let err = ApiReply::<()>::Failure {
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
    .escalate()
    .expect_err("5xx is an error");
    assert_eq!(err.to_string(), "request failed with status 500");

    assert!(
        interpret_delete_response(StatusCode::NOT_FOUND)
            .escalate()
            .is_err()
    );

    assert_eq!(
        interpret_delete_response(StatusCode::NO_CONTENT).escalate().ok(),
        Some(ApiReply::Failure {
            status: StatusCode::NO_CONTENT
        })
    );
    assert_eq!(
        ApiReply::Success(3).escalate().ok(),
        Some(ApiReply::Success(3))
    );
}
