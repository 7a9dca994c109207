// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use waggle_api::{ApiError, Client, DatapointQuery};
use waggle_app::DatapointRequest;

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn spawn_server() -> (Server, String) {
    let server = Server::http("127.0.0.1:0").expect("start mock server");
    let base_url = format!("http://{}", server.server_addr());
    (server, base_url)
}

fn client(base_url: &str) -> Client {
    Client::new(base_url, "secret-token", Duration::from_secs(1)).expect("client should initialize")
}

#[test]
fn goals_parses_summaries_and_sends_the_auth_token() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        assert!(url.starts_with("/users/alice/goals.json"));
        assert!(url.contains("auth_token=secret-token"));

        let body = r#"[
            {"slug":"reading","title":"Read more books","curval":12.5,"goalval":50.0,
             "rate":1.0,"losedate":1700003600,"updated_at":1700000000,
             "lost":false,"won":false,"frozen":true},
            {"slug":"running","curval":null,"goalval":null,"rate":null,
             "losedate":null,"updated_at":null,"lost":true,"won":true,"frozen":false}
        ]"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let goals = client(&base_url).goals("alice").expect("goals should parse");
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].slug, "reading");
    assert_eq!(goals[0].curval, Some(12.5));
    assert_eq!(goals[0].status().as_str(), "FROZEN");
    // lost wins over won in the derived status
    assert_eq!(goals[1].status().as_str(), "LOST");
    assert_eq!(goals[1].title, "");

    handle.join().expect("server thread should join");
}

#[test]
fn goal_detail_flattens_summary_fields_and_requests_datapoints_flag() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        assert!(url.starts_with("/users/alice/goals/reading.json"));
        assert!(url.contains("datapoints=false"));

        let body = r#"{
            "slug":"reading","title":"Read more books","curval":12.5,"goalval":50.0,
            "rate":1.0,"losedate":null,"updated_at":null,
            "lost":false,"won":false,"frozen":false,
            "description":"A chapter a day","pledge":5.0,"gunits":"books",
            "tags":["books","evening"],"safebuf":3,"deadline":22,"weekends_off":false
        }"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let detail = client(&base_url)
        .goal("alice", "reading", false)
        .expect("detail should parse");
    assert_eq!(detail.summary.slug, "reading");
    assert_eq!(detail.description, Some("A chapter a day".to_owned()));
    assert_eq!(detail.pledge, Some(5.0));
    assert_eq!(
        detail.tags,
        Some(vec!["books".to_owned(), "evening".to_owned()])
    );

    handle.join().expect("server thread should join");
}

#[test]
fn create_datapoint_posts_a_form_with_value_comment_and_token() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &tiny_http::Method::Post);
        assert_eq!(request.url(), "/users/alice/goals/reading/datapoints.json");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should read");
        assert!(body.contains("auth_token=secret-token"));
        assert!(body.contains("value=2.5"));
        assert!(body.contains("comment=evening+session"));

        let reply = r#"{"id":"dp1","timestamp":1700000000,"daystamp":"20231114",
                        "value":2.5,"comment":"evening session","requestid":null,
                        "updated_at":1700000000}"#;
        request
            .respond(json_response(reply, 200))
            .expect("response should succeed");
    });

    let request = DatapointRequest::new(2.5, Some("evening session".to_owned()))
        .expect("finite value should validate");
    let datapoint = client(&base_url)
        .create_datapoint("alice", "reading", &request)
        .expect("datapoint should be created");
    assert_eq!(datapoint.id, Some("dp1".to_owned()));
    assert_eq!(datapoint.value, 2.5);

    handle.join().expect("server thread should join");
}

#[test]
fn unauthorized_responses_map_to_the_auth_variant() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(
                r#"{"errors":{"auth_token":"bad_token"}}"#,
                401,
            ))
            .expect("response should succeed");
    });

    let error = client(&base_url)
        .goals("alice")
        .expect_err("401 should fail");
    assert!(matches!(error, ApiError::Auth { status: 401 }));

    handle.join().expect("server thread should join");
}

#[test]
fn missing_goals_map_to_the_not_found_variant() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"error":"not found"}"#, 404))
            .expect("response should succeed");
    });

    let error = client(&base_url)
        .goal("alice", "missing", false)
        .expect_err("404 should fail");
    match error {
        ApiError::NotFound { path } => assert_eq!(path, "/users/alice/goals/missing.json"),
        other => panic!("expected NotFound, got {other:?}"),
    }

    handle.join().expect("server thread should join");
}

#[test]
fn rejected_datapoints_surface_the_server_message() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(
                r#"{"errors":{"value":"must be a number"}}"#,
                422,
            ))
            .expect("response should succeed");
    });

    let request = DatapointRequest::new(1.0, None).expect("finite value should validate");
    let error = client(&base_url)
        .create_datapoint("alice", "reading", &request)
        .expect_err("422 should fail");
    match error {
        ApiError::Validation { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "value: must be a number");
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    handle.join().expect("server thread should join");
}

#[test]
fn unreachable_hosts_map_to_the_transport_variant() {
    let client = Client::new("http://127.0.0.1:1", "token", Duration::from_millis(50))
        .expect("client should initialize");
    let error = client.goals("alice").expect_err("connect should fail");
    assert!(matches!(error, ApiError::Transport { .. }));
}

#[test]
fn malformed_bodies_map_to_the_decode_variant() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response("{not json", 200))
            .expect("response should succeed");
    });

    let error = client(&base_url)
        .goals("alice")
        .expect_err("bad JSON should fail");
    assert!(matches!(error, ApiError::Decode { what: "goal list", .. }));

    handle.join().expect("server thread should join");
}

#[test]
fn datapoint_listing_forwards_pagination_parameters() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        assert!(url.starts_with("/users/alice/goals/reading/datapoints.json"));
        assert!(url.contains("sort=timestamp"));
        assert!(url.contains("count=10"));
        assert!(url.contains("page=2"));
        assert!(url.contains("per=5"));

        let body = r#"[{"id":"dp1","timestamp":null,"daystamp":null,"value":1.0,
                       "comment":null,"requestid":null,"updated_at":null}]"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let query = DatapointQuery {
        sort: Some("timestamp".to_owned()),
        count: Some(10),
        page: Some(2),
        per: Some(5),
    };
    let datapoints = client(&base_url)
        .datapoints("alice", "reading", &query)
        .expect("datapoints should parse");
    assert_eq!(datapoints.len(), 1);

    handle.join().expect("server thread should join");
}

#[test]
fn delete_datapoint_uses_the_delete_method() {
    let (server, base_url) = spawn_server();

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &tiny_http::Method::Delete);
        let url = request.url().to_owned();
        assert!(url.starts_with("/users/alice/goals/reading/datapoints/dp1.json"));
        assert!(url.contains("auth_token=secret-token"));

        let body = r#"{"id":"dp1","timestamp":null,"daystamp":null,"value":1.0,
                       "comment":null,"requestid":null,"updated_at":null}"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let deleted = client(&base_url)
        .delete_datapoint("alice", "reading", "dp1")
        .expect("delete should succeed");
    assert_eq!(deleted.id, Some("dp1".to_owned()));

    handle.join().expect("server thread should join");
}
