mod common;

use std::{sync::Arc, time::Duration};

use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test, web, App,
};
use serde_json::{json, Value};

use faith_tribe_quiz::{
    app_state::AppState,
    auth::JwtService,
    config::Config,
    handlers,
    models::domain::{Identity, QuizDocument},
    services::SessionStore,
};
use mongodb::bson::{oid::ObjectId, Bson};

use common::{origins_document, repositories, Repositories};

fn jwt_service() -> JwtService {
    JwtService::new(&Config::test_config().jwt_secret)
}

fn bearer(identity: &Identity) -> (actix_web::http::header::HeaderName, String) {
    let token = jwt_service()
        .create_token(identity, 1)
        .expect("token should be created");
    (AUTHORIZATION, format!("Bearer {}", token))
}

fn state(repos: &Repositories) -> AppState {
    AppState::with_repositories(repos.quizzes.clone(), repos.results.clone())
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::Data::new(jwt_service()))
                .configure(handlers::configure),
        )
        .await
    };
}

fn grace() -> Identity {
    Identity::new("user-1", "Grace")
}

#[actix_web::test]
async fn full_quiz_over_http_saves_result() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .insert_header(bearer(&grace()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["snapshot"]["phase"], "ready");
    assert_eq!(body["snapshot"]["question_number"], 1);
    assert_eq!(body["snapshot"]["question_count"], 3);
    assert!(body["snapshot"]["question"].get("correct_index").is_none());

    for (number, option) in [(1, 1), (2, 2), (3, 1)] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/quiz/sessions/{}/answer", session_id))
            .insert_header(bearer(&grace()))
            .set_json(json!({ "option_index": option }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "answering question {}", number);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["snapshot"]["question"]["revealed"], true);

        let req = test::TestRequest::post()
            .uri(&format!("/api/quiz/sessions/{}/advance", session_id))
            .insert_header(bearer(&grace()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .insert_header(bearer(&grace()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["snapshot"]["phase"], "finished");
    assert_eq!(body["snapshot"]["score"], 20);
    assert_eq!(body["snapshot"]["max_score"], 30);
    assert_eq!(body["snapshot"]["submission"]["status"], "saved");

    let req = test::TestRequest::get()
        .uri("/api/quiz/results")
        .insert_header(bearer(&grace()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["score"], 20);
    assert_eq!(body["items"][0]["total_possible"], 30);
}

#[actix_web::test]
async fn answering_twice_conflicts() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let answer = |option: usize| {
        test::TestRequest::post()
            .uri(&format!("/api/quiz/sessions/{}/answer", session_id))
            .set_json(json!({ "option_index": option }))
            .to_request()
    };

    let resp = test::call_service(&app, answer(0)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, answer(1)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_ACTION");
}

#[actix_web::test]
async fn advancing_before_answering_conflicts() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/quiz/sessions/{}/advance", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["snapshot"]["question_number"], 1);
}

#[actix_web::test]
async fn missing_quiz_is_reported_and_reload_recovers() {
    let repos = repositories();
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .insert_header(bearer(&grace()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["snapshot"]["phase"], "failed");
    assert_eq!(body["snapshot"]["error"], "No active quiz found at the moment");

    repos.quizzes.insert(origins_document(true)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/quiz/sessions/{}/load", session_id))
        .insert_header(bearer(&grace()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["snapshot"]["phase"], "ready");
    assert!(body["snapshot"].get("error").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/quiz/sessions/{}/load", session_id))
        .insert_header(bearer(&grace()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn sessions_are_private_to_their_owner() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .insert_header(bearer(&grace()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .insert_header(bearer(&Identity::new("user-2", "Ruth")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn owner_keeps_access_after_a_display_name_change() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .insert_header(bearer(&grace()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let renamed = Identity::new("user-1", "Grace Adeyemi");
    let req = test::TestRequest::post()
        .uri(&format!("/api/quiz/sessions/{}/answer", session_id))
        .insert_header(bearer(&renamed))
        .set_json(json!({ "option_index": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn idle_sessions_expire() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let mut app_state = state(&repos);
    app_state.sessions = Arc::new(SessionStore::new(Duration::from_millis(20), 100));
    let sessions = Arc::clone(&app_state.sessions);
    let app = app!(app_state);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/quiz/sessions")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["session_id"].as_str().unwrap().to_string());
    }
    assert_eq!(sessions.len().await, 3);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sessions.purge_expired().await, 3);

    for id in ids {
        let req = test::TestRequest::get()
            .uri(&format!("/api/quiz/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[actix_web::test]
async fn quiz_keyed_only_by_object_id_is_playable() {
    let repos = repositories();
    let oid = ObjectId::new();
    repos
        .quizzes
        .insert(QuizDocument {
            object_id: Some(Bson::ObjectId(oid)),
            id: None,
            ..origins_document(true)
        })
        .await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["snapshot"]["phase"], "ready");
    assert_eq!(body["snapshot"]["quiz_id"], oid.to_hex());
}

#[actix_web::test]
async fn deleted_sessions_are_gone() {
    let repos = repositories();
    repos.quizzes.insert(origins_document(true)).await;
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/quiz/sessions/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn invalid_token_is_unauthorized() {
    let repos = repositories();
    let app = app!(state(&repos));

    let req = test::TestRequest::post()
        .uri("/api/quiz/sessions")
        .insert_header((AUTHORIZATION, "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn results_require_identity() {
    let repos = repositories();
    let app = app!(state(&repos));

    let req = test::TestRequest::get().uri("/api/quiz/results").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn health_endpoints() {
    let repos = repositories();
    let app = app!(state(&repos));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["dependencies"]["mongodb"], "not_configured");
}
