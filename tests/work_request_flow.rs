mod common;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workdesk::{
    dtos::workrequestdtos::{Attachment, CreateWorkRequestDto, RequestValidationError},
    error::ClientError,
    models::{
        usermodel::UserRole,
        workrequestmodel::{ServiceType, StatusState, WorkRequest, WorkRequestStatus},
    },
    navigation::{HistoryNavigator, Navigator, Route},
    service::status_workflow::StatusAction,
};

use common::{signed_in, work_request_json, CLIENT_ID, PROVIDER_ID, TOKEN};

fn plumbing_form() -> CreateWorkRequestDto {
    CreateWorkRequestDto {
        title: "Fix kitchen sink".to_string(),
        description: "Leaking under the counter".to_string(),
        service_type: ServiceType::Local,
        city: Some("riyadh".to_string()),
        categories: vec!["plumbing".to_string()],
        budget_min: Some(60.0),
        budget_max: Some(200.0),
        ..CreateWorkRequestDto::default()
    }
}

#[tokio::test]
async fn inverted_budget_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/work-request"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let navigator = HistoryNavigator::new();
    let mut form = CreateWorkRequestDto {
        budget_min: Some(100.0),
        budget_max: Some(50.0),
        ..plumbing_form()
    };

    let err = app
        .work_request_service
        .submit(&mut form, &[], &navigator)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(RequestValidationError::BudgetOrder)
    ));
    assert_eq!(err.user_message().text, "max cannot be less than min");
    assert_eq!(form.budget_min, Some(100.0));
    assert!(navigator.history().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn local_request_without_city_is_refused() {
    let server = MockServer::start().await;
    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let form = CreateWorkRequestDto {
        city: Some("   ".to_string()),
        ..plumbing_form()
    };

    let err = app.work_request_service.create(&form, &[]).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(RequestValidationError::MissingCity)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn valid_form_is_posted_then_reset_and_navigates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/work-request"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "service_type": "local",
            "city": "riyadh",
            "categories": ["plumbing"],
            "budget_min": 60.0,
            "budget_max": 200.0
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": work_request_json(42, "new", None) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let navigator = HistoryNavigator::new();
    let mut form = plumbing_form();

    let created = app
        .work_request_service
        .submit(&mut form, &[], &navigator)
        .await
        .unwrap();

    assert_eq!(created.id, 42);
    assert_eq!(created.status(), WorkRequestStatus::New);
    assert!(form.title.is_empty());
    assert!(form.categories.is_empty());
    assert_eq!(navigator.current(), Some(Route::MyRequests));
}

#[tokio::test]
async fn attachments_switch_to_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/work-request"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "work_request": work_request_json(43, "new", None) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let photo = Attachment {
        file_name: "sink.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    };

    let created = app
        .work_request_service
        .create(&plumbing_form(), &[photo])
        .await
        .unwrap();
    assert_eq!(created.id, 43);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"categories[]\""));
    assert!(body.contains("filename=\"sink.jpg\""));
}

#[tokio::test]
async fn provider_proposes_and_client_confirms_completion() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/work-request/42/status"))
        .and(body_json(json!({ "status": "completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "work_request": work_request_json(42, "in_progress", Some(("completed", PROVIDER_ID)))
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/work-request/42/status"))
        .and(body_json(json!({ "status": "completed", "confirm": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "work_request": work_request_json(42, "completed", None)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = signed_in(&server, PROVIDER_ID, UserRole::Provider);
    let client = signed_in(&server, CLIENT_ID, UserRole::Client);
    let request: WorkRequest =
        serde_json::from_value(work_request_json(42, "in_progress", None)).unwrap();

    let proposed = provider
        .work_request_service
        .update_status(&request, StatusAction::Propose(WorkRequestStatus::Completed))
        .await
        .unwrap();
    assert_eq!(proposed.status(), WorkRequestStatus::InProgress);
    assert_eq!(
        proposed.state.pending(),
        Some((WorkRequestStatus::Completed, PROVIDER_ID))
    );

    // The proposer is refused locally.
    assert!(matches!(
        provider
            .work_request_service
            .update_status(&proposed, StatusAction::Confirm)
            .await,
        Err(ClientError::SelfConfirmation(PROVIDER_ID))
    ));

    let confirmed = client
        .work_request_service
        .update_status(&proposed, StatusAction::Confirm)
        .await
        .unwrap();
    assert_eq!(confirmed.state, StatusState::Settled(WorkRequestStatus::Completed));
    assert!(confirmed.is_closed());

    assert!(matches!(
        client
            .work_request_service
            .update_status(&confirmed, StatusAction::Propose(WorkRequestStatus::InProgress))
            .await,
        Err(ClientError::RequestClosed(42))
    ));
}

#[tokio::test]
async fn owner_assigns_provider() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/work-request/42/assign-provider"))
        .and(body_json(json!({ "provider_id": PROVIDER_ID })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(work_request_json(42, "in_progress", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let mut request: WorkRequest =
        serde_json::from_value(work_request_json(42, "new", None)).unwrap();
    request.provider_id = None;

    let updated = app
        .work_request_service
        .assign_provider(&request, PROVIDER_ID)
        .await
        .unwrap();
    assert_eq!(updated.provider_id, Some(PROVIDER_ID));
}

#[tokio::test]
async fn server_rejection_is_shown_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/work-requests/my"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "The city field is invalid." })),
        )
        .mount(&server)
        .await;

    let app = signed_in(&server, CLIENT_ID, UserRole::Client);
    let err = app.work_request_service.my_requests().await.unwrap_err();

    assert!(matches!(err, ClientError::Server { status: 422, .. }));
    let shown = err.user_message();
    assert_eq!(shown.key, "errors.server_message");
    assert_eq!(shown.text, "The city field is invalid.");
}
