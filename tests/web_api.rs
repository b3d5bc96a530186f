use actix_web::{test, web, App};
use serde_json::{json, Value};

use interview_scheduler::store::ScheduleStore;
use interview_scheduler::web::{configure, AppState};

const PASSWORD: &str = "test-password";

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(ScheduleStore::default(), PASSWORD)))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn schedule_snapshot_has_seed_data() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/schedule").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["schedule"]["rows"], json!(["09:00 - 09:15", "09:15 - 09:30"]));
    assert_eq!(body["schedule"]["cols"], json!(["11/30 (日)", "12/01 (月)"]));
    assert_eq!(body["schedule"]["assignments"][0][1], "app-1");
    assert_eq!(body["unassigned"], json!(["app-2", "app-3", "app-4"]));
}

#[actix_web::test]
async fn click_select_then_assign() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/slots/0/1/click")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["selected_slot"], json!({"row": 0, "col": 1}));

    let req = test::TestRequest::post()
        .uri("/api/applicants/app-2/click")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["schedule"]["assignments"][0][1], "app-2");
    assert_eq!(body["state"]["selected_slot"], Value::Null);
    assert_eq!(body["state"]["unassigned"], json!(["app-1", "app-3", "app-4"]));
}

#[actix_web::test]
async fn disabling_occupied_slot_round_trips_through_confirm() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/slots/0/1/toggle")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "needs_confirmation");
    assert_eq!(body["confirmation"]["confirm_text"], "Unassign and disable");
    assert_eq!(body["state"]["schedule"]["availability"][0][1], true);

    let req = test::TestRequest::post().uri("/api/confirm").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["schedule"]["availability"][0][1], false);
    assert_eq!(body["state"]["schedule"]["assignments"][0][1], Value::Null);
}

#[actix_web::test]
async fn rejected_move_is_reported_as_ignored() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/rows")
        .set_json(json!({"start": "09:00", "duration": 30}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["reason"], "a row starting at 09:00 already exists");
    assert_eq!(body["state"]["revision"], 0);
}

#[actix_web::test]
async fn drop_from_roster_onto_grid() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/drop")
        .set_json(json!({
            "payload": {"applicant_id": "app-3", "source": {"kind": "roster"}},
            "target": {"kind": "grid", "row": 1, "col": 0}
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["schedule"]["assignments"][1][0], "app-3");
    assert_eq!(body["state"]["dragging"], Value::Null);
}

#[actix_web::test]
async fn drag_steps_track_selection_and_hover() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/slots/1/1/click")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["selected_slot"], json!({"row": 1, "col": 1}));

    let req = test::TestRequest::post()
        .uri("/api/drag/start")
        .set_json(json!({"applicant_id": "app-3", "source": {"kind": "roster"}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["selected_slot"], Value::Null);
    assert_eq!(body["state"]["dragging"]["applicant_id"], "app-3");

    let req = test::TestRequest::post()
        .uri("/api/drag/enter")
        .set_json(json!({"target": {"kind": "grid", "row": 1, "col": 0}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["hovered"], json!({"kind": "grid", "row": 1, "col": 0}));

    let req = test::TestRequest::post().uri("/api/drag/leave").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["hovered"], Value::Null);

    let req = test::TestRequest::post()
        .uri("/api/drag/drop")
        .set_json(json!({"target": {"kind": "grid", "row": 1, "col": 0}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["schedule"]["assignments"][1][0], "app-3");
    assert_eq!(body["state"]["dragging"], Value::Null);

    let req = test::TestRequest::post().uri("/api/drag/end").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["revision"], 1);
}

#[actix_web::test]
async fn drag_end_without_drop_changes_nothing() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/drag/start")
        .set_json(json!({"applicant_id": "app-1", "source": {"kind": "grid", "row": 0, "col": 1}}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/drag/end").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["dragging"], Value::Null);
    assert_eq!(body["state"]["schedule"]["assignments"][0][1], "app-1");

    let req = test::TestRequest::post()
        .uri("/api/drag/drop")
        .set_json(json!({"target": {"kind": "roster"}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["reason"], "no drag in progress");
}

#[actix_web::test]
async fn oversized_row_duration_is_ignored() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/rows")
        .set_json(json!({"start": "10:00", "duration": 4294967295u32}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "ignored");

    let req = test::TestRequest::get().uri("/api/schedule").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["schedule"]["rows"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn add_col_from_iso_date() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/cols")
        .set_json(json!({"date": "2025-12-02"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["schedule"]["cols"][2], "12/02 (火)");

    let req = test::TestRequest::post()
        .uri("/api/cols")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/cols")
        .set_json(json!({"date": "2025-13-40"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn save_applicant_requires_name() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/applicants")
        .set_json(json!({"name": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Name is required");

    let req = test::TestRequest::post()
        .uri("/api/applicants")
        .set_json(json!({"name": "高橋 健", "student_id": "1300"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    let req = test::TestRequest::get().uri("/api/applicants").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(5));
    assert_eq!(body[0]["assignment"]["date"], "12/01 (月)");
}

#[actix_web::test]
async fn applicant_details_and_unknown_id() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/applicants/app-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["applicant"]["name"], "佐藤 太郎");
    assert_eq!(body["assignment"]["time"], "09:00 - 09:15");

    let req = test::TestRequest::get()
        .uri("/api/applicants/nobody")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn delete_applicant_is_staged_until_confirmed() {
    let app = app!();
    let req = test::TestRequest::delete()
        .uri("/api/applicants/app-2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "needs_confirmation");
    assert_eq!(
        body["confirmation"]["message"],
        "Delete 山田 花子 from the applicant list?"
    );

    let req = test::TestRequest::post().uri("/api/cancel").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["applicants"].as_array().map(Vec::len), Some(4));
}

#[actix_web::test]
async fn import_requires_admin_password() {
    let app = app!();
    let csv = "name,student_id\n高橋 健,1300\n山田 花子 (更新),1202\n";

    let req = test::TestRequest::post()
        .uri("/api/import")
        .insert_header(("X-Admin-Password", "wrong"))
        .set_payload(csv)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/import")
        .insert_header(("X-Admin-Password", PASSWORD))
        .set_payload(csv)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["imported"], 2);

    let req = test::TestRequest::get().uri("/api/applicants").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(5));
    assert_eq!(body[1]["name"], "山田 花子 (更新)");
}

#[actix_web::test]
async fn export_board_csv() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/export").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("Time,11/30 (日),12/01 (月)\n"));
    assert!(text.contains("09:00 - 09:15,,佐藤 太郎"));
}

#[actix_web::test]
async fn settings_reject_unsupported_duration() {
    let app = app!();
    let req = test::TestRequest::put()
        .uri("/api/settings")
        .set_json(json!({"interview_duration": 7}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["state"]["interview_duration"], 15);

    let req = test::TestRequest::put()
        .uri("/api/settings")
        .set_json(json!({"interview_duration": 30, "start_time": "10:00"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"]["interview_duration"], 30);
    assert_eq!(body["state"]["next_start_time"], "10:00");
}
