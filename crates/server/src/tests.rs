// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use fieldops::LifecyclePolicy;
use fieldops_persistence::Persistence;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{AppState, bootstrap_admin, build_router};
use crate::session::{ACTOR_HEADER, REQUEST_ID_HEADER};

const ADMIN: &str = "admin";
const AGENT: &str = "agent.martin";
const CLIENT: &str = "client.tilleuls";

fn test_app(policy: LifecyclePolicy) -> Router {
    let mut persistence = Persistence::new_in_memory().expect("in-memory store");
    bootstrap_admin(&mut persistence, ADMIN).expect("bootstrap admin");
    build_router(AppState::new(persistence, policy))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    actor: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(login) = actor {
        builder = builder.header(ACTOR_HEADER, login);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str, actor: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(actor), Some(body)).await
}

async fn get(app: &Router, uri: &str, actor: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(actor), None).await
}

/// Directory built over HTTP: one client with a site, a DOE, an affaire,
/// a client user and an agent.
struct Seed {
    app: Router,
    client_id: i64,
    site_id: i64,
    doe_id: i64,
    affaire_id: i64,
    client_user_id: i64,
    agent_id: i64,
}

impl Seed {
    async fn new() -> Self {
        Self::with_policy(LifecyclePolicy::default()).await
    }

    async fn with_policy(policy: LifecyclePolicy) -> Self {
        let app = test_app(policy);

        let (status, client) = post(
            &app,
            "/clients",
            ADMIN,
            json!({ "name": "Résidence Les Tilleuls" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let client_id = client["id"].as_i64().unwrap();

        let (_, site) = post(
            &app,
            "/sites",
            ADMIN,
            json!({ "name": "Bâtiment B", "client_id": client_id }),
        )
        .await;
        let site_id = site["id"].as_i64().unwrap();

        let (_, doe) = post(
            &app,
            "/does",
            ADMIN,
            json!({ "site_id": site_id, "title": "DOE chaufferie" }),
        )
        .await;
        let (_, affaire) = post(
            &app,
            "/affaires",
            ADMIN,
            json!({ "title": "Contrat chauffage", "client_id": client_id }),
        )
        .await;

        let (_, client_user) = post(
            &app,
            "/users",
            ADMIN,
            json!({
                "login": CLIENT,
                "display_name": "Syndic Tilleuls",
                "role": "client",
                "client_id": client_id
            }),
        )
        .await;
        let (_, agent) = post(
            &app,
            "/users",
            ADMIN,
            json!({
                "login": AGENT,
                "display_name": "Paul Martin",
                "role": "agent",
                "matricule": "AG001"
            }),
        )
        .await;

        Self {
            app,
            client_id,
            site_id,
            doe_id: doe["id"].as_i64().unwrap(),
            affaire_id: affaire["id"].as_i64().unwrap(),
            client_user_id: client_user["id"].as_i64().unwrap(),
            agent_id: agent["id"].as_i64().unwrap(),
        }
    }

    async fn file_demande(&self, title: &str) -> i64 {
        let (status, body) = post(
            &self.app,
            "/demandes",
            CLIENT,
            json!({
                "client_id": self.client_id,
                "site_id": self.site_id,
                "title": title,
                "description": "Plus d'eau chaude depuis ce matin"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn convert(&self, demande_id: i64) -> (StatusCode, Value) {
        post(
            &self.app,
            &format!("/demandes/{demande_id}/convert"),
            ADMIN,
            json!({ "doe_id": self.doe_id, "affaire_id": self.affaire_id }),
        )
        .await
    }

    async fn open_ticket(&self) -> i64 {
        let demande_id = self.file_demande("Chauffage HS").await;
        let (_, body) = self.convert(demande_id).await;
        body["ticket_id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let seed = Seed::new().await;

    let (status, body) = send(&seed.app, Method::GET, "/clients", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn test_unknown_actor_is_unauthorized() {
    let seed = Seed::new().await;

    let (status, _) = get(&seed.app, "/clients", "nobody").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_cannot_list_clients() {
    let seed = Seed::new().await;

    let (status, body) = get(&seed.app, "/clients", CLIENT).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, body) = get(&seed.app, "/clients", AGENT).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_filed_demande_is_pending() {
    let seed = Seed::new().await;
    let demande_id = seed.file_demande("Chauffage HS").await;

    let (status, body) = get(
        &seed.app,
        &format!("/clients/{}/relations", seed.client_id),
        CLIENT,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let demande = &body["demandes"][0];
    assert_eq!(demande["demande_id"], demande_id);
    assert_eq!(demande["status_label"], "En cours de traitement");
    assert_eq!(demande["ticket_id"], Value::Null);
    assert_eq!(demande["locked"], false);
}

#[tokio::test]
async fn test_conversion_is_idempotent_over_http() {
    let seed = Seed::new().await;
    let demande_id = seed.file_demande("Chauffage HS").await;

    let (status, first) = seed.convert(demande_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["already_converted"], false);
    let ticket_id = first["ticket_id"].as_i64().unwrap();

    let (status, second) = seed.convert(demande_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_converted"], true);
    assert_eq!(second["ticket_id"], ticket_id);

    let (_, relations) = get(&seed.app, &format!("/tickets/{ticket_id}/relations"), ADMIN).await;
    assert_eq!(relations["ticket"]["stored_state"], "Pas_commence");
    assert_eq!(relations["demandes"][0]["ticket_id"], ticket_id);

    let (_, open) = get(&seed.app, "/tickets/open", ADMIN).await;
    assert_eq!(open["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_intervention_shows_ticket_in_progress() {
    let seed = Seed::new().await;
    let ticket_id = seed.open_ticket().await;

    let (status, body) = post(
        &seed.app,
        "/interventions",
        AGENT,
        json!({
            "ticket_id": ticket_id,
            "description": "Diagnostic",
            "started_at": "2026-02-11T08:00:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["intervention"]["ended_at"], Value::Null);

    let (_, relations) = get(&seed.app, &format!("/tickets/{ticket_id}/relations"), AGENT).await;
    assert_eq!(relations["ticket"]["displayed_state"], "En_cours");
    assert_eq!(relations["ticket"]["stored_state"], "Pas_commence");
    assert_eq!(relations["interventions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_satisfaction_after_finish() {
    let seed = Seed::new().await;
    let ticket_id = seed.open_ticket().await;

    let (status, early) = post(
        &seed.app,
        &format!("/tickets/{ticket_id}/satisfaction"),
        CLIENT,
        json!({ "rating": 5, "comment": "Rapide" }),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(early["kind"], "precondition");

    let (status, finished) = post(
        &seed.app,
        &format!("/tickets/{ticket_id}/finish"),
        AGENT,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["ticket"]["stored_state"], "Termine");

    let uri = format!("/tickets/{ticket_id}/satisfaction");
    let (status, _) = post(&seed.app, &uri, CLIENT, json!({ "rating": 7 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, first) = post(
        &seed.app,
        &uri,
        CLIENT,
        json!({ "rating": 5, "comment": "Rapide" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["satisfaction"]["rating"], 5);

    let (status, retry) = post(
        &seed.app,
        &uri,
        CLIENT,
        json!({ "rating": 5, "comment": "Rapide" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retry["already_submitted"], true);

    let (status, conflict) = post(&seed.app, &uri, CLIENT, json!({ "rating": 3 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["kind"], "conflict");
}

#[tokio::test]
async fn test_french_field_names_are_accepted() {
    let seed = Seed::new().await;
    let (status, demande) = post(
        &seed.app,
        "/demandes",
        CLIENT,
        json!({
            "client_id": seed.client_id,
            "site_id": seed.site_id,
            "titre": "Fuite en toiture",
            "description": "Tache au plafond du 3e"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, converted) = seed.convert(demande["id"].as_i64().unwrap()).await;
    let ticket_id = converted["ticket_id"].as_i64().unwrap();

    let (status, _) = post(
        &seed.app,
        &format!("/tickets/{ticket_id}/agents"),
        ADMIN,
        json!({ "agent_matricule": "AG001" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &seed.app,
        "/interventions",
        AGENT,
        json!({
            "ticket_id": ticket_id,
            "description": "Bâchage",
            "date_debut": "2026-02-11T08:00:00Z",
            "date_fin": "2026-02-11T09:15:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["intervention"]["started_at"], "2026-02-11T08:00:00Z");
    assert_eq!(body["intervention"]["status"], "Termine");

    post(
        &seed.app,
        &format!("/tickets/{ticket_id}/finish"),
        AGENT,
        json!({}),
    )
    .await;
    let (status, body) = post(
        &seed.app,
        &format!("/tickets/{ticket_id}/satisfaction"),
        CLIENT,
        json!({ "note": 4, "commentaire": "Efficace" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["satisfaction"]["rating"], 4);
    assert_eq!(body["satisfaction"]["comment"], "Efficace");

    let (_, relations) = get(&seed.app, &format!("/tickets/{ticket_id}/relations"), ADMIN).await;
    assert_eq!(relations["ticket"]["title"], "Fuite en toiture");
    assert_eq!(relations["agents_assignes"][0]["user"]["user_id"], seed.agent_id);
}

#[tokio::test]
async fn test_reopen_is_refused_by_default() {
    let seed = Seed::new().await;
    let ticket_id = seed.open_ticket().await;
    post(
        &seed.app,
        &format!("/tickets/{ticket_id}/finish"),
        AGENT,
        json!({}),
    )
    .await;

    let (status, _) = send(
        &seed.app,
        Method::POST,
        &format!("/tickets/{ticket_id}/reopen"),
        Some(ADMIN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_reopen_allowed_by_policy() {
    let seed = Seed::with_policy(LifecyclePolicy {
        allow_ticket_reopen: true,
        allow_intervention_changes_after_close: false,
    })
    .await;
    let ticket_id = seed.open_ticket().await;
    post(
        &seed.app,
        &format!("/tickets/{ticket_id}/finish"),
        AGENT,
        json!({}),
    )
    .await;

    let (status, body) = send(
        &seed.app,
        Method::POST,
        &format!("/tickets/{ticket_id}/reopen"),
        Some(ADMIN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket"]["stored_state"], "En_cours");
}

#[tokio::test]
async fn test_conversation_keeps_posting_order() {
    let seed = Seed::new().await;
    let demande_id = seed.file_demande("Chauffage HS").await;
    let uri = format!("/conversations/demande-{demande_id}/messages");

    let (status, first) = post(
        &seed.app,
        &uri,
        CLIENT,
        json!({ "receiver_id": 1, "body": "Toujours pas de chauffage" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sender_id"], seed.client_user_id);

    let (_, reply) = post(
        &seed.app,
        &uri,
        ADMIN,
        json!({ "body": "Un technicien passe demain" }),
    )
    .await;
    assert_eq!(reply["receiver_id"], seed.client_user_id);

    post(
        &seed.app,
        &uri,
        CLIENT,
        json!({
            "receiver_id": 1,
            "body": "Merci",
            "attachments": [{ "file_name": "radiateur.jpg", "reference": "store/radiateur.jpg" }]
        }),
    )
    .await;

    let (status, conversation) = get(
        &seed.app,
        &format!("/conversations/demande-{demande_id}"),
        CLIENT,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bodies: Vec<&str> = conversation["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(
        bodies,
        vec!["Toujours pas de chauffage", "Un technicien passe demain", "Merci"]
    );
    assert_eq!(
        conversation["messages"][2]["attachments"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_malformed_conversation_id_is_bad_request() {
    let seed = Seed::new().await;

    let (status, body) = get(&seed.app, "/conversations/demande-abc", ADMIN).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_converted_demande_is_locked() {
    let seed = Seed::new().await;
    let demande_id = seed.file_demande("Chauffage HS").await;
    seed.convert(demande_id).await;

    for actor in [CLIENT, ADMIN] {
        let (status, body) = send(
            &seed.app,
            Method::PUT,
            &format!("/demandes/{demande_id}"),
            Some(actor),
            Some(json!({ "title": "Chauffage et eau chaude HS" })),
        )
        .await;
        assert_eq!(status, StatusCode::LOCKED);
        assert_eq!(body["kind"], "locked");
    }
}

#[tokio::test]
async fn test_unknown_site_relations_is_not_found() {
    let seed = Seed::new().await;

    let (status, body) = get(&seed.app, "/sites/999/relations", ADMIN).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_empty_collections_serialize_as_arrays() {
    let seed = Seed::new().await;

    let (status, body) = get(&seed.app, &format!("/sites/{}/relations", seed.site_id), ADMIN).await;

    assert_eq!(status, StatusCode::OK);
    for field in ["tickets", "representatives", "contracts"] {
        assert_eq!(body[field], json!([]), "{field} should be an empty array");
    }
    assert_eq!(body["site"]["has_open_ticket"], false);
}

#[tokio::test]
async fn test_assign_responsable_by_matricule() {
    let seed = Seed::new().await;
    let ticket_id = seed.open_ticket().await;
    let uri = format!("/tickets/{ticket_id}/responsables");

    let (status, _) = post(
        &seed.app,
        &uri,
        ADMIN,
        json!({ "matricule": "AG001", "role_label": "chef d'équipe" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &seed.app,
        &uri,
        ADMIN,
        json!({ "matricule": "AG001", "role_label": "chef d'équipe" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event_id"], Value::Null);

    let (status, _) = post(&seed.app, &uri, ADMIN, json!({ "matricule": "AG001" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post(&seed.app, &uri, ADMIN, json!({ "matricule": "ZZ999" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, relations) = get(&seed.app, &format!("/tickets/{ticket_id}/relations"), ADMIN).await;
    assert_eq!(relations["responsables"].as_array().map(Vec::len), Some(1));
    assert_eq!(relations["responsables"][0]["user"]["user_id"], seed.agent_id);
    assert_eq!(relations["responsables"][0]["role_label"], Value::Null);
    assert_eq!(relations["agents_assignes"], json!([]));
}

#[tokio::test]
async fn test_csv_preview_reports_rows() {
    let seed = Seed::new().await;
    let csv = "name,address_line1,postal_code,city,comment\n\
               Bâtiment D,3 rue Haute,69001,Lyon,\n\
               ,1 rue Basse,69002,Lyon,\n";

    let (status, body) = post(
        &seed.app,
        &format!("/clients/{}/sites/import", seed.client_id),
        ADMIN,
        json!({ "csv_content": csv, "preview_only": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 2);
    assert_eq!(body["valid_count"], 1);
    assert_eq!(body["invalid_count"], 1);
    assert_eq!(body["imported"], false);
}

#[tokio::test]
async fn test_request_id_becomes_audit_cause() {
    let seed = Seed::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/clients")
        .header(ACTOR_HEADER, ADMIN)
        .header(REQUEST_ID_HEADER, "req-42")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "Copropriété du Parc" }).to_string()))
        .unwrap();

    let response = seed.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let client_id = created["id"].as_i64().unwrap();

    let (status, timeline) = get(&seed.app, &format!("/audit/client/{client_id}"), ADMIN).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(timeline["events"][0]["action"], "CreateClient");
    assert_eq!(timeline["events"][0]["cause_id"], "req-42");
    assert_eq!(timeline["events"][0]["actor_login"], ADMIN);

    let (status, _) = get(&seed.app, &format!("/audit/client/{client_id}"), AGENT).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[test]
fn test_bootstrap_admin_is_idempotent() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    bootstrap_admin(&mut persistence, ADMIN).unwrap();
    bootstrap_admin(&mut persistence, ADMIN).unwrap();

    let admin = persistence.find_user_by_login(ADMIN).unwrap().unwrap();
    assert_eq!(admin.role.as_str(), "admin");
}
