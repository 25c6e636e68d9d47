// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops::LifecyclePolicy;
use fieldops_domain::AssignmentKind;

use crate::tests::helpers::{TestApp, default_policy};
use crate::{
    ApiError, AssignRequest, CloseInterventionRequest, CreateInterventionRequest,
    CreateTicketRequest, FinishTicketRequest, SubmitSatisfactionRequest, TransitionTicketRequest,
    assign_to_ticket, close_intervention, create_intervention, create_ticket, finish_ticket,
    get_audit_timeline, get_client_relations, get_ticket_relations, reopen_ticket,
    submit_satisfaction, transition_ticket,
};

fn intervention_request(ticket_id: i64) -> CreateInterventionRequest {
    CreateInterventionRequest {
        ticket_id,
        description: String::from("Recherche de fuite"),
        started_at: String::from("2026-02-11T08:00:00Z"),
        ended_at: None,
        status: None,
        previous_intervention_id: None,
    }
}

fn rating(value: i64, comment: Option<&str>) -> SubmitSatisfactionRequest {
    SubmitSatisfactionRequest {
        rating: value,
        comment: comment.map(String::from),
    }
}

fn finished_ticket(app: &mut TestApp) -> i64 {
    let (_, ticket_id) = app.open_ticket("Fuite");
    finish_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &FinishTicketRequest::default(),
    )
    .expect("finish");
    ticket_id
}

#[test]
fn test_admin_creates_ticket_without_demande() {
    let mut app = TestApp::seeded();
    let request = CreateTicketRequest {
        title: String::from("Contrôle annuel"),
        description: String::from("Visite planifiée"),
        site_id: app.site_id,
        affaire_id: app.affaire_id,
        doe_id: app.doe_id,
        started_at: Some(String::from("2026-02-12T07:30:00+01:00")),
    };

    let created = create_ticket(&mut app.persistence, &app.admin, request).expect("ticket");
    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, created.id).expect("relations");

    assert_eq!(relations.ticket.demande_id, None);
    assert_eq!(relations.ticket.started_at, "2026-02-12T06:30:00Z");
    assert!(relations.demandes.is_empty());
}

#[test]
fn test_ticket_with_unknown_site_is_invalid() {
    let mut app = TestApp::seeded();
    let request = CreateTicketRequest {
        title: String::from("Contrôle"),
        description: String::new(),
        site_id: 999,
        affaire_id: app.affaire_id,
        doe_id: app.doe_id,
        started_at: None,
    };

    let result = create_ticket(&mut app.persistence, &app.admin, request);

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_intervention_displays_ticket_as_in_progress() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(ticket_id),
        default_policy(),
    )
    .expect("intervention");

    let relations =
        get_ticket_relations(&mut app.persistence, &app.agent, ticket_id).expect("relations");
    assert_eq!(relations.ticket.stored_state, "Pas_commence");
    assert_eq!(relations.ticket.displayed_state, "En_cours");
    assert_eq!(relations.ticket.intervention_count, 1);
    assert_eq!(relations.interventions.len(), 1);
    assert_eq!(relations.interventions[0].status, "En_cours");
}

#[test]
fn test_transition_follows_displayed_state() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(ticket_id),
        default_policy(),
    )
    .unwrap();

    let blocked = transition_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &TransitionTicketRequest {
            state: String::from("Bloque"),
        },
        default_policy(),
    )
    .expect("En_cours -> Bloque");

    assert_eq!(blocked.ticket.stored_state, "Bloque");
    assert_eq!(blocked.ticket.displayed_state, "Bloque");
}

#[test]
fn test_forbidden_transition_is_precondition() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let result = transition_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &TransitionTicketRequest {
            state: String::from("Bloque"),
        },
        default_policy(),
    );

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::PreconditionFailed { .. }));
    assert_eq!(err.kind(), "precondition");
}

#[test]
fn test_unknown_state_name_is_invalid() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let result = transition_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &TransitionTicketRequest {
            state: String::from("Archive"),
        },
        default_policy(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_client_cannot_transition_ticket() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let result = transition_ticket(
        &mut app.persistence,
        &app.client_user,
        ticket_id,
        &TransitionTicketRequest {
            state: String::from("En_cours"),
        },
        default_policy(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_finish_marks_demande_processed() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let finished = finish_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &FinishTicketRequest {
            ended_at: Some(String::from("2026-02-11T16:45:00Z")),
        },
    )
    .expect("finish");

    assert_eq!(finished.ticket.stored_state, "Termine");
    assert_eq!(finished.ticket.ended_at.as_deref(), Some("2026-02-11T16:45:00Z"));

    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, ticket_id).expect("relations");
    assert_eq!(relations.demandes[0].status, "processed");
    assert_eq!(relations.demandes[0].status_label, "Traité");
}

#[test]
fn test_finish_twice_is_precondition() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    let result = finish_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &FinishTicketRequest::default(),
    );

    assert!(matches!(result, Err(ApiError::PreconditionFailed { .. })));
}

#[test]
fn test_reopen_respects_policy() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    let result = reopen_ticket(&mut app.persistence, &app.admin, ticket_id, default_policy());
    assert!(matches!(result, Err(ApiError::PreconditionFailed { .. })));

    let policy = LifecyclePolicy {
        allow_ticket_reopen: true,
        ..default_policy()
    };
    let reopened =
        reopen_ticket(&mut app.persistence, &app.admin, ticket_id, policy).expect("reopen");
    assert_eq!(reopened.ticket.stored_state, "En_cours");
    assert_eq!(reopened.ticket.ended_at, None);
}

#[test]
fn test_intervention_on_finished_ticket_respects_policy() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    let result = create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(ticket_id),
        default_policy(),
    );
    assert!(matches!(result, Err(ApiError::PreconditionFailed { .. })));

    let policy = LifecyclePolicy {
        allow_intervention_changes_after_close: true,
        ..default_policy()
    };
    create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(ticket_id),
        policy,
    )
    .expect("allowed after close");
}

#[test]
fn test_intervention_for_unknown_ticket_is_invalid() {
    let mut app = TestApp::seeded();

    let result = create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(999),
        default_policy(),
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { ref field, .. }) if field == "ticket_id"));
}

#[test]
fn test_intervention_ending_before_start_is_invalid() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    let mut request = intervention_request(ticket_id);
    request.ended_at = Some(String::from("2026-02-11T07:00:00Z"));

    let result = create_intervention(&mut app.persistence, &app.agent, request, default_policy());

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_close_intervention_once() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    let created = create_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_request(ticket_id),
        default_policy(),
    )
    .unwrap();
    let intervention_id = created.intervention.intervention_id;

    let closed = close_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_id,
        &CloseInterventionRequest::default(),
        default_policy(),
    )
    .expect("close");

    assert_eq!(
        closed.intervention.ended_at.as_deref(),
        Some("2026-02-11T10:00:00Z")
    );
    assert_eq!(closed.intervention.elapsed.hours, 2);
    assert_eq!(closed.intervention.elapsed.total_seconds, 7200);

    let again = close_intervention(
        &mut app.persistence,
        &app.agent,
        intervention_id,
        &CloseInterventionRequest::default(),
        default_policy(),
    );
    assert!(matches!(again, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_satisfaction_requires_finished_ticket() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let result = submit_satisfaction(
        &mut app.persistence,
        &app.client_user,
        ticket_id,
        rating(5, None),
    );

    assert!(matches!(result, Err(ApiError::PreconditionFailed { .. })));
}

#[test]
fn test_satisfaction_rating_out_of_range() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    for value in [0, 6] {
        let result = submit_satisfaction(
            &mut app.persistence,
            &app.client_user,
            ticket_id,
            rating(value, None),
        );
        assert!(
            matches!(result, Err(ApiError::InvalidInput { .. })),
            "rating {value} should be rejected"
        );
    }
}

#[test]
fn test_satisfaction_recorded_once() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    let first = submit_satisfaction(
        &mut app.persistence,
        &app.client_user,
        ticket_id,
        rating(4, Some("Travail soigné")),
    )
    .expect("first submission");
    assert!(!first.already_submitted);
    assert_eq!(first.satisfaction.rating, 4);

    let retry = submit_satisfaction(
        &mut app.persistence,
        &app.client_user,
        ticket_id,
        rating(4, Some("Travail soigné")),
    )
    .expect("identical retry");
    assert!(retry.already_submitted);
    assert_eq!(
        retry.satisfaction.satisfaction_id,
        first.satisfaction.satisfaction_id
    );

    let different = submit_satisfaction(
        &mut app.persistence,
        &app.client_user,
        ticket_id,
        rating(2, None),
    );
    let err = different.unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(err.kind(), "conflict");

    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, ticket_id).expect("relations");
    assert_eq!(relations.satisfaction.map(|s| s.rating), Some(4));
}

#[test]
fn test_agent_cannot_rate_ticket() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);

    let result = submit_satisfaction(&mut app.persistence, &app.agent, ticket_id, rating(5, None));

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_other_client_cannot_rate_ticket() {
    let mut app = TestApp::seeded();
    let ticket_id = finished_ticket(&mut app);
    let (_, _, other_user) = app.add_other_client();

    let result = submit_satisfaction(&mut app.persistence, &other_user, ticket_id, rating(5, None));

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_responsable_assignment_appears_in_relations() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        TestApp::assign_request(),
        AssignmentKind::Responsable,
    )
    .expect("assign");

    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, ticket_id).expect("relations");
    assert_eq!(relations.responsables.len(), 1);
    assert_eq!(relations.responsables[0].user.login, "agent.martin");
    assert_eq!(
        relations.responsables[0].role_label.as_deref(),
        Some("chef d'équipe")
    );
    assert!(relations.agents_assignes.is_empty());
    assert_eq!(
        relations.ticket.responsable_id,
        Some(app.agent.actor.user.user_id)
    );
}

#[test]
fn test_unknown_matricule_is_not_found() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");

    let result = assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        AssignRequest {
            matricule: String::from("ZZ999"),
            role_label: None,
        },
        AssignmentKind::Agent,
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_repeated_assignment_is_idempotent() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    let first = assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        TestApp::assign_request(),
        AssignmentKind::Agent,
    )
    .unwrap();
    assert!(first.event_id.is_some());
    let events_before = get_audit_timeline(&mut app.persistence, &app.admin, "ticket", ticket_id)
        .unwrap()
        .events
        .len();

    let second = assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        TestApp::assign_request(),
        AssignmentKind::Agent,
    )
    .expect("repeat is accepted");

    assert_eq!(second.id, ticket_id);
    assert!(second.event_id.is_none());
    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, ticket_id).expect("relations");
    assert_eq!(relations.agents_assignes.len(), 1);
    let events_after = get_audit_timeline(&mut app.persistence, &app.admin, "ticket", ticket_id)
        .unwrap()
        .events
        .len();
    assert_eq!(events_after, events_before);
}

#[test]
fn test_reassignment_updates_role_label() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        TestApp::assign_request(),
        AssignmentKind::Agent,
    )
    .unwrap();

    let response = assign_to_ticket(
        &mut app.persistence,
        &app.admin,
        ticket_id,
        AssignRequest {
            matricule: String::from("AG001"),
            role_label: Some(String::from("superviseur")),
        },
        AssignmentKind::Agent,
    )
    .expect("relabel");

    assert!(response.event_id.is_some());
    let relations =
        get_ticket_relations(&mut app.persistence, &app.admin, ticket_id).expect("relations");
    assert_eq!(relations.agents_assignes.len(), 1);
    assert_eq!(
        relations.agents_assignes[0].role_label.as_deref(),
        Some("superviseur")
    );
}

#[test]
fn test_open_ticket_flags_site() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;
    let (_, ticket_id) = app.open_ticket("Fuite");

    let before =
        get_client_relations(&mut app.persistence, &app.admin, client_id).expect("relations");
    assert!(before.sites[0].has_open_ticket);

    finish_ticket(
        &mut app.persistence,
        &app.agent,
        ticket_id,
        &FinishTicketRequest::default(),
    )
    .unwrap();

    let after =
        get_client_relations(&mut app.persistence, &app.admin, client_id).expect("relations");
    assert!(!after.sites[0].has_open_ticket);
}
