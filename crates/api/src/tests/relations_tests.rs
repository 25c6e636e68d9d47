// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;

use crate::tests::helpers::{NOW, TestApp, default_policy};
use crate::{
    ApiError, CreateInterventionRequest, CreateSiteRequest, FinishTicketRequest, create_intervention,
    create_site, finish_ticket, get_site_relations, get_ticket_relations, list_open_tickets,
};

#[test]
fn test_fresh_site_has_empty_collections() {
    let mut app = TestApp::seeded();
    let site_id = create_site(
        &mut app.persistence,
        &app.admin,
        CreateSiteRequest {
            name: String::from("Local technique"),
            client_id: None,
            address_id: None,
            status: None,
            responsible_agent_id: None,
            comment: None,
        },
    )
    .unwrap()
    .id;

    let relations =
        get_site_relations(&mut app.persistence, &app.admin, site_id).expect("relations");

    assert!(relations.tickets.is_empty());
    assert!(relations.representatives.is_empty());
    assert!(relations.contracts.is_empty());
    assert!(relations.client.is_none());
    assert!(relations.address.is_none());
    assert!(!relations.site.has_open_ticket);
    assert_eq!(relations.site.status, "active");
}

#[test]
fn test_site_relations_carry_tickets_and_client() {
    let mut app = TestApp::seeded();
    let site_id = app.site_id;
    let (_, ticket_id) = app.open_ticket("Fuite");

    let relations =
        get_site_relations(&mut app.persistence, &app.client_user, site_id).expect("relations");

    assert!(relations.site.has_open_ticket);
    assert_eq!(relations.tickets.len(), 1);
    assert_eq!(relations.tickets[0].ticket_id, ticket_id);
    assert_eq!(
        relations.client.as_ref().map(|c| c.name.as_str()),
        Some("Résidence Les Tilleuls")
    );
}

#[test]
fn test_unknown_site_is_not_found() {
    let mut app = TestApp::seeded();

    let result = get_site_relations(&mut app.persistence, &app.admin, 999);

    let err = result.unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_open_intervention_elapsed_follows_request_time() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    create_intervention(
        &mut app.persistence,
        &app.agent,
        CreateInterventionRequest {
            ticket_id,
            description: String::from("Diagnostic"),
            started_at: String::from("2026-02-10T09:30:00Z"),
            ended_at: None,
            status: None,
            previous_intervention_id: None,
        },
        default_policy(),
    )
    .unwrap();

    let first =
        get_ticket_relations(&mut app.persistence, &app.agent, ticket_id).expect("relations");
    let elapsed = first.interventions[0].elapsed;
    assert_eq!(elapsed.days, 1);
    assert_eq!(elapsed.hours, 0);
    assert_eq!(elapsed.minutes, 30);

    let mut later = app.agent.clone();
    later.now = NOW + Duration::hours(3);
    let second =
        get_ticket_relations(&mut app.persistence, &later, ticket_id).expect("relations");
    assert!(second.interventions[0].elapsed.total_seconds > elapsed.total_seconds);
    assert_eq!(second.interventions[0].elapsed.hours, 3);
}

#[test]
fn test_closed_intervention_elapsed_is_fixed() {
    let mut app = TestApp::seeded();
    let (_, ticket_id) = app.open_ticket("Fuite");
    create_intervention(
        &mut app.persistence,
        &app.agent,
        CreateInterventionRequest {
            ticket_id,
            description: String::from("Remplacement joint"),
            started_at: String::from("2026-02-11T08:00:00Z"),
            ended_at: Some(String::from("2026-02-11T09:15:00Z")),
            status: Some(String::from("Termine")),
            previous_intervention_id: None,
        },
        default_policy(),
    )
    .unwrap();

    let mut later = app.agent.clone();
    later.now = NOW + Duration::days(4);
    let relations =
        get_ticket_relations(&mut app.persistence, &later, ticket_id).expect("relations");

    let elapsed = relations.interventions[0].elapsed;
    assert_eq!(elapsed.hours, 1);
    assert_eq!(elapsed.minutes, 15);
    assert_eq!(elapsed.total_seconds, 4500);
}

#[test]
fn test_open_ticket_list_scoping() {
    let mut app = TestApp::seeded();
    let (_, own_ticket) = app.open_ticket("Fuite");
    let (_, done_ticket) = app.open_ticket("Porte");
    finish_ticket(
        &mut app.persistence,
        &app.agent,
        done_ticket,
        &FinishTicketRequest::default(),
    )
    .unwrap();

    let (other_client, other_site, other_user) = app.add_other_client();
    let other_doe = crate::create_doe(
        &mut app.persistence,
        &app.admin,
        crate::CreateDoeRequest {
            site_id: other_site,
            title: String::from("DOE parking"),
        },
    )
    .unwrap()
    .id;
    let other_ticket = crate::create_ticket(
        &mut app.persistence,
        &app.admin,
        crate::CreateTicketRequest {
            title: String::from("Barrière"),
            description: String::from("Barrière bloquée"),
            site_id: other_site,
            affaire_id: app.affaire_id,
            doe_id: other_doe,
            started_at: None,
        },
    )
    .unwrap()
    .id;
    assert_ne!(other_client, app.client_id);

    let staff = list_open_tickets(&mut app.persistence, &app.agent, None).expect("staff");
    let ids: Vec<i64> = staff.tickets.iter().map(|t| t.ticket_id).collect();
    assert_eq!(ids, vec![own_ticket, other_ticket]);

    let client = list_open_tickets(&mut app.persistence, &app.client_user, None).expect("own");
    let ids: Vec<i64> = client.tickets.iter().map(|t| t.ticket_id).collect();
    assert_eq!(ids, vec![own_ticket]);

    let site = list_open_tickets(&mut app.persistence, &other_user, Some(other_site))
        .expect("own site");
    assert_eq!(site.tickets.len(), 1);

    let result = list_open_tickets(&mut app.persistence, &other_user, Some(app.site_id));
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}
