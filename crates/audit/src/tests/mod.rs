// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used)]

use crate::{Action, Actor, AuditEvent, Cause, EntityKind, EntityRef, StateSnapshot};
use fieldops_domain::UserRole;
use std::str::FromStr;
use time::macros::datetime;

fn admin() -> Actor {
    Actor::new(1, String::from("admin"), UserRole::Admin)
}

fn event(entity: EntityRef) -> AuditEvent {
    AuditEvent::new(
        admin(),
        Cause::new(String::from("req-456"), String::from("API request")),
        Action::new(String::from("ConvertDemande"), None),
        entity,
        StateSnapshot::new(String::from("status=pending")),
        StateSnapshot::new(String::from("status=in_progress,ticket_id=9")),
        datetime!(2026-02-11 08:00 UTC),
    )
}

#[test]
fn test_actor_creation_requires_all_fields() {
    let actor: Actor = Actor::new(7, String::from("dupont"), UserRole::Client);

    assert_eq!(actor.user_id, 7);
    assert_eq!(actor.login, "dupont");
    assert_eq!(actor.role, UserRole::Client);
    assert!(!actor.is_admin());
    assert!(admin().is_admin());
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        String::from("SubmitSatisfaction"),
        Some(String::from("rating=5")),
    );

    assert_eq!(action.name, "SubmitSatisfaction");
    assert_eq!(action.details, Some(String::from("rating=5")));
}

#[test]
fn test_new_event_has_no_id() {
    let event: AuditEvent = event(EntityRef::existing(EntityKind::Demande, 3));

    assert_eq!(event.event_id, None);
    assert_eq!(event.entity.id, Some(3));
    assert_eq!(event.actor, admin());
    assert_eq!(event.before.data, "status=pending");
}

#[test]
fn test_pending_entity_receives_store_id() {
    let event: AuditEvent = event(EntityRef::pending(EntityKind::Ticket));
    assert_eq!(event.entity.id, None);

    let stored: AuditEvent = event.clone().with_entity_id(9).with_event_id(42);
    assert_eq!(stored.entity, EntityRef::existing(EntityKind::Ticket, 9));
    assert_eq!(stored.event_id, Some(42));
    assert_ne!(stored, event);
}

#[test]
fn test_entity_kind_round_trip() {
    for kind in [
        EntityKind::Address,
        EntityKind::Affaire,
        EntityKind::Association,
        EntityKind::Client,
        EntityKind::Contract,
        EntityKind::Demande,
        EntityKind::Doe,
        EntityKind::Intervention,
        EntityKind::Message,
        EntityKind::Representative,
        EntityKind::Satisfaction,
        EntityKind::Site,
        EntityKind::Ticket,
        EntityKind::User,
    ] {
        assert_eq!(EntityKind::from_str(kind.as_str()).unwrap(), kind);
    }
    assert!(EntityKind::from_str("invoice").is_err());
}

#[test]
fn test_absent_snapshot() {
    assert_eq!(StateSnapshot::absent().data, "absent");
}
