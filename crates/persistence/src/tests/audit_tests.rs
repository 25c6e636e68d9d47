// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{Fixture, NOW};
use fieldops_audit::{EntityKind, EntityRef};
use fieldops_domain::UserRole;

#[test]
fn test_creation_events_carry_the_assigned_entity_id() {
    let mut fixture = Fixture::seeded();
    let demande = fixture.create_demande("Fuite toiture");

    let timeline = fixture
        .persistence
        .get_audit_timeline(EntityKind::Demande, demande.demande_id)
        .unwrap();

    assert_eq!(timeline.len(), 1);
    let event = &timeline[0];
    assert_eq!(
        event.entity,
        EntityRef::existing(EntityKind::Demande, demande.demande_id)
    );
    assert_eq!(event.action.name, "CreateDemande");
    assert_eq!(event.actor.role, UserRole::Admin);
    assert_eq!(event.occurred_at, NOW);
    assert!(event.event_id.is_some());
}

#[test]
fn test_event_round_trips_through_the_store() {
    let mut fixture = Fixture::seeded();
    let demande = fixture.create_demande("Fuite toiture");
    fixture.convert(&demande);

    let timeline = fixture
        .persistence
        .get_audit_timeline(EntityKind::Demande, demande.demande_id)
        .unwrap();
    let names: Vec<&str> = timeline.iter().map(|e| e.action.name.as_str()).collect();
    assert_eq!(names, vec!["CreateDemande", "ConvertDemande"]);

    let conversion = &timeline[1];
    let loaded = fixture
        .persistence
        .get_audit_event(conversion.event_id.unwrap())
        .unwrap();
    assert_eq!(&loaded, conversion);
    assert_ne!(loaded.before, loaded.after);
    assert_eq!(loaded.cause.id, "req-1");
}
