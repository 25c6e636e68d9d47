// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::OperationContext;
use fieldops_audit::{Actor, Cause};
use fieldops_domain::{
    Affaire, Client, Contact, Demande, DemandeStatus, Doe, Intervention, InterventionStatus,
    Site, SiteStatus, Ticket, TicketState, User, UserRole,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-02-11 10:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::new(1, String::from("admin"), UserRole::Admin)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_context() -> OperationContext {
    OperationContext::new(create_test_actor(), create_test_cause(), NOW)
}

pub fn create_test_client() -> Client {
    Client {
        client_id: 42,
        name: String::from("Résidence Les Tilleuls"),
        contact: Contact::default(),
        comment: None,
        address_id: None,
    }
}

pub fn create_test_site() -> Site {
    Site {
        site_id: 7,
        client_id: Some(42),
        name: String::from("Bâtiment B"),
        address_id: None,
        status: SiteStatus::Active,
        responsible_agent_id: None,
        comment: None,
    }
}

pub fn create_test_doe() -> Doe {
    Doe {
        doe_id: 3,
        site_id: 7,
        title: String::from("DOE toiture"),
    }
}

pub fn create_test_affaire() -> Affaire {
    Affaire {
        affaire_id: 2,
        title: String::from("Entretien 2026"),
        client_id: Some(42),
    }
}

pub fn create_test_demande() -> Demande {
    Demande {
        demande_id: 1,
        client_id: 42,
        site_id: 7,
        title: String::from("Fuite toiture"),
        description: String::from("Water under the skylight"),
        status: DemandeStatus::Pending,
        created_at: datetime!(2026-02-10 09:00 UTC),
        ticket_id: None,
    }
}

pub fn create_test_ticket(state: TicketState) -> Ticket {
    Ticket {
        ticket_id: 10,
        title: String::from("Fuite toiture"),
        description: String::new(),
        site_id: 7,
        demande_id: Some(1),
        affaire_id: Some(2),
        doe_id: Some(3),
        state,
        responsable_id: None,
        started_at: datetime!(2026-02-11 08:00 UTC),
        ended_at: None,
    }
}

pub fn create_test_intervention(ticket_id: i64) -> Intervention {
    Intervention {
        intervention_id: 20,
        ticket_id,
        description: String::from("Inspection"),
        started_at: datetime!(2026-02-11 08:30 UTC),
        ended_at: None,
        status: InterventionStatus::EnCours,
        previous_intervention_id: None,
    }
}

pub fn create_test_user(user_id: i64, role: UserRole) -> User {
    User {
        user_id,
        login: format!("user{user_id}"),
        display_name: format!("User {user_id}"),
        role,
        client_id: (role == UserRole::Client).then_some(42),
        matricule: role.is_staff().then(|| format!("AG{user_id:03}")),
        email: None,
        phone: None,
    }
}
