// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;

use crate::{PersistTransitionResult, Persistence};
use fieldops::{
    ConversionDraft, CoreError, DemandeDraft, NewAffaire, NewClient, NewDoe, NewSite, NewUser,
    OperationContext, TransitionResult, convert_demande, create_affaire, create_client,
    create_demande, create_doe, create_site, create_user,
};
use fieldops_audit::{Actor, Cause};
use fieldops_domain::{
    Affaire, Client, Contact, Demande, Doe, Site, SiteStatus, Ticket, User, UserRole,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-02-11 10:00 UTC);

pub fn create_test_context() -> OperationContext {
    OperationContext::new(
        Actor::new(1, String::from("admin"), UserRole::Admin),
        Cause::new(String::from("req-1"), String::from("Test operation")),
        NOW,
    )
}

/// Persists a transition the test expects to be valid.
pub fn persist(
    persistence: &mut Persistence,
    result: Result<TransitionResult, CoreError>,
) -> PersistTransitionResult {
    let result: TransitionResult = result.expect("transition should be valid");
    persistence
        .persist_transition(&result)
        .expect("transition should persist")
}

/// A store seeded with one client, its site, a DOE, an affaire, an agent
/// and a client-side user.
pub struct Fixture {
    pub persistence: Persistence,
    pub client: Client,
    pub site: Site,
    pub doe: Doe,
    pub affaire: Affaire,
    pub agent: User,
    pub client_user: User,
}

impl Fixture {
    pub fn seeded() -> Self {
        let mut persistence = Persistence::new_in_memory().expect("in-memory store");
        let ctx = create_test_context();

        let client_id = persist(
            &mut persistence,
            create_client(
                NewClient {
                    name: String::from("Résidence Les Tilleuls"),
                    contact: Contact::default(),
                    comment: None,
                    address_id: None,
                },
                None,
                &ctx,
            ),
        )
        .created_id()
        .expect("client id");
        let client = persistence.find_client(client_id).unwrap().unwrap();

        let site_id = persist(
            &mut persistence,
            create_site(
                NewSite {
                    client_id: Some(client_id),
                    name: String::from("Bâtiment B"),
                    address_id: None,
                    status: SiteStatus::Active,
                    responsible_agent_id: None,
                    comment: None,
                },
                Some(&client),
                None,
                None,
                &ctx,
            ),
        )
        .created_id()
        .expect("site id");
        let site = persistence.find_site(site_id).unwrap().unwrap();

        let doe_id = persist(
            &mut persistence,
            create_doe(
                NewDoe {
                    site_id,
                    title: String::from("DOE toiture"),
                },
                Some(&site),
                &ctx,
            ),
        )
        .created_id()
        .expect("doe id");
        let doe = persistence.find_doe(doe_id).unwrap().unwrap();

        let affaire_id = persist(
            &mut persistence,
            create_affaire(
                NewAffaire {
                    title: String::from("Entretien annuel"),
                    client_id: Some(client_id),
                },
                Some(&client),
                &ctx,
            ),
        )
        .created_id()
        .expect("affaire id");
        let affaire = persistence.find_affaire(affaire_id).unwrap().unwrap();

        let agent = Self::add_user(&mut persistence, "agent.martin", UserRole::Agent, None);
        let client_user =
            Self::add_user(&mut persistence, "client.tilleuls", UserRole::Client, Some(&client));

        Self {
            persistence,
            client,
            site,
            doe,
            affaire,
            agent,
            client_user,
        }
    }

    fn add_user(
        persistence: &mut Persistence,
        login: &str,
        role: UserRole,
        client: Option<&Client>,
    ) -> User {
        let user = NewUser {
            login: login.to_string(),
            display_name: login.to_string(),
            role,
            client_id: client.map(|c| c.client_id),
            matricule: role.is_staff().then(|| String::from("AG001")),
            email: None,
            phone: None,
        };
        let user_id = persist(persistence, create_user(user, client, &create_test_context()))
            .created_id()
            .expect("user id");
        persistence.find_user(user_id).unwrap().unwrap()
    }

    pub fn create_demande(&mut self, title: &str) -> Demande {
        let draft = DemandeDraft {
            client_id: self.client.client_id,
            site_id: self.site.site_id,
            title: title.to_string(),
            description: String::from("Fuite au plafond du hall"),
        };
        let demande_id = persist(
            &mut self.persistence,
            create_demande(draft, Some(&self.client), Some(&self.site), &create_test_context()),
        )
        .created_id()
        .expect("demande id");
        self.persistence.find_demande(demande_id).unwrap().unwrap()
    }

    pub fn conversion_draft(&self) -> ConversionDraft {
        ConversionDraft {
            title: None,
            description: None,
            affaire_id: self.affaire.affaire_id,
            doe_id: self.doe.doe_id,
            started_at: None,
        }
    }

    /// Converts a demande and returns the reloaded demande and its ticket.
    pub fn convert(&mut self, demande: &Demande) -> (Demande, Ticket) {
        let result = convert_demande(
            demande,
            self.conversion_draft(),
            Some(&self.doe),
            Some(&self.affaire),
            &create_test_context(),
        );
        let persisted = persist(&mut self.persistence, result);
        let ticket_id = persisted.created_id().expect("ticket id");
        let demande = self
            .persistence
            .find_demande(demande.demande_id)
            .unwrap()
            .unwrap();
        let ticket = self.persistence.find_ticket(ticket_id).unwrap().unwrap();
        (demande, ticket)
    }
}
