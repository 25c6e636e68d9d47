// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use fieldops::{LifecyclePolicy, NewUser, OperationContext, create_user};
use fieldops_audit::{Actor, Cause};
use fieldops_domain::{User, UserRole};
use fieldops_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AssignRequest, AuthenticatedActor, AuthenticationService, ConvertDemandeRequest,
    CreateAffaireRequest, CreateClientRequest, CreateDemandeRequest, CreateDoeRequest,
    CreateSiteRequest, CreateUserRequest, RequestContext, convert_demande, create_affaire,
    create_client, create_demande, create_doe, create_site, create_user as api_create_user,
};

pub const NOW: OffsetDateTime = datetime!(2026-02-11 10:00 UTC);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn context_for(actor: AuthenticatedActor) -> RequestContext {
    RequestContext::new(actor, create_test_cause(), NOW)
}

pub const fn default_policy() -> LifecyclePolicy {
    LifecyclePolicy {
        allow_ticket_reopen: false,
        allow_intervention_changes_after_close: false,
    }
}

/// Creates the first admin directly through the engine, the way a
/// deployment bootstrap does.
fn bootstrap_admin(persistence: &mut Persistence) -> User {
    let system = OperationContext::new(
        Actor::new(0, String::from("system"), UserRole::Admin),
        Cause::new(String::from("bootstrap"), String::from("Test bootstrap")),
        NOW,
    );
    let user = NewUser {
        login: String::from("admin"),
        display_name: String::from("Administrateur"),
        role: UserRole::Admin,
        client_id: None,
        matricule: Some(String::from("AD001")),
        email: None,
        phone: None,
    };
    let result = create_user(user, None, &system).unwrap();
    persistence.persist_transition(&result).unwrap();
    persistence.find_user_by_login("admin").unwrap().unwrap()
}

/// A store seeded through the API: one client with a site, a DOE and an
/// affaire, an agent (matricule AG001) and a client user.
pub struct TestApp {
    pub persistence: Persistence,
    pub admin: RequestContext,
    pub agent: RequestContext,
    pub client_user: RequestContext,
    pub client_id: i64,
    pub site_id: i64,
    pub doe_id: i64,
    pub affaire_id: i64,
}

impl TestApp {
    pub fn seeded() -> Self {
        let mut persistence = Persistence::new_in_memory().expect("in-memory store");
        let admin = context_for(AuthenticatedActor::new(bootstrap_admin(&mut persistence)));

        let client_id = create_client(
            &mut persistence,
            &admin,
            CreateClientRequest {
                name: String::from("Résidence Les Tilleuls"),
                contact_name: Some(String::from("Mme Durand")),
                contact_email: Some(String::from("syndic@tilleuls.fr")),
                contact_phone: None,
                comment: None,
                address_id: None,
            },
        )
        .unwrap()
        .id;
        let site_id = create_site(
            &mut persistence,
            &admin,
            CreateSiteRequest {
                name: String::from("Bâtiment B"),
                client_id: Some(client_id),
                address_id: None,
                status: None,
                responsible_agent_id: None,
                comment: None,
            },
        )
        .unwrap()
        .id;
        let doe_id = create_doe(
            &mut persistence,
            &admin,
            CreateDoeRequest {
                site_id,
                title: String::from("DOE toiture"),
            },
        )
        .unwrap()
        .id;
        let affaire_id = create_affaire(
            &mut persistence,
            &admin,
            CreateAffaireRequest {
                title: String::from("Entretien annuel"),
                client_id: Some(client_id),
            },
        )
        .unwrap()
        .id;

        let agent = Self::add_user(&mut persistence, &admin, "agent.martin", "agent", None);
        let client_user = Self::add_user(
            &mut persistence,
            &admin,
            "client.tilleuls",
            "client",
            Some(client_id),
        );

        Self {
            persistence,
            admin,
            agent,
            client_user,
            client_id,
            site_id,
            doe_id,
            affaire_id,
        }
    }

    /// Creates a user through the API and returns a context acting as them.
    pub fn add_user(
        persistence: &mut Persistence,
        admin: &RequestContext,
        login: &str,
        role: &str,
        client_id: Option<i64>,
    ) -> RequestContext {
        let matricule = (role == "agent").then(|| String::from("AG001"));
        api_create_user(
            persistence,
            admin,
            CreateUserRequest {
                login: login.to_string(),
                display_name: login.to_string(),
                role: role.to_string(),
                client_id,
                matricule,
                email: None,
                phone: None,
            },
        )
        .unwrap();
        let actor = AuthenticationService::authenticate(persistence, Some(login)).unwrap();
        context_for(actor)
    }

    /// Adds a second client with its own site and user.
    pub fn add_other_client(&mut self) -> (i64, i64, RequestContext) {
        let client_id = create_client(
            &mut self.persistence,
            &self.admin,
            CreateClientRequest {
                name: String::from("Copropriété du Parc"),
                contact_name: None,
                contact_email: None,
                contact_phone: None,
                comment: None,
                address_id: None,
            },
        )
        .unwrap()
        .id;
        let site_id = create_site(
            &mut self.persistence,
            &self.admin,
            CreateSiteRequest {
                name: String::from("Parking"),
                client_id: Some(client_id),
                address_id: None,
                status: None,
                responsible_agent_id: None,
                comment: None,
            },
        )
        .unwrap()
        .id;
        let user = Self::add_user(
            &mut self.persistence,
            &self.admin,
            "client.parc",
            "client",
            Some(client_id),
        );
        (client_id, site_id, user)
    }

    pub fn demande_request(&self, title: &str) -> CreateDemandeRequest {
        CreateDemandeRequest {
            client_id: self.client_id,
            site_id: self.site_id,
            title: title.to_string(),
            description: String::from("Fuite au plafond du hall"),
        }
    }

    /// Files a demande as the client user.
    pub fn file_demande(&mut self, title: &str) -> i64 {
        let request = self.demande_request(title);
        create_demande(&mut self.persistence, &self.client_user, request)
            .unwrap()
            .id
    }

    pub fn conversion_request(&self) -> ConvertDemandeRequest {
        ConvertDemandeRequest {
            title: None,
            description: None,
            affaire_id: self.affaire_id,
            doe_id: self.doe_id,
            started_at: None,
        }
    }

    /// Files and converts a demande; returns `(demande_id, ticket_id)`.
    pub fn open_ticket(&mut self, title: &str) -> (i64, i64) {
        let demande_id = self.file_demande(title);
        let request = self.conversion_request();
        let response =
            convert_demande(&mut self.persistence, &self.admin, demande_id, request).unwrap();
        (demande_id, response.ticket_id)
    }

    pub fn assign_request() -> AssignRequest {
        AssignRequest {
            matricule: String::from("AG001"),
            role_label: Some(String::from("chef d'équipe")),
        }
    }
}
