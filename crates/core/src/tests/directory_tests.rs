// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CoreError, ImportedSite, Mutation, NewAddress, NewAssociation, NewContract, NewUser,
    SitePatch, create_association, create_contract, create_user, import_sites,
    link_contract_site, update_site,
};
use fieldops_domain::{DomainError, ErrorKind, SiteStatus, UserRole};
use time::macros::date;

use super::helpers::{create_test_client, create_test_context, create_test_site, create_test_user};

fn new_user(role: UserRole, client_id: Option<i64>) -> NewUser {
    NewUser {
        login: String::from("mdupont"),
        display_name: String::from("Marie Dupont"),
        role,
        client_id,
        matricule: None,
        email: Some(String::from("marie.dupont@example.fr")),
        phone: None,
    }
}

#[test]
fn test_client_user_requires_existing_client() {
    let client = create_test_client();
    let ctx = create_test_context();

    assert!(create_user(new_user(UserRole::Client, Some(42)), Some(&client), &ctx).is_ok());

    let err = create_user(new_user(UserRole::Client, None), None, &ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = create_user(new_user(UserRole::Client, Some(99)), None, &ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = create_user(new_user(UserRole::Agent, Some(42)), Some(&client), &ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_user_login_cannot_contain_spaces() {
    let mut user = new_user(UserRole::Admin, None);
    user.login = String::from("m dupont");
    let err = create_user(user, None, &create_test_context()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidField { field: "login", .. })
    ));
}

#[test]
fn test_contract_window_and_site_links() {
    let client = create_test_client();
    let ctx = create_test_context();
    let contract = NewContract {
        client_id: 42,
        title: String::from("Maintenance"),
        start_date: date!(2026 - 12 - 31),
        end_date: date!(2026 - 01 - 01),
        comment: None,
    };
    let err = create_contract(contract, Some(&client), &ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored = fieldops_domain::Contract {
        contract_id: 4,
        client_id: 42,
        title: String::from("Maintenance"),
        start_date: date!(2026 - 01 - 01),
        end_date: date!(2026 - 12 - 31),
        comment: None,
    };
    let site = create_test_site();
    assert!(link_contract_site(&stored, &site, &ctx).is_ok());

    let mut foreign = create_test_site();
    foreign.client_id = Some(99);
    assert!(matches!(
        link_contract_site(&stored, &foreign, &ctx).unwrap_err(),
        CoreError::DomainViolation(DomainError::SiteClientMismatch { .. })
    ));
}

#[test]
fn test_association_requires_billing_email() {
    let association = NewAssociation {
        title: String::from("Copropriété du Parc"),
        billing_email: String::from("not-an-email"),
        address_id: None,
    };
    let err = create_association(association, None, &create_test_context()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidField {
            field: "billing_email",
            ..
        })
    ));
}

#[test]
fn test_update_site_assigns_staff_agent() {
    let site = create_test_site();
    let agent = create_test_user(5, UserRole::Agent);
    let patch = SitePatch {
        status: Some(SiteStatus::Inactive),
        responsible_agent_id: Some(5),
        ..SitePatch::default()
    };

    let result = update_site(&site, patch, None, None, Some(&agent), &create_test_context())
        .unwrap();
    let Mutation::UpdateSite(updated) = result.mutation else {
        panic!("expected UpdateSite");
    };
    assert_eq!(updated.status, SiteStatus::Inactive);
    assert_eq!(updated.responsible_agent_id, Some(5));
    assert_eq!(updated.client_id, Some(42));
}

#[test]
fn test_update_site_rejects_client_as_agent() {
    let site = create_test_site();
    let client_user = create_test_user(9, UserRole::Client);
    let patch = SitePatch {
        responsible_agent_id: Some(9),
        ..SitePatch::default()
    };

    let err = update_site(
        &site,
        patch,
        None,
        None,
        Some(&client_user),
        &create_test_context(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_import_sites_validates_every_row() {
    let client = create_test_client();
    let ctx = create_test_context();
    let row = |name: &str, city: &str| ImportedSite {
        name: String::from(name),
        address: NewAddress {
            line1: String::from("3 rue des Lilas"),
            line2: None,
            postal_code: String::from("69003"),
            city: String::from(city),
            country: None,
        },
        comment: None,
    };

    let result = import_sites(&client, vec![row("A", "Lyon"), row("B", "Lyon")], &ctx).unwrap();
    assert!(matches!(result.mutation, Mutation::ImportSites { ref sites, .. } if sites.len() == 2));

    assert!(import_sites(&client, vec![row("A", "Lyon"), row("B", " ")], &ctx).is_err());
    assert!(import_sites(&client, Vec::new(), &ctx).is_err());
}
