// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::TestApp;
use crate::{
    ApiError, CsvRowStatus, ImportSitesRequest, get_client_relations, get_site_relations,
    import_sites_csv, preview_site_csv,
};

const MIXED_CSV: &str = "\
Name,Address Line1,Postal Code,City,Comment
Bâtiment A,12 rue des Lilas,69003,Lyon,Accès par la cour
,3 avenue Foch,69006,Lyon,
Chaufferie,8 impasse Verte,,Villeurbanne,
Parking nord,1 place Bellecour,69002,Lyon,
";

fn request(csv: &str, preview_only: bool) -> ImportSitesRequest {
    ImportSitesRequest {
        csv_content: csv.to_string(),
        preview_only,
    }
}

#[test]
fn test_missing_header_rejects_file() {
    let csv = "name,city\nBâtiment A,Lyon\n";

    let result = preview_site_csv(csv);

    match result {
        Err(ApiError::InvalidCsvFormat { reason }) => {
            assert!(reason.contains("address_line1"));
            assert!(reason.contains("postal_code"));
        }
        other => panic!("expected InvalidCsvFormat, got {other:?}"),
    }
}

#[test]
fn test_preview_reports_each_row() {
    let rows = preview_site_csv(MIXED_CSV).expect("preview");

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].row_number, 1);
    assert_eq!(rows[0].status, CsvRowStatus::Valid);
    assert_eq!(rows[0].comment.as_deref(), Some("Accès par la cour"));

    assert_eq!(rows[1].status, CsvRowStatus::Invalid);
    assert!(rows[1].errors.iter().any(|e| e.contains("name")));

    assert_eq!(rows[2].status, CsvRowStatus::Invalid);
    assert!(rows[2].errors.iter().any(|e| e.contains("postal_code")));

    assert_eq!(rows[3].status, CsvRowStatus::Valid);
    assert!(rows.iter().all(|r| r.site_id.is_none()));
}

#[test]
fn test_duplicate_names_within_file() {
    let csv = "name,address_line1,postal_code,city\n\
               Hall,1 rue A,69001,Lyon\n\
               hall ,2 rue B,69001,Lyon\n";

    let rows = preview_site_csv(csv).expect("preview");

    assert_eq!(rows[0].status, CsvRowStatus::Valid);
    assert_eq!(rows[1].status, CsvRowStatus::Invalid);
    assert!(rows[1].errors[0].contains("duplicate"));
}

#[test]
fn test_preview_only_creates_nothing() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;

    let result = import_sites_csv(
        &mut app.persistence,
        &app.admin,
        client_id,
        &request(MIXED_CSV, true),
    )
    .expect("preview");

    assert!(!result.imported);
    assert_eq!(result.event_id, None);
    assert_eq!(result.total_rows, 4);
    assert_eq!(result.valid_count, 2);
    assert_eq!(result.invalid_count, 2);

    let relations =
        get_client_relations(&mut app.persistence, &app.admin, client_id).expect("relations");
    assert_eq!(relations.sites.len(), 1);
}

#[test]
fn test_import_creates_valid_rows_with_addresses() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;

    let result = import_sites_csv(
        &mut app.persistence,
        &app.admin,
        client_id,
        &request(MIXED_CSV, false),
    )
    .expect("import");

    assert!(result.imported);
    assert!(result.event_id.is_some());
    let created: Vec<i64> = result.rows.iter().filter_map(|r| r.site_id).collect();
    assert_eq!(created.len(), 2);
    assert_eq!(result.rows[1].site_id, None);

    let relations =
        get_client_relations(&mut app.persistence, &app.admin, client_id).expect("relations");
    assert_eq!(relations.sites.len(), 3);

    let site = get_site_relations(&mut app.persistence, &app.admin, created[0]).expect("site");
    assert_eq!(site.site.name, "Bâtiment A");
    let address = site.address.expect("imported address");
    assert_eq!(address.line1, "12 rue des Lilas");
    assert_eq!(address.city, "Lyon");
}

#[test]
fn test_name_already_used_by_client_is_invalid() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;
    let csv = "name,address_line1,postal_code,city\n\
               bâtiment b,4 rue du Parc,69003,Lyon\n\
               Bâtiment C,5 rue du Parc,69003,Lyon\n";

    let result = import_sites_csv(&mut app.persistence, &app.admin, client_id, &request(csv, false))
        .expect("import");

    assert_eq!(result.rows[0].status, CsvRowStatus::Invalid);
    assert!(result.rows[0].errors[0].contains("already has a site"));
    assert_eq!(result.valid_count, 1);
}

#[test]
fn test_import_without_valid_rows_is_invalid() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;
    let csv = "name,address_line1,postal_code,city\n,,,\n";

    let result = import_sites_csv(&mut app.persistence, &app.admin, client_id, &request(csv, false));

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_import_for_unknown_client_is_not_found() {
    let mut app = TestApp::seeded();

    let result = import_sites_csv(
        &mut app.persistence,
        &app.admin,
        999,
        &request(MIXED_CSV, false),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_agent_cannot_import() {
    let mut app = TestApp::seeded();
    let client_id = app.client_id;

    let result = import_sites_csv(
        &mut app.persistence,
        &app.agent,
        client_id,
        &request(MIXED_CSV, true),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}
