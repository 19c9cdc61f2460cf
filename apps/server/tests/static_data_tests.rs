//! Static reference-data lookups.

mod support;

use hanse::config::OperatorConfig;
use hanse::models::{Language, LicenseType, LocalizedName, OperatorBpn, UseCase};
use hanse::services::StaticDataService;
use std::sync::Arc;
use support::*;
use uuid::Uuid;

fn operator() -> OperatorConfig {
    OperatorConfig {
        operator_name: "Portal Operator".to_string(),
        operator_bpn: "BPNL000000000000".to_string(),
    }
}

#[tokio::test]
async fn passes_reference_data_through() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_use_case(UseCase {
        id: Uuid::new_v4(),
        name: "Traceability".to_string(),
        shortname: "T".to_string(),
    });
    store.insert_license_type(LicenseType {
        id: 1,
        name: "COTS".to_string(),
    });
    store.insert_language(Language {
        short_name: "de".to_string(),
        long_names: vec![LocalizedName {
            language: "en".to_string(),
            long_name: "German".to_string(),
        }],
    });
    let service = StaticDataService::new(store, operator());

    assert_eq!(service.get_use_cases().await.unwrap().len(), 1);
    assert_eq!(service.get_license_types().await.unwrap().len(), 1);
    let languages = service.get_languages().await.unwrap();
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].long_names[0].long_name, "German");
}

#[tokio::test]
async fn configured_operator_is_merged_with_stored_rows() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_operator_bpn(OperatorBpn {
        operator_name: "Other Operator".to_string(),
        bpn: bpn("BPNL000000000009"),
    });
    let service = StaticDataService::new(store, operator());

    let operators = service.get_operator_bpns().await.unwrap();
    assert_eq!(operators.len(), 2);
    assert_eq!(operators[0].operator_name, "Portal Operator");
    assert_eq!(operators[0].bpn.as_str(), "BPNL000000000000");
    assert_eq!(operators[1].operator_name, "Other Operator");
}

#[tokio::test]
async fn stored_row_matching_the_configured_operator_is_deduplicated() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_operator_bpn(OperatorBpn {
        operator_name: "Stale Name".to_string(),
        bpn: bpn("BPNL000000000000"),
    });
    let service = StaticDataService::new(store, operator());

    let operators = service.get_operator_bpns().await.unwrap();
    assert_eq!(operators.len(), 1);
    // Configuration wins over the stored row.
    assert_eq!(operators[0].operator_name, "Portal Operator");
}
