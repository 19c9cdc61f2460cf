//! Partner network member queries.

mod support;

use hanse::models::CompanyStatus;
use hanse::services::PartnerNetworkService;
use hanse::Error;
use std::sync::Arc;
use support::*;

#[tokio::test]
async fn lists_active_members_with_pagination() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    for i in 0..15 {
        store.insert_company(active_company(
            &format!("Company {i:02}"),
            &format!("BPNL0000000000{i:02}"),
        ));
    }
    let service = PartnerNetworkService::new(store);

    let page = service.get_member_companies(0, Some(10), &[]).await.unwrap();
    assert_eq!(page.meta.total, 15);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.content.len(), 10);

    let page = service.get_member_companies(1, Some(10), &[]).await.unwrap();
    assert_eq!(page.content.len(), 5);
}

#[tokio::test]
async fn excludes_companies_that_are_not_active_members() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_company(active_company("Member", "BPNL000000000001"));

    let mut pending = active_company("Pending", "BPNL000000000002");
    pending.status = CompanyStatus::Pending;
    store.insert_company(pending);

    // No BPN assigned yet, so not a member.
    let mut no_bpn = active_company("No Bpn", "BPNL000000000003");
    no_bpn.bpn = None;
    store.insert_company(no_bpn);

    let service = PartnerNetworkService::new(store);
    let page = service.get_member_companies(0, None, &[]).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.content[0].name, "Member");
}

#[tokio::test]
async fn bpn_filter_is_normalized_before_matching() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_company(active_company("Alpha", "BPNL000000000001"));
    store.insert_company(active_company("Beta", "BPNL000000000002"));
    let service = PartnerNetworkService::new(store);

    let page = service
        .get_member_companies(0, None, &["  bpnl000000000002 ".to_string()])
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.content[0].bpn.as_str(), "BPNL000000000002");
}

#[tokio::test]
async fn malformed_bpn_filter_is_rejected() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_company(active_company("Alpha", "BPNL000000000001"));
    let service = PartnerNetworkService::new(store);

    let err = service
        .get_member_companies(0, None, &["not-a-bpn".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn page_size_is_defaulted_and_clamped() {
    let store = Arc::new(hanse::db::InMemoryPortalStore::new());
    store.insert_company(active_company("Alpha", "BPNL000000000001"));
    let service = PartnerNetworkService::new(store);

    let page = service.get_member_companies(0, None, &[]).await.unwrap();
    assert_eq!(page.meta.page_size, 10);

    let page = service.get_member_companies(0, Some(5000), &[]).await.unwrap();
    assert_eq!(page.meta.page_size, 100);

    let page = service.get_member_companies(0, Some(0), &[]).await.unwrap();
    assert_eq!(page.meta.page_size, 1);
}
