//! Partner network queries.

use crate::db::PortalStore;
use crate::error::Result;
use crate::models::{Bpn, Company, Page};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Row shape returned to callers; omits internal process links.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCompany {
    pub company_id: uuid::Uuid,
    pub name: String,
    pub bpn: Bpn,
}

pub struct PartnerNetworkService {
    store: Arc<dyn PortalStore>,
}

impl PartnerNetworkService {
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    /// Paginated active member companies, optionally filtered by BPN.
    ///
    /// Filter values are normalized (trimmed, uppercased) before querying;
    /// a malformed BPN is rejected rather than silently matching nothing.
    pub async fn get_member_companies(
        &self,
        page: u32,
        page_size: Option<u32>,
        bpn_filter: &[String],
    ) -> Result<Page<MemberCompany>> {
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let bpns = bpn_filter
            .iter()
            .map(|raw| raw.parse::<Bpn>())
            .collect::<Result<Vec<Bpn>>>()?;

        let companies = self
            .store
            .get_active_member_companies(&bpns, page, page_size)
            .await?;

        let Page { meta, content } = companies;
        let content = content
            .into_iter()
            .map(to_member)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page { meta, content })
    }
}

fn to_member(company: Company) -> Result<MemberCompany> {
    let Company { id, name, bpn, .. } = company;
    // The member query is restricted to rows with a BPN.
    let bpn = bpn.ok_or_else(|| {
        crate::error::Error::Internal(format!("member company {id} has no bpn"))
    })?;
    Ok(MemberCompany {
        company_id: id,
        name,
        bpn,
    })
}
