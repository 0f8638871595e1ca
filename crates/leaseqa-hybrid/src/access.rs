//! Per-request document entitlement.
//!
//! Requested ids the user cannot read, or that do not exist, are dropped
//! without error so callers learn nothing about documents outside their
//! reach. Only an unreachable entitlement source is an error.

use std::collections::BTreeSet;

use leaseqa_core::error::{Error, Result};
use leaseqa_core::traits::EntitlementSource;
use leaseqa_core::types::{DocumentId, EntitlementSet};

pub const UNTITLED_DOCUMENT: &str = "Untitled document";

pub async fn validate_document_access<A>(source: &A, user_id: &str, requested: &BTreeSet<DocumentId>) -> Result<EntitlementSet>
where
    A: EntitlementSource + ?Sized,
{
    if requested.is_empty() { return Ok(EntitlementSet::default()); }

    let orgs = source.organizations_for_user(user_id).await.map_err(unavailable)?;
    if orgs.is_empty() {
        tracing::debug!(requested = requested.len(), granted = 0, "user belongs to no organization");
        return Ok(EntitlementSet::default());
    }

    let documents = source.documents(requested).await.map_err(unavailable)?;
    let mut access = EntitlementSet::default();
    for doc in documents {
        if !requested.contains(&doc.id) || !orgs.contains(&doc.org_id) { continue; }
        let title = if doc.title.trim().is_empty() { UNTITLED_DOCUMENT.to_string() } else { doc.title };
        access.titles.insert(doc.id.clone(), title);
        access.valid_ids.insert(doc.id);
    }
    tracing::debug!(
        requested = requested.len(),
        granted = access.valid_ids.len(),
        dropped = requested.len() - access.valid_ids.len(),
        "validated document access"
    );
    Ok(access)
}

fn unavailable(e: Error) -> Error {
    match e {
        Error::EntitlementUnavailable(_) => e,
        other => Error::EntitlementUnavailable(other.to_string()),
    }
}
