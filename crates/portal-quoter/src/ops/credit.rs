//! Credit applications.

use crate::error::Result;
use crate::ops::companies::validate_nexus_id;
use crate::session::{PortalResponse, PortalSession};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewApplication<'a> {
    company_id: &'a str,
    omron_customer_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Approval<'a> {
    omron_id: &'a str,
}

impl PortalSession {
    /// Credit applications of a company, as returned by the portal.
    pub async fn credit_applications(&mut self, company_id: &str) -> Result<Value> {
        let url = self.endpoints().credit_applications(company_id);
        let resp = self.get(&url).await?.error_for_status()?;
        resp.json()
    }

    /// Open a credit application for a company that already has a nexus id.
    pub async fn submit_credit_application(
        &mut self,
        company_id: &str,
        nexus_id: &str,
    ) -> Result<PortalResponse> {
        validate_nexus_id(nexus_id)?;
        let url = self.endpoints().new_credit_application();
        let body = NewApplication {
            company_id,
            omron_customer_id: nexus_id,
        };
        let resp = self.post_json(&url, &body).await?.error_for_status()?;
        info!(company_id, nexus_id, "submitted credit application");
        Ok(resp)
    }

    pub async fn approve_credit_application(
        &mut self,
        company_id: &str,
        application_id: &str,
        nexus_id: &str,
    ) -> Result<PortalResponse> {
        validate_nexus_id(nexus_id)?;
        let url = self
            .endpoints()
            .approve_credit_application(company_id, application_id, nexus_id);
        let resp = self
            .post_json(&url, &Approval { omron_id: nexus_id })
            .await?
            .error_for_status()?;
        info!(company_id, application_id, "approved credit application");
        Ok(resp)
    }
}
