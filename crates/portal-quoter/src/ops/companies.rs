//! Companies, contacts and company verification.

use crate::error::{PortalError, Result};
use crate::ops::has_message;
use crate::records::{value_to_id, CompanyRecord, NewContact};
use crate::session::{PortalResponse, PortalSession};
use portal_extract::extract_let_block;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const COMPANY_CREATED: &str = "Company successfully created";
const CONTACT_DELETED: &str = "Contact successfully deleted";
const CUSTOMER_DELETED: &str = "Customer successfully deleted";

/// Check a nexus id: exactly six ASCII digits.
pub fn validate_nexus_id(nexus_id: &str) -> Result<()> {
    if nexus_id.len() == 6 && nexus_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PortalError::InvalidArgument(format!(
            "nexus id must be six digits, got '{nexus_id}'"
        )))
    }
}

impl PortalSession {
    /// All customers known to the portal.
    ///
    /// The list is slow to produce, so the first result is kept for the
    /// life of the session. Pass `reload` to fetch it again.
    pub async fn list_companies(&mut self, reload: bool) -> Result<&[Value]> {
        if reload || self.companies.is_none() {
            let url = self.endpoints().all_customers();
            let resp = self.get(&url).await?.error_for_status()?;
            let body: Value = resp.json()?;
            let list = body
                .pointer("/customerData/allCustomers/dataSource")
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| {
                    PortalError::shape(&url, "no customerData.allCustomers.dataSource array")
                })?;
            info!(count = list.len(), "fetched company list");
            self.companies = Some(list);
        } else {
            debug!("using cached company list");
        }

        Ok(self.companies.as_deref().unwrap_or_default())
    }

    /// The data block of a company page. Empty when the page has none.
    pub async fn company_info(&mut self, company_id: &str) -> Result<CompanyRecord> {
        let url = self.endpoints().company(company_id);
        let resp = self.get(&url).await?.error_for_status()?;

        let vars = extract_let_block(&resp.body);
        if vars.is_empty() {
            debug!(company_id, "company page has no data block");
        }
        self.note_extraction(&url, &vars);
        Ok(CompanyRecord::new(vars))
    }

    /// Create a company and return its id.
    pub async fn add_company(&mut self, name: &str, nexus_id: Option<&str>) -> Result<String> {
        let mut form = Map::new();
        form.insert("companyName".to_string(), Value::from(name));
        if let Some(nexus_id) = nexus_id {
            validate_nexus_id(nexus_id)?;
            form.insert("nexusId".to_string(), Value::from(nexus_id));
        }

        let url = self.endpoints().new_customer();
        let resp = self.post_form(&url, &form).await?;
        if !has_message(&resp, COMPANY_CREATED) {
            return Err(rejected("company creation", &resp));
        }

        let body: Value = resp.json()?;
        let id = body
            .pointer("/data/id")
            .and_then(value_to_id)
            .ok_or_else(|| PortalError::shape(&url, "no data.id in response"))?;
        info!(company_id = %id, name, "created company");
        Ok(id)
    }

    /// Add a contact to a company. The response does not carry the new
    /// contact id; read it back with [`company_info`](Self::company_info).
    pub async fn add_contact(&mut self, company_id: &str, contact: &NewContact) -> Result<PortalResponse> {
        let url = self.endpoints().add_contact(company_id);
        let resp = self.post_json(&url, contact).await?.error_for_status()?;
        info!(company_id, email = %contact.email_address, "added contact");
        Ok(resp)
    }

    /// Delete one contact. Returns whether the portal confirmed it.
    pub async fn delete_contact(&mut self, company_id: &str, contact_id: &str) -> Result<bool> {
        let url = self.endpoints().contact(company_id, contact_id);
        let resp = self.delete(&url).await?;
        let deleted = has_message(&resp, CONTACT_DELETED);
        if deleted {
            info!(company_id, contact_id, "deleted contact");
        } else {
            warn!(company_id, contact_id, status = resp.status, "contact not deleted");
        }
        Ok(deleted)
    }

    /// Delete a company, optionally deleting its contacts first.
    /// Returns whether the portal confirmed the company deletion.
    pub async fn delete_company(&mut self, company_id: &str, delete_contacts_first: bool) -> Result<bool> {
        if delete_contacts_first {
            let info = self.company_info(company_id).await?;
            if info.is_empty() {
                return Err(PortalError::shape(
                    &self.endpoints().company(company_id),
                    "company page has no data block",
                ));
            }
            for contact in info.contacts() {
                self.delete_contact(company_id, &contact.id).await?;
            }
        }

        let url = self.endpoints().delete_company(company_id);
        let resp = self.delete(&url).await?;
        let deleted = has_message(&resp, CUSTOMER_DELETED);
        if deleted {
            info!(company_id, "deleted company");
            if let Some(list) = self.companies.as_mut() {
                list.retain(|c| c.get("id").and_then(value_to_id).as_deref() != Some(company_id));
            }
        } else {
            warn!(company_id, status = resp.status, "company not deleted");
        }
        Ok(deleted)
    }

    /// Mark a company as verified.
    pub async fn manually_verify(&mut self, company_id: &str) -> Result<PortalResponse> {
        let url = self.endpoints().manually_verify(company_id);
        let resp = self.post_empty(&url).await?.error_for_status()?;
        info!(company_id, "manually verified company");
        Ok(resp)
    }
}

fn rejected(action: &str, resp: &PortalResponse) -> PortalError {
    PortalError::Rejected {
        action: action.to_string(),
        message: resp
            .message()
            .unwrap_or_else(|| format!("status {}", resp.status)),
    }
}
