//! URL templates for the back-office portal.
//!
//! Every URL is built from the configured origin, so the same client can be
//! pointed at a staging portal or a local mock server.

/// Builds portal URLs from an origin.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn backend(&self, path: &str) -> String {
        format!("{}/backend-portal{path}", self.base)
    }

    // ── Session and users ───────────────────────────────────────────────────

    pub fn login(&self) -> String {
        self.backend("/auth/login")
    }

    pub fn backend_users(&self) -> String {
        self.backend("/users")
    }

    // ── Companies and contacts ──────────────────────────────────────────────

    pub fn all_customers(&self) -> String {
        self.backend("/customers/all-customer-data")
    }

    pub fn new_customer(&self) -> String {
        self.backend("/customers")
    }

    /// Company page; its inline `let` block carries the company record.
    pub fn company(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/companies/{company_id}"))
    }

    pub fn delete_company(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/{company_id}"))
    }

    pub fn manually_verify(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/{company_id}/manually-verify"))
    }

    pub fn add_contact(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/companies/{company_id}/contacts/create"))
    }

    pub fn contact(&self, company_id: &str, contact_id: &str) -> String {
        self.backend(&format!(
            "/customers/companies/{company_id}/contacts/{contact_id}"
        ))
    }

    // ── Credit applications ─────────────────────────────────────────────────

    pub fn credit_applications(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/{company_id}/credit-applications"))
    }

    /// Storefront endpoint, outside the backend portal.
    pub fn new_credit_application(&self) -> String {
        format!("{}/account/credit/new-application", self.base)
    }

    pub fn approve_credit_application(
        &self,
        company_id: &str,
        application_id: &str,
        nexus_id: &str,
    ) -> String {
        self.backend(&format!(
            "/customers/{company_id}/credit-applications/{application_id}/approve?omronId={nexus_id}"
        ))
    }

    // ── Orders ──────────────────────────────────────────────────────────────

    pub fn orders_by_date(&self, start_date: &str, end_date: &str) -> String {
        self.backend(&format!(
            "/orders/dateRange?startDate={start_date}&endDate={end_date}"
        ))
    }

    pub fn order(&self, order_id: &str) -> String {
        self.backend(&format!("/orders/{order_id}"))
    }

    // ── Quotes ──────────────────────────────────────────────────────────────

    /// Quote page; also the target of quote deletion.
    pub fn quote(&self, company_id: &str, quote_id: &str) -> String {
        self.backend(&format!(
            "/customers/companies/{company_id}/quotes/{quote_id}"
        ))
    }

    pub fn new_quote(&self, company_id: &str) -> String {
        self.backend(&format!("/customers/companies/{company_id}/quotes/create"))
    }

    pub fn quote_details(&self, company_id: &str, quote_id: &str) -> String {
        format!("{}/details", self.quote(company_id, quote_id))
    }

    pub fn section_line_items(&self, company_id: &str, quote_id: &str, section_id: &str) -> String {
        format!(
            "{}/sections/{section_id}/line-items",
            self.quote(company_id, quote_id)
        )
    }

    pub fn line_item(
        &self,
        company_id: &str,
        quote_id: &str,
        section_id: &str,
        line_id: &str,
    ) -> String {
        format!(
            "{}/{line_id}",
            self.section_line_items(company_id, quote_id, section_id)
        )
    }

    // ── Catalog ─────────────────────────────────────────────────────────────

    pub fn series_search(&self) -> String {
        format!("{}/series/full-search", self.base)
    }
}
