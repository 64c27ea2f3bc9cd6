//! Orders.

use crate::error::Result;
use crate::records::quote::validate_date;
use crate::session::PortalSession;
use portal_extract::{extract_display_fields, DisplayField};
use serde_json::Value;
use tracing::{debug, info};

impl PortalSession {
    /// Orders placed between two dates (`YYYY-MM-DD`, inclusive as the
    /// portal defines it).
    pub async fn orders_by_date(&mut self, start_date: &str, end_date: &str) -> Result<Value> {
        validate_date("start date", start_date)?;
        validate_date("end date", end_date)?;

        let url = self.endpoints().orders_by_date(start_date, end_date);
        let resp = self.get(&url).await?.error_for_status()?;
        let orders = resp.json()?;
        info!(start_date, end_date, "fetched orders by date");
        Ok(orders)
    }

    /// Labelled fields of an order page, in page order.
    pub async fn order_details(&mut self, order_id: &str) -> Result<Vec<DisplayField>> {
        let url = self.endpoints().order(order_id);
        let resp = self.get(&url).await?.error_for_status()?;
        let fields = extract_display_fields(&resp.body);
        if fields.is_empty() {
            debug!(order_id, "order page has no display fields");
        }
        Ok(fields)
    }
}
