use assert_json_diff::assert_json_eq;
use portal_quoter::{
    Credentials, FailureReason, LineItem, NewContact, NewQuote, PortalClient, PortalConfig,
    PortalError, PortalSession, QuoteDetailsUpdate, Rank, Series,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const COMPANY_PAGE: &str = r#"<html><head><title>Acme</title></head><body>
<script src="/static/app.js"></script>
<script>
    let company = {"id": "co-1", "name": "Acme; Pty Ltd"};
    let contacts = [{"id": "ct-1", "firstName": "Ada"}, {"id": "ct-2", "firstName": "Grace"}];
    let created = new Date();
</script>
<script>
    let ignored = 1;
</script>
</body></html>"#;

const QUOTE_PAGE: &str = r#"<html><body>
<script>
    var activeQuoteBody = {"sections": [{"id": "s1"}, {"id": "s2"}], "status": "draft"};
</script>
<script>
    var participants = {"quoteParticipants": ["u2"]};
    var customerContactDataSource = [{"id": "ct-1", "text": "Ada"}];
    var assignee = {"teamId": "t1", "assigneeId": "u1"};
</script>
<script>
    var quote = {"id": "q1", "title": "Pumps", "status": "sent"};
</script>
</body></html>"#;

async fn logged_in(server: &MockServer) -> PortalSession {
    Mock::given(method("POST"))
        .and(path("/backend-portal/auth/login"))
        .and(body_string_contains("emailAddress=me%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Success"})))
        .mount(server)
        .await;

    let config = PortalConfig::new(&server.uri()).unwrap();
    PortalClient::new(&config)
        .unwrap()
        .login(&Credentials::new("me@example.com", "pw"))
        .await
        .unwrap()
}

/// Match series searches whose `filter` restricts to `series`.
fn filter_names(series: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| {
        req.url.query_pairs().any(|(key, value)| {
            key == "filter"
                && serde_json::from_str::<serde_json::Value>(&value)
                    .map(|f| f["restrictToSeriesNames"] == json!([series]))
                    .unwrap_or(false)
        })
    }
}

// ── Login ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    assert_eq!(session.email(), "me@example.com");
    assert!(session.diagnostics().is_none());
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/backend-portal/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Invalid email address or password"})),
        )
        .mount(&server)
        .await;

    let config = PortalConfig::new(&server.uri()).unwrap();
    let err = PortalClient::new(&config)
        .unwrap()
        .login(&Credentials::new("me@example.com", "wrong"))
        .await
        .unwrap_err();
    match err {
        PortalError::LoginRejected { message } => {
            assert_eq!(message, "Invalid email address or password")
        }
        other => panic!("unexpected error {other:?}"),
    }
}

// ── Companies ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_company_info_reads_let_block() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await.with_diagnostics();
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/companies/co-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .mount(&server)
        .await;

    let record = session.company_info("co-1").await.unwrap();
    assert_eq!(record.get("company").unwrap()["name"], "Acme; Pty Ltd");
    assert!(record.get("ignored").is_none());

    let contacts = record.contacts();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[1].first_name.as_deref(), Some("Grace"));

    assert_eq!(record.get("created").unwrap(), "new Date()");
    let diag = session.diagnostics().unwrap();
    assert_eq!(diag.raw_fallbacks[0].names, vec!["created".to_string()]);
    assert_eq!(diag.last_request.as_ref().unwrap().status, 200);
}

#[tokio::test]
async fn test_list_companies_is_cached() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/all-customer-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customerData": {"allCustomers": {"dataSource": [{"id": "co-1"}, {"id": "co-2"}]}}
        })))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(session.list_companies(false).await.unwrap().len(), 2);
    assert_eq!(session.list_companies(false).await.unwrap().len(), 2);
    assert_eq!(session.list_companies(true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_companies_bad_shape() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/all-customer-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"customerData": {}})))
        .mount(&server)
        .await;

    let err = assert_err!(session.list_companies(false).await);
    assert!(matches!(err, PortalError::UnexpectedShape { .. }));
}

#[tokio::test]
async fn test_add_company_returns_id() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers"))
        .and(body_string_contains("companyName=Acme"))
        .and(body_string_contains("nexusId=123456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Company successfully created",
            "data": {"id": "co-9"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = assert_ok!(session.add_company("Acme", Some("123456")).await);
    assert_eq!(id, "co-9");

    let err = session.add_company("Acme", Some("12345")).await.unwrap_err();
    assert!(matches!(err, PortalError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_add_company_rejected() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Company already exists"})),
        )
        .mount(&server)
        .await;

    match session.add_company("Acme", None).await.unwrap_err() {
        PortalError::Rejected { message, .. } => assert_eq!(message, "Company already exists"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_add_contact_sends_normalised_rank() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await.with_diagnostics();
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers/companies/co-1/contacts/create"))
        .and(body_json(json!({
            "rank": "management",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "emailAddress": "ada@example.com"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let contact = NewContact::new(
        "Ada",
        "Lovelace",
        "ada@example.com",
        Rank::normalise("Management"),
    );
    session.add_contact("co-1", &contact).await.unwrap();

    let payload = session.diagnostics().unwrap().last_payload.clone().unwrap();
    assert_eq!(payload["rank"], "management");
}

#[tokio::test]
async fn test_delete_company_with_contacts() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/companies/co-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMPANY_PAGE))
        .mount(&server)
        .await;
    for contact in ["ct-1", "ct-2"] {
        Mock::given(method("DELETE"))
            .and(path(format!(
                "/backend-portal/customers/companies/co-1/contacts/{contact}"
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Contact successfully deleted"})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/backend-portal/customers/co-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Customer successfully deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert!(session.delete_company("co-1", true).await.unwrap());
}

#[tokio::test]
async fn test_delete_contact_unconfirmed() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/backend-portal/customers/companies/co-1/contacts/ct-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
        .mount(&server)
        .await;

    assert!(!session.delete_contact("co-1", "ct-1").await.unwrap());
}

// ── Orders and users ────────────────────────────────────────────────────

#[tokio::test]
async fn test_order_details() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/orders/o-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="display-fields-container">
                 <h6>Purchase Order Number</h6><p> 212129726 </p>
                 <h6>Status</h6><p>Shipped</p>
               </div>"#,
        ))
        .mount(&server)
        .await;

    let fields = session.order_details("o-1").await.unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].label, "Purchase Order Number");
    assert_eq!(fields[0].value, "212129726");
    assert_eq!(fields[1].value, "Shipped");
}

#[tokio::test]
async fn test_orders_by_date_validates_dates() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    let err = assert_err!(session.orders_by_date("2024-1-1", "2024-02-01").await);
    assert!(matches!(err, PortalError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_list_backend_users() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<script>\n  let users = [{\"id\": \"u1\"}, {\"id\": \"u2\"}];\n</script>",
        ))
        .mount(&server)
        .await;

    let users = session.list_backend_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1]["id"], "u2");
}

// ── Quotes ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_quote_info_merges_blocks() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/q1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_PAGE))
        .mount(&server)
        .await;

    let record = session.quote_info("co-1", "q1").await.unwrap();
    assert_eq!(record.get("status").unwrap(), "draft");
    assert_eq!(record.last_section_id().as_deref(), Some("s2"));
    assert_eq!(record.quote().unwrap()["title"], "Pumps");
    assert_eq!(record.assignee().unwrap()["assigneeId"], "u1");
    assert_eq!(record.quote_participants(), Some(&json!(["u2"])));
}

#[tokio::test]
async fn test_quote_info_ambiguous_markers() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    let page = QUOTE_PAGE.replace(
        "var quote = {\"id\": \"q1\"",
        "var participants = 1; var customerContactDataSource = 2; var quote = {\"id\": \"q1\"",
    );
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/q1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let err = session.quote_info("co-1", "q1").await.unwrap_err();
    assert!(matches!(err, PortalError::Extract(_)));
}

#[tokio::test]
async fn test_new_quote_returns_id() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/create"))
        .and(body_json(json!({
            "projectId": "",
            "expiryDate": "2024-09-08",
            "title": "Pumps",
            "customerContactId": "ct-1",
            "isSpr": true,
            "description": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quoteId": 321})))
        .expect(1)
        .mount(&server)
        .await;

    let quote = NewQuote::new("Pumps", "2024-09-08", "ct-1").special_price_request(true);
    assert_eq!(session.new_quote("co-1", &quote).await.unwrap(), "321");

    let bad = NewQuote::new("Pumps", "08-09-2024", "ct-1");
    assert!(matches!(
        session.new_quote("co-1", &bad).await,
        Err(PortalError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_add_item_to_quote() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    let section = "/backend-portal/customers/companies/co-1/quotes/q1/sections/s2/line-items";
    Mock::given(method("POST"))
        .and(path(section))
        .and(body_json(json!({"modelId": "m-7", "pricePerUnit": 12.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "L9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{section}/L9")))
        .and(body_string_contains("pricePerUnit=12.5"))
        .and(body_string_contains("desiredQuantity=4"))
        .and(body_string_contains("minimumQuantity=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let item = LineItem::new("m-7", 12.5, 4, 1);
    let line = session
        .add_item_to_quote("co-1", "q1", "s2", &item)
        .await
        .unwrap();
    assert_eq!(line, "L9");
}

#[tokio::test]
async fn test_quote_lines_keeps_going_after_a_failed_line() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    let quote_url = "/backend-portal/customers/companies/co-1/quotes/q1";
    let section = format!("{quote_url}/sections/s2/line-items");
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quoteId": "q1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(quote_url))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(section.as_str()))
        .and(body_json(json!({"modelId": "m-7", "pricePerUnit": 12.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "L9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(section.as_str()))
        .and(body_json(json!({"modelId": "m-8", "pricePerUnit": 3.0})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{section}/L9")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let quote = NewQuote::new("Pumps", "2024-09-08", "ct-1");
    let lines = [
        LineItem::new("m-8", 3.0, 2, 1),
        LineItem::new("m-7", 12.5, 4, 1),
    ];
    let outcome = session.quote_lines("co-1", &quote, &lines).await.unwrap();

    assert_eq!(outcome.quote_id, "q1");
    assert_eq!(outcome.section_id, "s2");
    assert!(!outcome.is_complete());
    assert_eq!(outcome.added.len(), 1);
    assert_eq!(outcome.added[0].line_id, "L9");
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].model_id, "m-8");
    assert!(outcome.failed[0].error.contains("500"));
}

#[tokio::test]
async fn test_quote_lines_needs_lines() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"quoteId": "q1"})))
        .expect(0)
        .mount(&server)
        .await;

    let quote = NewQuote::new("Pumps", "2024-09-08", "ct-1");
    assert!(matches!(
        session.quote_lines("co-1", &quote, &[]).await,
        Err(PortalError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_update_quote_details() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await.with_diagnostics();
    Mock::given(method("GET"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/q1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/backend-portal/customers/companies/co-1/quotes/q1/details"))
        .and(body_json(json!({
            "id": "q1",
            "title": "New title",
            "teamId": "t1",
            "assigneeId": "u1",
            "participants": ["u5"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let existing = session.quote_info("co-1", "q1").await.unwrap();
    let update = QuoteDetailsUpdate {
        title: Some("New title".to_string()),
        participants: Some(vec!["u1".to_string(), "u5".to_string()]),
        ..Default::default()
    };
    session
        .update_quote_details("co-1", "q1", &existing, &update)
        .await
        .unwrap();

    let sent = session.diagnostics().unwrap().last_payload.clone().unwrap();
    assert_json_eq!(sent["participants"], json!(["u5"]));

    let err = session
        .update_quote_details("co-1", "q1", &existing, &QuoteDetailsUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::InvalidArgument(_)));
}

// ── Series models ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_series_models_records_failures_and_resumes() {
    let server = MockServer::start().await;
    let mut session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/series/full-search"))
        .and(filter_names("NX Series"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": "m1"}, {"id": "m2"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/full-search"))
        .and(filter_names("Down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/full-search"))
        .and(filter_names("Garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let series = vec![
        Series::new("nx", "NX Series"),
        Series::new("down", "Down"),
        Series::new("garbled", "Garbled"),
    ];

    let report = session.fetch_series_models(&series).await;
    assert_eq!(report.models["nx"].len(), 2);
    assert_eq!(report.model_count(), 2);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].slug, "down");
    assert_eq!(report.failed[0].reason, FailureReason::Status(503));
    assert!(matches!(report.failed[1].reason, FailureReason::Json(_)));

    // Second run skips "nx" and retries only the failures.
    let again = session.fetch_series_models(&series).await;
    assert_eq!(again.models.len(), 1);
    assert_eq!(again.failed.len(), 2);
    assert_eq!(session.series_models()["nx"][0]["id"], "m1");
}
