//! Subcommand implementations.

use crate::catalog::{total_value, Catalog};
use crate::cli::output::{print_json, Reporter};
use crate::cli::{Cli, Command, GlobalArgs};
use crate::config::{Credentials, PortalConfig};
use crate::records::{LineItem, NewQuote};
use crate::session::{PortalClient, PortalSession};
use anyhow::{bail, Context, Result};
use portal_extract::{extract_let_block, extract_script_vars, Keyword, ScriptVars};
use std::path::Path;
use std::time::Duration;

/// Run one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let out = Reporter::new(cli.global.quiet);

    match cli.command {
        Command::Extract {
            file,
            markers,
            keyword,
        } => extract(&out, &file, &markers, keyword),
        Command::Catalog {
            file,
            include,
            exclude,
            field,
            sums,
        } => catalog(&out, &file, &include, &exclude, field.as_deref(), &sums),
        command => {
            let mut session = login(&cli.global, &out).await?;
            let result = portal(&out, &mut session, command).await;
            if cli.global.diagnostics {
                if let Some(diag) = session.diagnostics() {
                    let text = serde_json::to_string_pretty(diag)?;
                    eprintln!("{text}");
                }
            }
            result
        }
    }
}

fn extract(out: &Reporter, file: &Path, markers: &[String], keyword: Keyword) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let vars = if markers.is_empty() {
        extract_let_block(&html)
    } else {
        extract_script_vars(&html, markers, keyword)
            .with_context(|| format!("no unique script block in {}", file.display()))?
    };

    report_vars(out, &vars);
    print_json(&vars)?;
    Ok(())
}

fn catalog(
    out: &Reporter,
    file: &Path,
    include: &[String],
    exclude: &[String],
    field: Option<&str>,
    sums: &[String],
) -> Result<()> {
    let catalog = load_catalog(file)?;

    let include: Vec<&str> = include.iter().map(String::as_str).collect();
    let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
    let sums: Vec<&str> = sums.iter().map(String::as_str).collect();
    let (selected, totals) = catalog.filter_and_sum(&include, &exclude, field, &sums)?;

    out.ok(&format!("{} of {} models matched", selected.len(), catalog.len()));
    for (name, total) in &totals {
        out.info(&format!("{name}: {total}"));
    }
    print_json(&serde_json::json!({ "models": selected, "sums": totals }))?;
    Ok(())
}

fn load_catalog(file: &Path) -> Result<Catalog> {
    Catalog::load(file).with_context(|| format!("failed to load catalog {}", file.display()))
}

fn load_lines(file: &Path) -> Result<Vec<LineItem>> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid line items in {}", file.display()))
}

async fn login(args: &GlobalArgs, out: &Reporter) -> Result<PortalSession> {
    let (Some(email), Some(password)) = (&args.email, &args.password) else {
        bail!("portal credentials missing: set --email/--password or PORTAL_EMAIL/PORTAL_PASSWORD");
    };

    let mut config = PortalConfig::new(&args.base_url)?
        .with_timeout(Duration::from_millis(args.timeout_ms));
    if let Some(agent) = &args.user_agent {
        config = config.with_user_agent(agent.clone());
    }

    let client = PortalClient::new(&config)?;
    let credentials = Credentials::new(email.clone(), password.clone());
    let session = match client.login(&credentials).await {
        Ok(session) => session,
        Err(e) => {
            out.fail(&format!("login as {email} failed"));
            return Err(e.into());
        }
    };
    out.ok(&format!("logged in as {email}"));

    Ok(if args.diagnostics {
        session.with_diagnostics()
    } else {
        session
    })
}

async fn portal(out: &Reporter, session: &mut PortalSession, command: Command) -> Result<()> {
    match command {
        Command::Users => {
            let users = session.list_backend_users().await?;
            out.ok(&format!("{} users", users.len()));
            print_json(&users)?;
        }
        Command::Companies { reload } => {
            let companies = session.list_companies(reload).await?;
            out.ok(&format!("{} companies", companies.len()));
            print_json(companies)?;
        }
        Command::Company { id } => {
            let record = session
                .company_info(&id)
                .await
                .with_context(|| format!("failed to read company {id}"))?;
            if record.is_empty() {
                out.warn(&format!("company {id} page has no data block"));
            } else {
                out.ok(&format!("company {id}: {} contacts", record.contacts().len()));
            }
            report_vars(out, record.vars());
            print_json(&record)?;
        }
        Command::Quote { company, quote } => {
            let record = session
                .quote_info(&company, &quote)
                .await
                .with_context(|| format!("failed to read quote {quote}"))?;
            match record.last_section_id() {
                Some(section) => out.ok(&format!("quote {quote}: last section {section}")),
                None => out.warn(&format!("quote {quote} has no sections")),
            }
            report_vars(out, record.vars());
            print_json(&record)?;
        }
        Command::NewQuote {
            company,
            title,
            expiry,
            contact,
            description,
            spr,
            lines,
            catalog,
        } => {
            let items = load_lines(&lines)?;
            if let Some(path) = catalog {
                let ids: Vec<&str> = items.iter().map(|l| l.model_id.as_str()).collect();
                let unknown = load_catalog(&path)?.validate_model_ids(&ids);
                if !unknown.is_empty() {
                    bail!("model ids not in catalog: {}", unknown.join(", "));
                }
            }
            out.info(&format!(
                "{} lines, total {:.2}",
                items.len(),
                total_value(&items)
            ));

            let quote = NewQuote::new(title, expiry, contact)
                .with_description(description)
                .special_price_request(spr);
            let outcome = session.quote_lines(&company, &quote, &items).await?;
            out.ok(&format!(
                "quote {} created with {} lines",
                outcome.quote_id,
                outcome.added.len()
            ));
            for failure in &outcome.failed {
                out.warn(&format!("{}: {}", failure.model_id, failure.error));
            }
            print_json(&outcome)?;
            if !outcome.is_complete() {
                bail!("{} of {} lines failed", outcome.failed.len(), items.len());
            }
        }
        Command::Order { id } => {
            let fields = session.order_details(&id).await?;
            out.ok(&format!("order {id}: {} fields", fields.len()));
            print_json(&fields)?;
        }
        Command::Orders { start, end } => {
            let orders = session.orders_by_date(&start, &end).await?;
            out.ok(&format!("orders from {start} to {end}"));
            print_json(&orders)?;
        }
        Command::Models { series } => {
            let report = session.fetch_series_models(&series).await;
            out.ok(&format!(
                "{} models across {} series",
                report.model_count(),
                report.models.len()
            ));
            for failure in &report.failed {
                out.warn(&format!("{}: {}", failure.slug, failure.reason));
            }
            print_json(&report)?;
        }
        Command::Extract { .. } | Command::Catalog { .. } => {
            bail!("offline command routed to the portal session")
        }
    }
    Ok(())
}

fn report_vars(out: &Reporter, vars: &ScriptVars) {
    out.info(&format!("{} declarations", vars.len()));
    if !vars.raw_fallbacks().is_empty() {
        out.warn(&format!(
            "kept as raw text: {}",
            vars.raw_fallbacks().join(", ")
        ));
    }
}
