//! memoria-cli — command-line client for the Memoria fact API
//!
//! # Subcommands
//! - `list [--page N] [--per-page N] [--json]`                  — page through facts
//! - `get <uuid> [--json]`                                      — show one fact
//! - `create --owner O --question Q --answer A [--label L]...`  — add a fact
//! - `update <uuid> --owner O --question Q --answer A [...]`    — replace a fact
//! - `delete <uuid>`                                            — remove a fact
//! - `clean`                                                    — remove every fact
//! - `status`                                                   — show server health

use anyhow::{anyhow, bail};
use clap::{Args, Parser, Subcommand};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_SERVER: &str = "http://127.0.0.1:8888";
const FACTS_PATH: &str = "/api/fact/facts/";
const DEFAULT_PER_PAGE: u32 = 10;
const CLEAN_PAGE_SIZE: u32 = 100;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "memoria-cli",
    version,
    about = "Manage Memoria facts over the HTTP API"
)]
struct Cli {
    /// Memoria HTTP server URL (overrides MEMORIA_HTTP_URL env var)
    #[arg(long, env = "MEMORIA_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct FactArgs {
    #[arg(long)]
    owner: String,

    #[arg(long)]
    question: String,

    #[arg(long)]
    answer: String,

    /// Label to attach; repeat for several
    #[arg(long = "label")]
    labels: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List one page of facts
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Results per page: 1, 10, 100 or 1000
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Print the raw page JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single fact
    Get {
        uuid: String,

        #[arg(long)]
        json: bool,
    },

    /// Create a fact
    Create {
        #[command(flatten)]
        fact: FactArgs,

        #[arg(long)]
        json: bool,
    },

    /// Replace every field of an existing fact
    Update {
        uuid: String,

        #[command(flatten)]
        fact: FactArgs,
    },

    /// Delete a fact
    Delete { uuid: String },

    /// Delete every fact on the server
    Clean,

    /// Show Memoria server status
    Status,
}

// ============================================================================
// API Types
// ============================================================================

/// A fact as returned by the Memoria HTTP API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FactView {
    pub uuid: String,
    pub created_at: String,
    pub modified_at: String,
    pub owner: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A page of facts from GET /api/fact/facts/
#[derive(Debug, Deserialize, Serialize)]
pub struct FactPage {
    pub page: u32,
    pub pages: u64,
    pub per_page: u32,
    pub total: u64,
    pub items: Vec<FactView>,
}

/// Request body for create and update
#[derive(Debug, Serialize)]
pub struct FactRequest<'a> {
    pub owner: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub labels: &'a [String],
}

impl<'a> From<&'a FactArgs> for FactRequest<'a> {
    fn from(args: &'a FactArgs) -> Self {
        Self {
            owner: &args.owner,
            question: &args.question,
            answer: &args.answer,
            labels: &args.labels,
        }
    }
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// Collection URL, or item URL when `uuid` is given.
pub fn facts_url(server: &str, uuid: Option<&str>) -> String {
    let base = format!("{}{}", server.trim_end_matches('/'), FACTS_PATH);
    match uuid {
        Some(id) => format!("{}{}", base, id),
        None => base,
    }
}

/// One-line summary: `<uuid>  [labels]  question => answer`
pub fn summary_line(fact: &FactView) -> String {
    let labels = if fact.labels.is_empty() {
        String::new()
    } else {
        format!("[{}]  ", fact.labels.join(", "))
    };
    format!("{}  {}{} => {}", fact.uuid, labels, fact.question, fact.answer)
}

pub fn detail_block(fact: &FactView) -> String {
    format!(
        "uuid        : {}\ncreated_at  : {}\nmodified_at : {}\nowner       : {}\nlabels      : {}\nquestion    : {}\nanswer      : {}",
        fact.uuid,
        fact.created_at,
        fact.modified_at,
        fact.owner,
        fact.labels.join(", "),
        fact.question,
        fact.answer
    )
}

/// Pull the `message` out of an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client() -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}

/// Fail with the server's message unless the response has `expected` status.
fn expect_status(resp: Response, expected: StatusCode) -> anyhow::Result<Response> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(anyhow!("server returned {}: {}", status, error_message(&body)))
}

fn fetch_page(client: &Client, server: &str, page: u32, per_page: u32) -> anyhow::Result<FactPage> {
    let resp = client
        .get(facts_url(server, None))
        .query(&[("page", page), ("per_page", per_page)])
        .send()?;
    Ok(expect_status(resp, StatusCode::OK)?.json()?)
}

fn do_list(server: &str, page: u32, per_page: u32, json_output: bool) -> anyhow::Result<()> {
    let facts = fetch_page(&client()?, server, page, per_page)?;

    if json_output {
        return print_json(&facts);
    }

    if facts.items.is_empty() {
        eprintln!("No facts on page {} (total: {})", facts.page, facts.total);
        return Ok(());
    }
    for fact in &facts.items {
        println!("{}", summary_line(fact));
    }
    println!(
        "\nPage {}/{} — {} per page, {} total",
        facts.page, facts.pages, facts.per_page, facts.total
    );
    Ok(())
}

fn do_get(server: &str, uuid: &str, json_output: bool) -> anyhow::Result<()> {
    let resp = client()?.get(facts_url(server, Some(uuid))).send()?;
    let fact: FactView = expect_status(resp, StatusCode::OK)?.json()?;

    if json_output {
        print_json(&fact)
    } else {
        println!("{}", detail_block(&fact));
        Ok(())
    }
}

fn do_create(server: &str, args: &FactArgs, json_output: bool) -> anyhow::Result<()> {
    let resp = client()?
        .post(facts_url(server, None))
        .json(&FactRequest::from(args))
        .send()?;
    let fact: FactView = expect_status(resp, StatusCode::CREATED)?.json()?;

    if json_output {
        print_json(&fact)
    } else {
        println!("Created {}", fact.uuid);
        Ok(())
    }
}

fn do_update(server: &str, uuid: &str, args: &FactArgs) -> anyhow::Result<()> {
    let resp = client()?
        .put(facts_url(server, Some(uuid)))
        .json(&FactRequest::from(args))
        .send()?;
    expect_status(resp, StatusCode::NO_CONTENT)?;
    println!("Updated {}", uuid);
    Ok(())
}

fn delete_one(client: &Client, server: &str, uuid: &str) -> anyhow::Result<()> {
    let resp = client.delete(facts_url(server, Some(uuid))).send()?;
    expect_status(resp, StatusCode::NO_CONTENT)?;
    Ok(())
}

fn do_delete(server: &str, uuid: &str) -> anyhow::Result<()> {
    delete_one(&client()?, server, uuid)?;
    println!("Deleted {}", uuid);
    Ok(())
}

/// Delete facts from the first page until the collection is empty.
fn do_clean(server: &str) -> anyhow::Result<()> {
    let client = client()?;
    let mut deleted = 0u64;

    loop {
        let page = fetch_page(&client, server, 1, CLEAN_PAGE_SIZE)?;
        if page.items.is_empty() {
            break;
        }
        for fact in &page.items {
            delete_one(&client, server, &fact.uuid)?;
            deleted += 1;
        }
    }

    println!("Deleted {} facts", deleted);
    Ok(())
}

/// Show the server status by calling GET /health and GET /version.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = client()?;
    let base = server.trim_end_matches('/');

    let url = format!("{}/health", base);
    let health = match client.get(&url).send() {
        Ok(r) if r.status().is_success() => r.text().unwrap_or_default(),
        Ok(r) => bail!("server unhealthy (HTTP {})", r.status()),
        Err(e) => bail!("cannot reach {} — {}", url, e),
    };

    let version: serde_json::Value = client
        .get(format!("{}/version", base))
        .send()
        .and_then(|r| r.json())
        .unwrap_or_default();

    println!("Memoria server: {}", health.trim());
    println!("Version:        {}", version["version"].as_str().unwrap_or("?"));
    println!("API:            {}", version["api"].as_str().unwrap_or("?"));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match &cli.command {
        Commands::List { page, per_page, json } => do_list(&server, *page, *per_page, *json),
        Commands::Get { uuid, json } => do_get(&server, uuid, *json),
        Commands::Create { fact, json } => do_create(&server, fact, *json),
        Commands::Update { uuid, fact } => do_update(&server, uuid, fact),
        Commands::Delete { uuid } => do_delete(&server, uuid),
        Commands::Clean => do_clean(&server),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("memoria-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
