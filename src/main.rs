//! pumpcalc - Pump hydraulic calculation from the terminal
//!
//! Loads an engineering record from JSON, applies edits through the
//! recalculation engine, queries the recommendation backend and talks to
//! the persistence API.
//!
//! # Usage
//!
//! ```bash
//! # List every field with units and whether it is calculated
//! pumpcalc fields
//!
//! # Apply edits and print the recalculated record
//! pumpcalc recalc --input p101.json --set cvMax=80 --set cvMin=40
//!
//! # Suggestions for a field, filtered by project
//! pumpcalc suggest --field service --project P-2024-001
//!
//! # Fill empty fields from history, then submit for review
//! pumpcalc autofill --input p101.json --fields service,pumpEfficiency -o p101.json
//! pumpcalc submit --input p101.json --status ifr
//!
//! # Download the generated datasheet
//! pumpcalc datasheet --id 42 --format pdf
//! ```
//!
//! # Environment Variables
//!
//! - `PUMPCALC_CONFIG`: Path to the TOML config (default: ./pumpcalc.toml)
//! - `PUMPCALC_API_TOKEN`: Bearer token for the backend
//! - `PUMPCALC_BASE_URL`: Overrides `[api].base_url`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use pumpcalc::client::{BackendClient, DatasheetFormat};
use pumpcalc::config::{self, PumpCalcConfig};
use pumpcalc::export::ExportTracker;
use pumpcalc::record::{catalog, EngineeringRecord, FieldValue, Section, SubmissionStatus};
use pumpcalc::recommendations::{RecommendationEngine, RequestContext};
use pumpcalc::session::EditSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pumpcalc")]
#[command(about = "Centrifugal pump hydraulic calculation and datasheet tool")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides PUMPCALC_CONFIG and ./pumpcalc.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend API root, e.g. http://localhost:8000/api
    #[arg(long, global = true, env = "PUMPCALC_BASE_URL")]
    base_url: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: SubCommand,
}

/// Filters sent with recommendation requests
#[derive(clap::Args, Debug)]
struct ContextArgs {
    /// Only use history from this project
    #[arg(long)]
    project: Option<String>,

    /// Only use history whose tag starts with this prefix
    #[arg(long)]
    tag_prefix: Option<String>,

    /// Number of historical records to aggregate
    #[arg(long)]
    limit: Option<u32>,
}

impl ContextArgs {
    fn to_context(&self) -> RequestContext {
        let config = config::get();
        RequestContext {
            project_no: self.project.clone(),
            tag_prefix: self.tag_prefix.clone(),
            limit: self.limit.unwrap_or(config.recommendations.default_limit),
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// List the field catalog
    Fields {
        /// Only this section (by title, e.g. "Power Consumption")
        #[arg(long)]
        section: Option<String>,

        /// Only calculated fields
        #[arg(long)]
        calculated: bool,
    },

    /// Apply edits to a record and print the recalculated result
    Recalc {
        /// Record JSON (camelCase keys); empty record when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Edit to apply, in order (repeatable): FIELD=VALUE
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        edits: Vec<(String, String)>,

        /// Rerun every formula before applying edits
        #[arg(long)]
        all: bool,

        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show suggestions for a field from historical records
    Suggest {
        /// Field key (camelCase)
        #[arg(long)]
        field: String,

        /// Motor classification to look up a typical efficiency for
        #[arg(long)]
        motor_classification: Option<String>,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Fill empty fields with suggested values
    Autofill {
        #[arg(long, short)]
        input: PathBuf,

        /// Comma-separated field keys to fill
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        #[command(flatten)]
        context: ContextArgs,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Save a record to the backend
    Submit {
        #[arg(long, short)]
        input: PathBuf,

        /// draft or ifr
        #[arg(long, default_value = "draft")]
        status: SubmissionStatus,
    },

    /// Download the generated datasheet for a saved calculation
    Datasheet {
        /// Calculation id returned by `submit`
        #[arg(long)]
        id: String,

        #[arg(long, value_enum, default_value = "xlsx")]
        format: DatasheetFormat,

        /// Directory to save into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok((field.to_string(), value.trim().to_string()))
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(args: &CliArgs) -> Result<PumpCalcConfig> {
    let mut config = match &args.config {
        Some(path) => PumpCalcConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .with_token_override(std::env::var(config::defaults::TOKEN_ENV_VAR).ok()),
        None => PumpCalcConfig::load(),
    };
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_record(path: &Path) -> Result<EngineeringRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_record(record: &EngineeringRecord, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), fields = record.len(), "Record saved");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn report_issues(record: &EngineeringRecord) {
    for issue in record.numeric_issues() {
        warn!(
            field = issue.field,
            error = %issue.error,
            read_as = issue.read_as,
            "{} is not a plain number",
            issue.label
        );
    }
}

fn build_engine(client: BackendClient, cancel: &CancellationToken) -> RecommendationEngine {
    let engine = RecommendationEngine::with_cancellation(
        Arc::new(client),
        &config::get().recommendations,
        cancel.child_token(),
    );
    debug!(ttl_secs = engine.ttl().as_secs(), "Recommendation engine ready");
    engine
}

// ============================================================================
// Subcommands
// ============================================================================

fn cmd_fields(section: Option<&str>, calculated_only: bool) -> Result<()> {
    let sections: Vec<Section> = match section {
        Some(name) => {
            let found = Section::ALL
                .into_iter()
                .find(|s| s.title().eq_ignore_ascii_case(name.trim()));
            match found {
                Some(s) => vec![s],
                None => bail!(
                    "unknown section '{}'; expected one of: {}",
                    name,
                    Section::ALL.map(|s| s.title()).join(", ")
                ),
            }
        }
        None => Section::ALL.to_vec(),
    };

    for section in sections {
        println!("== {} ==", section.title());
        for f in catalog::section_fields(section).filter(|f| !calculated_only || f.calculated) {
            let marker = if f.calculated { "*" } else if f.required { "!" } else { " " };
            println!("{marker} {:<32} {:<40} {}", f.key, f.label, f.unit);
        }
    }
    println!("\n* calculated   ! required");
    Ok(())
}

fn cmd_recalc(
    input: Option<&Path>,
    edits: Vec<(String, String)>,
    all: bool,
    output: Option<&Path>,
) -> Result<()> {
    let record = match input {
        Some(path) => read_record(path)?,
        None => EngineeringRecord::new(),
    };
    let mut session = EditSession::open(record);
    if all {
        session.recalculate_all();
    }

    for (field, value) in edits {
        let value = if value.is_empty() {
            FieldValue::Null
        } else {
            FieldValue::Text(value)
        };
        let outcome = session.apply_edit(&field, value)?;
        info!(field = %outcome.field, updated = ?outcome.updated, "Edit applied");
    }

    report_issues(session.record());
    write_record(session.record(), output)
}

async fn cmd_suggest(
    engine: &RecommendationEngine,
    field: &str,
    motor_classification: Option<&str>,
    ctx: &RequestContext,
) -> Result<()> {
    let set = engine.fetch(ctx).await;
    println!(
        "Based on {} records ({})",
        set.context.total_records_analyzed, ctx
    );

    let limit = config::get().recommendations.max_text_suggestions;
    let text = set.text_suggestions(field, limit);
    for s in &text {
        println!("  {:<40} [{}]", s.value, s.badge);
    }
    if let Some(n) = set.numeric_suggestion(field) {
        println!("  {}", n.tooltip);
    }
    if let Some(class) = motor_classification {
        match set.motor_efficiency_suggestion(class) {
            Some(eff) => println!("  Typical motor efficiency for {class}: {eff:.1} %"),
            None => println!("  No motor efficiency history for {class}"),
        }
    }
    if text.is_empty() && set.numeric_suggestion(field).is_none() && motor_classification.is_none()
    {
        println!("  No suggestions for {field}");
    }
    Ok(())
}

async fn cmd_autofill(
    engine: &RecommendationEngine,
    input: &Path,
    fields: &[String],
    ctx: &RequestContext,
    output: Option<&Path>,
) -> Result<()> {
    let mut session = EditSession::open(read_record(input)?);
    let set = engine.fetch(ctx).await;

    let names: Vec<&str> = fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()).collect();
    let updates = set.auto_fill(&names, session.record());
    let filled = session.apply_autofill(updates);
    if filled.is_empty() {
        warn!("No fields were auto-filled");
    } else {
        info!(fields = ?filled, "Auto-filled");
    }

    write_record(session.record(), output)
}

async fn cmd_submit(client: &BackendClient, input: &Path, status: SubmissionStatus) -> Result<()> {
    let record = read_record(input)?;
    report_issues(&record);

    if status == SubmissionStatus::Ifr {
        let missing = record.missing_required();
        if !missing.is_empty() {
            let labels: Vec<&str> = missing.iter().map(|f| f.label).collect();
            bail!("cannot issue for review, required fields are empty: {}", labels.join(", "));
        }
    }

    match client.submit(&record, status).await {
        Ok(id) => {
            println!("{id}");
            Ok(())
        }
        Err(e) => {
            if let Some(fix) = e.remediation() {
                eprintln!("{fix}");
            }
            Err(e).context("submitting calculation")
        }
    }
}

async fn cmd_datasheet(
    client: &BackendClient,
    id: &str,
    format: DatasheetFormat,
    out_dir: &Path,
) -> Result<()> {
    let tracker = ExportTracker::new(&config::get().export);
    tracker.start(format);

    match client.download_datasheet(id, format).await {
        Ok(sheet) => {
            let path = out_dir.join(&sheet.filename);
            std::fs::write(&path, &sheet.bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            tracker.complete(path.display().to_string());
            println!("{}", tracker.status());
            Ok(())
        }
        Err(e) => {
            tracker.fail(&e);
            eprintln!("{}", tracker.status());
            Err(e).context("downloading datasheet")
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    config::init(load_config(&args)?);
    let api = &config::get().api;

    let shutdown_token = CancellationToken::new();
    let ctrl_c_token = shutdown_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, cancelling outstanding requests");
        ctrl_c_token.cancel();
    });

    match args.command {
        SubCommand::Fields {
            section,
            calculated,
        } => cmd_fields(section.as_deref(), calculated),

        SubCommand::Recalc {
            input,
            edits,
            all,
            output,
        } => cmd_recalc(input.as_deref(), edits, all, output.as_deref()),

        SubCommand::Suggest {
            field,
            motor_classification,
            context,
        } => {
            let client = BackendClient::new(api)?;
            let engine = build_engine(client, &shutdown_token);
            let ctx = context.to_context();
            cmd_suggest(&engine, &field, motor_classification.as_deref(), &ctx).await
        }

        SubCommand::Autofill {
            input,
            fields,
            context,
            output,
        } => {
            let client = BackendClient::new(api)?;
            let engine = build_engine(client, &shutdown_token);
            let ctx = context.to_context();
            cmd_autofill(&engine, &input, &fields, &ctx, output.as_deref()).await
        }

        SubCommand::Submit { input, status } => {
            let client = BackendClient::new(api)?;
            info!(base_url = client.base_url(), "Submitting to backend");
            cmd_submit(&client, &input, status).await
        }

        SubCommand::Datasheet {
            id,
            format,
            out_dir,
        } => {
            let client = BackendClient::new(api)?;
            cmd_datasheet(&client, &id, format, &out_dir).await
        }
    }
}
