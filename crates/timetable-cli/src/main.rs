//! timetable - university timetable portal CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use timetable_api::discovery::{DiscoveryService, StudyPeriod};
use timetable_api::live::{EventsParams, LiveDataClient, LocalTimetableApi};
use timetable_api::portal::PortalClient;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the study periods offered by the portal.
    Periods,
    /// Show the currently selected study period.
    Current,
    /// List the study programs of a period.
    Programs(ProgramsArgs),
    /// List the calendar events of a semester program for one month.
    Events(EventsArgs),
    /// List the subjects of a semester program.
    Subjects(SemesterProgramArgs),
    /// Check whether a semester program's timetable is published.
    Published(SemesterProgramArgs),
    /// List the courses of a study program.
    Courses(CoursesArgs),
    /// List the groups of a course.
    Groups(GroupsArgs),
}

/// Arguments for the `programs` subcommand.
#[derive(clap::Args)]
struct ProgramsArgs {
    /// Study period ID.
    #[arg(long)]
    period_id: u32,
}

/// Arguments for the `events` subcommand.
#[derive(clap::Args)]
struct EventsArgs {
    /// Semester program ID.
    #[arg(long)]
    semester_program_id: u32,

    /// Calendar year.
    #[arg(long)]
    year: i32,

    /// Calendar month (1-12).
    #[arg(long)]
    month: u32,
}

/// Arguments for subcommands keyed by a semester program.
#[derive(clap::Args)]
struct SemesterProgramArgs {
    /// Semester program ID.
    #[arg(long)]
    semester_program_id: u32,
}

/// Arguments for the `courses` subcommand.
#[derive(clap::Args)]
struct CoursesArgs {
    /// Study program ID.
    #[arg(long)]
    program_id: u32,
}

/// Arguments for the `groups` subcommand.
#[derive(clap::Args)]
struct GroupsArgs {
    /// Course ID.
    #[arg(long)]
    course_id: u32,
}

/// Loads the config file selected by `--dir`.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let path = resolve_config_path(dir)?;
    AppConfig::load(&path)
}

/// Builds the portal transport from config.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the HTTP client fails to build.
fn build_portal(config: &AppConfig) -> Result<PortalClient> {
    let mut builder = PortalClient::builder();
    if let Some(base_url) = &config.portal.base_url {
        let url =
            Url::parse(base_url).with_context(|| format!("invalid portal.base_url: {base_url}"))?;
        builder = builder.base_url(url);
    }
    if let Some(locale) = &config.portal.locale {
        builder = builder.locale(locale);
    }
    if let Some(ua) = &config.portal.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(timeout) = config.portal.timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build portal client")
}

/// Builds the discovery service from config.
///
/// # Errors
///
/// Returns an error if the portal client fails to build.
fn build_discovery(config: &AppConfig) -> Result<DiscoveryService<PortalClient>> {
    let mut builder = DiscoveryService::builder(build_portal(config)?);
    if let Some(ttl) = config.cache.discovery_ttl() {
        builder = builder.ttl(ttl);
    }
    Ok(builder.build())
}

/// Builds the live-data client from config.
///
/// # Errors
///
/// Returns an error if the portal client fails to build.
fn build_live(config: &AppConfig) -> Result<LiveDataClient> {
    let mut builder = LiveDataClient::builder(build_portal(config)?);
    if let Some(ttl) = config.cache.live_ttl() {
        builder = builder.ttl(ttl);
    }
    Ok(builder.build())
}

/// Substitutes `-` for an empty field.
fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Logs one study period as a tab separated row.
fn log_period(period: &StudyPeriod) {
    tracing::info!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        period.id,
        or_dash(&period.code),
        or_dash(&period.academic_year),
        period.season,
        period.start_date,
        period.end_date,
        if period.is_selected { "*" } else { "" },
        period.name,
    );
}

/// Runs the `periods` subcommand.
///
/// # Errors
///
/// Returns an error if discovery fails.
#[instrument(skip_all)]
async fn run_periods(config: &AppConfig) -> Result<()> {
    let service = build_discovery(config)?;
    let periods = service
        .discover_periods()
        .await
        .context("failed to discover periods")?;

    tracing::info!("ID\tCode\tYear\t\tSeason\tStart\t\tEnd\t\tSel\tName");
    for period in &periods {
        log_period(period);
    }
    tracing::info!("Total: {} periods", periods.len());

    Ok(())
}

/// Runs the `current` subcommand.
///
/// # Errors
///
/// Returns an error if discovery fails.
#[instrument(skip_all)]
async fn run_current(config: &AppConfig) -> Result<()> {
    let service = build_discovery(config)?;
    let current = service
        .discover_current_period()
        .await
        .context("failed to discover the current period")?;

    match current {
        Some(period) => {
            tracing::info!("ID\tCode\tYear\t\tSeason\tStart\t\tEnd\t\tSel\tName");
            log_period(&period);
        }
        None => tracing::info!("No study periods found"),
    }

    Ok(())
}

/// Runs the `programs` subcommand.
///
/// # Errors
///
/// Returns an error if discovery fails.
#[instrument(skip_all)]
async fn run_programs(args: &ProgramsArgs, config: &AppConfig) -> Result<()> {
    let service = build_discovery(config)?;
    let programs = service
        .discover_programs(args.period_id)
        .await
        .context("failed to discover programs")?;

    tracing::info!("ID\tCode\t\tFaculty\tName");
    for program in &programs {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            program.id,
            program.code,
            program.faculty.code,
            program.name,
        );
    }
    tracing::info!("Total: {} programs", programs.len());

    Ok(())
}

/// Runs the `events` subcommand.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
async fn run_events(args: &EventsArgs, config: &AppConfig) -> Result<()> {
    let client = build_live(config)?;
    let params = EventsParams::new(args.semester_program_id, args.year, args.month);
    let events = client
        .fetch_semester_program_events(&params)
        .await
        .context("failed to fetch events")?;

    tracing::info!("ID\tStart\t\t\tEnd\t\t\tType\tRoom\tTitle");
    for event in &events {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            event.id,
            event.start,
            event.end,
            event.event_type.as_deref().unwrap_or("-"),
            event.room.as_deref().unwrap_or("-"),
            event.title,
        );
    }
    tracing::info!("Total: {} events", events.len());

    Ok(())
}

/// Runs the `subjects` subcommand.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
async fn run_subjects(args: &SemesterProgramArgs, config: &AppConfig) -> Result<()> {
    let client = build_live(config)?;
    let subjects = client
        .fetch_semester_program_subjects(args.semester_program_id)
        .await
        .context("failed to fetch subjects")?;

    tracing::info!("ID\tCode\t\tName");
    for subject in &subjects {
        tracing::info!(
            "{}\t{}\t{}",
            subject.id,
            subject.code.as_deref().unwrap_or("-"),
            subject.name,
        );
    }
    tracing::info!("Total: {} subjects", subjects.len());

    Ok(())
}

/// Runs the `published` subcommand.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
async fn run_published(args: &SemesterProgramArgs, config: &AppConfig) -> Result<()> {
    let client = build_live(config)?;
    let published = client
        .check_semester_program_published(args.semester_program_id)
        .await
        .context("failed to check publication status")?;

    tracing::info!(
        "Semester program {}: {}",
        args.semester_program_id,
        if published { "published" } else { "not published" },
    );

    Ok(())
}

/// Runs the `courses` subcommand.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
async fn run_courses(args: &CoursesArgs, config: &AppConfig) -> Result<()> {
    let client = build_live(config)?;
    let courses = client
        .find_courses_by_program(args.program_id)
        .await
        .context("failed to fetch courses")?;

    tracing::info!("ID\tNumber\tName");
    for course in &courses {
        tracing::info!(
            "{}\t{}\t{}",
            course.id,
            course
                .number
                .map_or_else(|| String::from("-"), |n| n.to_string()),
            course.name,
        );
    }
    tracing::info!("Total: {} courses", courses.len());

    Ok(())
}

/// Runs the `groups` subcommand.
///
/// # Errors
///
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
async fn run_groups(args: &GroupsArgs, config: &AppConfig) -> Result<()> {
    let client = build_live(config)?;
    let groups = client
        .find_groups_by_course(args.course_id)
        .await
        .context("failed to fetch groups")?;

    tracing::info!("ID\tCode\tName");
    for group in &groups {
        tracing::info!(
            "{}\t{}\t{}",
            group.id,
            group.code.as_deref().unwrap_or("-"),
            group.name,
        );
    }
    tracing::info!("Total: {} groups", groups.len());

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if config loading or subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.dir.as_ref())?;
    match cli.command {
        Commands::Periods => run_periods(&config).await,
        Commands::Current => run_current(&config).await,
        Commands::Programs(args) => run_programs(&args, &config).await,
        Commands::Events(args) => run_events(&args, &config).await,
        Commands::Subjects(args) => run_subjects(&args, &config).await,
        Commands::Published(args) => run_published(&args, &config).await,
        Commands::Courses(args) => run_courses(&args, &config).await,
        Commands::Groups(args) => run_groups(&args, &config).await,
    }
}
