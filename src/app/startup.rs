//! Application startup: arguments, configuration, logging, then scanning

use crate::app::cli::args::Args;
use crate::app::output::{render, LocationReport, OutputFormat};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::retry::{retry_async, RetryPolicy};
use crate::core::version::version_banner;
use crate::scanner::api::{
    FilePolicy, ListQuery, ScanError, ScanOutcome, ScanResult, TagCommentParser,
    TemplateUrlResolver, TodoScanner,
};
use clap::Parser;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of scanning one location
pub type LocationOutcome = (String, ScanOutcome<Arc<ScanResult>>);

/// Run the CLI and return the process exit code
pub async fn startup() -> i32 {
    let mut args = Args::parse();

    let config_path = match prepare_args(&mut args).await {
        Ok(path) => path,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 1;
        }
    };

    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format(),
        args.log_file_path().as_deref(),
        args.use_color(),
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return 1;
    }

    log::debug!("{}", version_banner());
    if let Some(path) = config_path {
        log::debug!("Loaded configuration from {}", path.display());
    }

    let (scanner, query) = match build_scanner(&args).and_then(|s| Ok((s, args.list_query()?))) {
        Ok(built) => built,
        Err(e) => {
            log_error_with_context(&e, "Building scanner");
            return 1;
        }
    };

    let locations = args.normalized_locations().into_owned();
    let settings = RunSettings {
        query,
        format: args.output_format(),
        color: args.use_color(),
        retry: args.retry_policy(),
    };

    match args.watch_interval() {
        Some(interval) => watch(&scanner, &locations, &settings, interval).await,
        None => {
            let outcomes = scan_all(&scanner, &locations, settings.retry).await;
            if print_outcomes(&outcomes, &settings) {
                0
            } else {
                1
            }
        }
    }
}

/// Merge the config file into the parsed arguments and validate list options.
/// Returns the config file that was applied, if any.
async fn prepare_args(args: &mut Args) -> Result<Option<std::path::PathBuf>, String> {
    let loaded = Args::load_config_file(args.config_file.as_deref())
        .await
        .map_err(|e| e.to_string())?;

    let path = match loaded {
        Some((path, config)) => {
            Args::apply_toml_values(args, &config).map_err(|e| e.to_string())?;
            Some(path)
        }
        None => None,
    };

    args.apply_enhanced_parsing().map_err(|e| e.to_string())?;
    Ok(path)
}

/// Build the scanner described by the arguments
pub fn build_scanner(args: &Args) -> ScanOutcome<TodoScanner> {
    let mut policy = FilePolicy::new()
        .with_denied_extensions(&args.exclude_extensions)
        .with_exclude_patterns(&args.exclude)?;
    if let Some(max_file_size) = args.max_file_size {
        policy = policy.with_max_file_size(max_file_size);
    }

    let parser = if args.tags.is_empty() {
        TagCommentParser::default()
    } else {
        TagCommentParser::new(&args.tags)?
    };

    let resolver = args
        .view_url
        .as_deref()
        .map_or_else(TemplateUrlResolver::default, TemplateUrlResolver::new);

    let mut builder = TodoScanner::builder()
        .with_fetcher_kind(args.fetcher_kind()?)
        .with_parser(Arc::new(parser))
        .with_resolver(Arc::new(resolver))
        .with_policy(policy);
    if let Some(capacity) = args.cache_capacity {
        builder = builder.with_cache_capacity(capacity as u64);
    }

    Ok(builder.build())
}

struct RunSettings {
    query: ListQuery,
    format: OutputFormat,
    color: bool,
    retry: RetryPolicy,
}

/// Scan every location concurrently, retrying transient failures
pub async fn scan_all(
    scanner: &TodoScanner,
    locations: &[String],
    retry: RetryPolicy,
) -> Vec<LocationOutcome> {
    let scans = locations.iter().map(|location| async move {
        let outcome = retry_async(
            &format!("scan '{}'", location),
            retry,
            ScanError::is_transient,
            || scanner.request_scan(location),
        )
        .await;
        (location.clone(), outcome)
    });
    futures::future::join_all(scans).await
}

/// Print the successful results and log the failures. Returns true when
/// every location was scanned.
fn print_outcomes(outcomes: &[LocationOutcome], settings: &RunSettings) -> bool {
    let mut reports = Vec::new();
    let mut all_ok = true;

    for (location, outcome) in outcomes {
        match outcome {
            Ok(result) => reports.push(LocationReport {
                location: location.clone(),
                page: settings.query.apply(result),
            }),
            Err(e) => {
                all_ok = false;
                log::error!("Could not scan '{}': {}", location, e);
            }
        }
    }

    match render(&reports, settings.format, settings.color) {
        Ok(rendered) => print!("{}", rendered),
        Err(e) => {
            log::error!("Failed to render results: {}", e);
            return false;
        }
    }
    all_ok
}

/// Rescan on an interval until Ctrl-C, printing only when some location's
/// result changed since the last print
async fn watch(
    scanner: &TodoScanner,
    locations: &[String],
    settings: &RunSettings,
    interval: Duration,
) -> i32 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut printed: HashMap<String, Arc<ScanResult>> = HashMap::new();
    let mut last_round_ok = true;
    log::info!(
        "Watching {} location(s) every {:?}; press Ctrl-C to stop",
        locations.len(),
        interval
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcomes = scan_all(scanner, locations, settings.retry).await;
                last_round_ok = outcomes.iter().all(|(_, outcome)| outcome.is_ok());

                if has_changed(&printed, &outcomes) {
                    print_outcomes(&outcomes, settings);
                    for (location, outcome) in outcomes {
                        if let Ok(result) = outcome {
                            printed.insert(location, result);
                        }
                    }
                } else {
                    for (location, outcome) in &outcomes {
                        if let Err(e) = outcome {
                            log::warn!("Scan of '{}' failed: {}", location, e);
                        }
                    }
                }
            }
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    log::warn!("Could not listen for Ctrl-C: {}", e);
                }
                log::info!("Stopping watch");
                break;
            }
        }
    }

    if last_round_ok {
        0
    } else {
        1
    }
}

/// True when any successful outcome's markers differ from what was printed
/// last. A rescan with a new version tag but the same markers is unchanged.
pub fn has_changed(printed: &HashMap<String, Arc<ScanResult>>, outcomes: &[LocationOutcome]) -> bool {
    outcomes.iter().any(|(location, outcome)| match outcome {
        Ok(result) => printed.get(location).map_or(true, |previous| {
            !Arc::ptr_eq(previous, result) && **previous != **result
        }),
        Err(_) => false,
    })
}
