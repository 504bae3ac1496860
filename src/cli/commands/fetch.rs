//! Fetch command - show results for one election

use crate::canonical;
use crate::cli::args::{FetchArgs, OutputFormat};
use crate::config::Config;
use crate::error::VolbyResult;
use crate::model::{Dataset, Summary};
use crate::results::ElectionResults;
use crate::ui::{self, TaskSpinner, UiContext};
use console::style;

/// Seats in the Chamber of Deputies needed for a majority
const MAJORITY: u32 = 101;

/// Execute the fetch command
pub fn execute(args: FetchArgs, config: &Config) -> VolbyResult<()> {
    let year = args.year.unwrap_or(config.election.year);
    let fallback_year = args.effective_fallback(config.election.fallback_year);
    let lang = args
        .lang
        .clone()
        .unwrap_or_else(|| config.source.lang.clone());
    let results = ElectionResults::from_config(config);

    let dataset = if args.format == OutputFormat::Table {
        let ctx = UiContext::detect();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Fetching {} results...", year));
        match results.gather(year, fallback_year, &lang) {
            Ok(dataset) => {
                spinner.stop(&format!("Results for {}", dataset.metadata.year));
                dataset
            }
            Err(e) => {
                spinner.stop_error(&format!("No results for {}", year));
                return Err(e);
            }
        }
    } else {
        results.gather(year, fallback_year, &lang)?
    };

    match args.format {
        OutputFormat::Table => print_table(&dataset),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dataset)?),
        OutputFormat::Plain => print_plain(&dataset),
    }

    Ok(())
}

/// Group digits by thousands with a space, the Czech way
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

fn count(value: Option<i64>) -> String {
    match value {
        Some(n) if n < 0 => format!("-{}", group_thousands(n.unsigned_abs())),
        Some(n) => group_thousands(n.unsigned_abs()),
        None => "-".to_string(),
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|p| format!("{:.2} %", p))
        .unwrap_or_else(|| "-".to_string())
}

fn print_summary(ctx: &UiContext, summary: &Summary) {
    ui::section(ctx, "Summary");
    ui::key_value_status(
        ctx,
        "Wards counted",
        &format!(
            "{} of {} ({})",
            count(summary.wards_processed),
            count(summary.wards_total),
            percent(summary.wards_processed_percent)
        ),
        summary.is_final(),
    );
    ui::key_value(ctx, "Voters in roll", &count(summary.voters_in_roll));
    ui::key_value(ctx, "Envelopes issued", &count(summary.envelopes_issued));
    ui::key_value(ctx, "Turnout", &percent(summary.turnout_percent));
    ui::key_value(ctx, "Envelopes returned", &count(summary.envelopes_returned));
    ui::key_value(
        ctx,
        "Valid votes",
        &format!("{} ({})", count(summary.valid_votes), percent(summary.valid_votes_percent)),
    );
    ui::key_value(
        ctx,
        "Invalid votes",
        &format!(
            "{} ({})",
            count(summary.invalid_votes),
            percent(summary.invalid_votes_percent)
        ),
    );
}

fn print_table(dataset: &Dataset) {
    let ctx = UiContext::detect();
    let meta = &dataset.metadata;

    if meta.fallback_used {
        ui::step_warn_hint(
            &ctx,
            &format!("Showing {} results", meta.year),
            &format!(
                "{} is not published yet",
                meta.requested_year.unwrap_or(meta.year)
            ),
        );
    }
    if let Some(cache) = &meta.cache {
        let state = match (cache.hit, cache.revalidated) {
            (true, false) => "served from cache",
            (true, true) => "cache confirmed upstream",
            (false, true) => "cache refreshed",
            (false, false) => "fetched",
        };
        ui::remark(&ctx, &format!("{} ({})", state, cache.path));
    }

    print_summary(&ctx, &dataset.summary);

    ui::section(&ctx, "Parties");
    println!(
        "{:>4} {:<50} {:>12} {:>8}",
        style("NO").bold(),
        style("PARTY").bold(),
        style("VOTES").bold(),
        style("%").bold()
    );
    println!("{}", "-".repeat(77));
    for party in &dataset.parties {
        println!(
            "{:>4} {:<50} {:>12} {:>8.2}",
            party.number,
            party.name,
            group_thousands(party.votes),
            party.vote_share
        );
    }

    if !dataset.seats.is_empty() {
        ui::section(&ctx, "Seats");
        for seat in &dataset.seats {
            let mandates = if seat.mandates >= MAJORITY {
                style(seat.mandates.to_string()).green().bold()
            } else {
                style(seat.mandates.to_string())
            };
            println!(
                "{:>5}  {}",
                mandates,
                seat_label(dataset.metadata.year, &seat.party)
            );
        }
        let total: u32 = dataset.seats.iter().map(|s| s.mandates).sum();
        println!();
        println!("{} seats allocated, majority is {}", total, MAJORITY);
    }

    if !dataset.regions.is_empty() {
        ui::section(&ctx, "Regions");
        println!(
            "{:>3} {:<28} {:<40} {:>8} {:>9}",
            style("ID").bold(),
            style("REGION").bold(),
            style("LEADING").bold(),
            style("%").bold(),
            style("COUNTED").bold()
        );
        println!("{}", "-".repeat(92));
        for region in &dataset.regions {
            println!(
                "{:>3} {:<28} {:<40} {:>8} {:>9}",
                region.region_id,
                region.region_name,
                region.leading_party,
                region
                    .leading_percent
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "-".to_string()),
                percent(region.processed_percent)
            );
        }
    }
}

fn print_plain(dataset: &Dataset) {
    for party in &dataset.parties {
        println!(
            "{}\t{}\t{}\t{}",
            party.number, party.name, party.votes, party.vote_share
        );
    }
}

/// Seat row label, with the ballot number for years using official names
fn seat_label(year: i32, party: &str) -> String {
    match canonical::applies_to(year)
        .then(|| canonical::official_draw_number(party))
        .flatten()
    {
        Some(number) => format!("{} (#{})", party, number),
        None => party.to_string(),
    }
}
