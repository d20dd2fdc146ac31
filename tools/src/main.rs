//! insights-runner: headless batch runner for the order-generation insights.
//!
//! Usage:
//!   insights-runner --triggers data/table_trigger.csv --validation data/table_validation.csv
//!   insights-runner --config insights.json --table table2
//!   insights-runner --json summary.json
//!   insights-runner --synthesize 500 --seed 42 --out-dir data

use anyhow::Result;
use insights_core::{
    config::InsightsConfig,
    figure::figure_for,
    pipeline::{InsightsPipeline, PipelineOutput, StageCounts},
    summary::{SummaryTables, TableId},
    synth::{self, SynthParams},
    warning::PipelineWarning,
};
use std::{collections::BTreeMap, env, path::Path};

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    counts: StageCounts,
    tables: &'a SummaryTables,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if let Some(rows) = parse_opt::<usize>(&args, "--synthesize") {
        let seed = parse_arg(&args, "--seed", 42u64);
        let out_dir = flag_value(&args, "--out-dir").unwrap_or("./data");
        let tables = synth::generate(seed, &SynthParams::with_rows(rows))?;
        tables.write_to_dir(Path::new(out_dir))?;
        println!("wrote {rows} synthetic trigger row(s) (seed {seed}) to {out_dir}");
        return Ok(());
    }

    let mut config = match flag_value(&args, "--config") {
        Some(path) => InsightsConfig::load(path)?,
        None => InsightsConfig::default(),
    };
    if let Some(path) = flag_value(&args, "--triggers") {
        config.trigger_path = path.to_string();
    }
    if let Some(path) = flag_value(&args, "--validation") {
        config.validation_path = path.to_string();
    }
    if let Some(divisor) = parse_opt::<f64>(&args, "--failure-rate-divisor") {
        config.failure_rate_divisor = divisor;
    }
    let pipeline = InsightsPipeline::new(config)?;
    let output = pipeline.run()?;

    let selected = flag_value(&args, "--table");
    let json_path = flag_value(&args, "--json");

    if let Some(name) = selected {
        let id: TableId = name.parse()?;
        let figure = figure_for(&output.tables, Some(id));
        println!("{}", serde_json::to_string_pretty(&figure)?);
    }
    if let Some(path) = json_path {
        let report = JsonReport {
            counts: output.counts,
            tables: &output.tables,
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        log::info!("wrote summary tables to {path}");
    }
    if selected.is_none() && json_path.is_none() {
        print_summary(pipeline.config(), &output);
    }

    Ok(())
}

fn print_summary(config: &InsightsConfig, output: &PipelineOutput) {
    let counts = &output.counts;
    println!("Order Generation Insights");
    println!("  triggers:      {}", config.trigger_path);
    println!("  validation:    {}", config.validation_path);
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  trigger rows:    {}", counts.trigger_rows);
    println!("  validation rows: {}", counts.validation_rows);
    println!("  deduplicated:    {}", counts.deduplicated_rows);
    println!("  joined:          {}", counts.joined_rows);

    println!();
    println!("=== TABLES ===");
    for id in TableId::ALL {
        let rows = output.tables.view(id).row_count();
        let note = if rows == 0 { "  (no data)" } else { "" };
        println!("  {:<30} {rows:>6} row(s){note}", id.label());
    }

    println!();
    println!("=== CASH UTILIZATION ===");
    for row in &output.tables.cash_utilization {
        let mean = row
            .mean_excess_cash
            .map(|m| format!("{m:.2}"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "  {:<5} | mean excess cash: {mean:>12} | records: {}",
            row.account_tradeable, row.record_count
        );
    }

    println!();
    println!("=== TRIGGER FAILURES ===");
    if output.tables.trigger_failures.is_empty() {
        println!("  (No non-tradeable records)");
    }
    for row in &output.tables.trigger_failures {
        let rate = row
            .failure_rate_percentage
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "  {:<20} | failed {:>5} of {:>5} | {rate}",
            row.trigger, row.failed_count, row.total_count
        );
    }

    let warnings = output.warnings();
    if !warnings.is_empty() {
        println!();
        println!("=== WARNINGS ===");
        let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
        for w in warnings {
            *by_kind.entry(w.kind()).or_default() += 1;
        }
        for (kind, n) in by_kind {
            println!("  {kind:<28} {n}");
        }
        if warnings
            .iter()
            .any(|w| matches!(w, PipelineWarning::UnrecognizedTripped { .. }))
        {
            println!("  (unrecognized tripped values were kept as-is)");
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    flag_value(args, flag).and_then(|v| v.parse().ok())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}
