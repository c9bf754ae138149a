//! Interest Calcs CLI
//!
//! # Commands
//!
//! - `interest_calcs breakdown` - months per calendar year between two dates
//! - `interest_calcs retro` - retro payment with interest (closed form)
//! - `interest_calcs ledger` - month-by-month retro working, with amount changes
//! - `interest_calcs pv` - present value of a payment stream and its roll-forward

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use interest_calcs::dates::parse_date;
use interest_calcs::export::percent_label;
use interest_calcs::{
    calc_retro, calc_stco_pen_retro, get_breakdown, pv_calc, AmountChange, AmountSchedule,
    CalcConfig, Exporter, RateBasis, WorkTable,
};

/// Retro pension interest and PV calculator
#[derive(Parser)]
#[command(name = "interest_calcs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (YAML); defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = interest_calcs::config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Rate table CSV, overriding the settings file
    #[arg(short, long, global = true)]
    rates: Option<String>,

    /// Rate column to read: annual or monthly
    #[arg(short, long, global = true)]
    basis: Option<String>,

    /// Use the built-in CANSIM rates instead of the rate table CSV
    #[arg(long, global = true)]
    builtin_rates: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Months per calendar year from the retro start to the payment date
    Breakdown {
        /// Date of retroactivity (first of a month)
        #[arg(long)]
        dor: String,

        /// Payment date (first of a month)
        #[arg(long)]
        pmt_date: String,
    },

    /// Retro payment accumulated with interest
    Retro {
        #[arg(long)]
        dor: String,

        #[arg(long)]
        pmt_date: String,

        /// Monthly pension amount
        #[arg(short, long)]
        amount: f64,

        /// Last day of a bridge benefit; the month after it starts the roll-on
        #[arg(long)]
        bridge_end: Option<String>,
    },

    /// Month-by-month retro ledger
    Ledger {
        #[arg(long)]
        dor: String,

        #[arg(long)]
        pmt_date: String,

        /// Monthly pension amount before any change
        #[arg(short, long)]
        amount: f64,

        /// Amount change as AMOUNT@DATE (repeatable)
        #[arg(long = "change")]
        changes: Vec<String>,

        /// Skip writing the ledger
        #[arg(long)]
        no_export: bool,
    },

    /// Present value of a monthly stream with its roll-forward
    Pv {
        /// Annual interest rate in percent
        #[arg(long)]
        rate: f64,

        /// Number of monthly payments
        #[arg(long)]
        periods: u32,

        /// Dated amount as AMOUNT@DATE (repeatable; the earliest starts the stream)
        #[arg(long = "amount", required = true)]
        amounts: Vec<String>,

        /// Fixed first roll-forward month, overriding the settings file
        #[arg(long)]
        start: Option<String>,

        /// Skip writing the work tables
        #[arg(long)]
        no_export: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CalcConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config))?;
    if let Some(rates) = &cli.rates {
        config.rates_path = rates.into();
    }
    if let Some(basis) = &cli.basis {
        config.rate_basis = basis.parse::<RateBasis>()?;
    }
    if cli.builtin_rates {
        config.builtin_rates = true;
    }

    interest_calcs::setup_logger(&config.log_name, config.log_serialize)?;
    log::info!("running with settings from {}", cli.config);

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Breakdown { dor, pmt_date } => {
            let breakdown = get_breakdown(parse_date(&dor)?, parse_date(&pmt_date)?)?;
            println!("{:>6} {:>7}", "Year", "Months");
            println!("{}", "-".repeat(14));
            for (year, months) in breakdown.iter() {
                println!("{:>6} {:>7}", year, months);
            }
            println!("Total months: {}", breakdown.total_months());
        }

        Commands::Retro {
            dor,
            pmt_date,
            amount,
            bridge_end,
        } => {
            let rates = config.rate_table()?;
            let bridge_end = bridge_end.as_deref().map(parse_date).transpose()?;
            let total = calc_stco_pen_retro(
                parse_date(&dor)?,
                parse_date(&pmt_date)?,
                amount,
                bridge_end,
                &rates,
            )?;
            println!("Retro payment with interest: ${:.2}", total);
        }

        Commands::Ledger {
            dor,
            pmt_date,
            amount,
            changes,
            no_export,
        } => {
            let rates = config.rate_table()?;
            let schedule = parse_schedule(&changes)?;
            let ledger = calc_retro(parse_date(&dor)?, parse_date(&pmt_date)?, amount, &rates, &schedule)?;

            println!(
                "{:>10} {:>12} {:>12} {:>12} {:>14}",
                "Month", "Amount", "MonthlyRt", "AccumRt", "WithInterest"
            );
            println!("{}", "-".repeat(64));
            for row in &ledger.rows {
                println!(
                    "{:>10} {:>12.2} {:>12.8} {:>12.8} {:>14.2}",
                    row.month, row.monthly_amt, row.monthly_rate, row.accum_rate, row.monthly_pen_w_int
                );
            }

            println!("\nSummary:");
            println!("  Months: {}", ledger.len());
            println!("  Nominal: ${:.2}", ledger.nominal());
            println!("  Interest: ${:.2}", ledger.interest());
            println!("  Total: ${:.2}", ledger.total()?);

            if config.export_enabled && !no_export {
                write_table(&config, &ledger, "retro_ledger")?;
            }
        }

        Commands::Pv {
            rate,
            periods,
            amounts,
            start,
            no_export,
        } => {
            if let Some(start) = &start {
                config.roll_forward_start = Some(parse_date(start)?);
            }
            let amounts = parse_schedule(&amounts)?;
            let report = pv_calc(rate, periods, &amounts, &config.roll_forward(), today)?;

            println!("PV at {}: ${:.2}", report.work.first_pmt_date, report.pv);
            println!(
                "  {} payments, nominal ${:.2}, accumulated ${:.2}",
                report.work.num_periods,
                report.work.nominal(),
                report.work.accumulated()
            );

            let reduced = percent_label(report.roll_forward.reduced_pct);
            println!("\n{:>10} {:>7} {:>12} {:>12}", "PmtDate", "Months", "100%", format!("{}%", reduced));
            println!("{}", "-".repeat(44));
            for row in &report.roll_forward.rows {
                println!(
                    "{:>10} {:>7} {:>12.2} {:>12.2}",
                    row.pmt_date, row.num_months, row.amt_100pct, row.amt_reduced
                );
            }

            if config.export_enabled && !no_export {
                write_table(&config, &report.work, "pv_work")?;
                write_table(&config, &report.roll_forward, "pv_roll_forward")?;
            }
        }
    }

    Ok(())
}

/// Parse repeated `AMOUNT@DATE` arguments
fn parse_schedule(args: &[String]) -> Result<AmountSchedule> {
    let changes = args
        .iter()
        .map(|a| AmountChange::parse(a))
        .collect::<interest_calcs::Result<Vec<_>>>()?;
    Ok(AmountSchedule::new(changes))
}

fn write_table(config: &CalcConfig, table: &dyn WorkTable, stem: &str) -> Result<()> {
    let exporter = Exporter::new(&config.export_dir, config.export_format);
    let path = exporter
        .export(table, stem)
        .with_context(|| format!("exporting {}", stem))?;
    println!("\nWorking written to: {}", path.display());
    Ok(())
}
