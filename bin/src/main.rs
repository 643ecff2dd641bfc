//! Trinio CLI binary.
//!
//! Fetches reported financial statements and stock prices from Intrinio and
//! prints them as JSON records or as a table.

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use trinio::{
    FiscalPeriod, FiscalYear, IntrinioConfig, IntrinioProvider, OutputFormat, PriceOutput,
    StatementKind, StatementOutput, Symbol, gather_financial_statement_company_compare,
    gather_financial_statement_time_series, gather_stock_returns, gather_stock_time_series,
    parse_date,
};

#[derive(Parser, Debug)]
#[command(name = "trinio")]
#[command(about = "Reported financial statements and stock prices from Intrinio", long_about = None)]
#[command(version)]
struct Cli {
    /// Intrinio API key (defaults to INTRINIO_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// One company's statement over several years and periods
    Statements {
        /// Ticker symbol
        ticker: String,

        /// Statement (income_statement, balance_sheet_statement, cash_flow_statement)
        #[arg(short, long, default_value = "income_statement")]
        statement: String,

        /// Fiscal years (YYYY)
        #[arg(short, long, value_delimiter = ',', required = true)]
        years: Vec<String>,

        /// Fiscal periods (Q1, Q2, Q3, Q4, FY)
        #[arg(short, long, value_delimiter = ',', default_value = "FY")]
        periods: Vec<String>,

        /// Output format (records or table)
        #[arg(short, long, default_value = "records")]
        format: String,
    },

    /// Several companies' statement for one year and period
    Compare {
        /// Ticker symbols
        #[arg(value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// Statement (income_statement, balance_sheet_statement, cash_flow_statement)
        #[arg(short, long, default_value = "income_statement")]
        statement: String,

        /// Fiscal year (YYYY)
        #[arg(short, long)]
        year: String,

        /// Fiscal period (Q1, Q2, Q3, Q4, FY)
        #[arg(short, long, default_value = "FY")]
        period: String,

        /// Output format (records or table)
        #[arg(short, long, default_value = "records")]
        format: String,
    },

    /// Daily price history of one stock
    Prices {
        /// Ticker symbol
        ticker: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Output format (records or table)
        #[arg(short, long, default_value = "records")]
        format: String,
    },

    /// Return of several stocks between a buy and a sell date
    Returns {
        /// Ticker symbols
        #[arg(value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// Buy date (YYYY-MM-DD)
        #[arg(long)]
        buy: String,

        /// Sell date (YYYY-MM-DD)
        #[arg(long)]
        sell: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let config = match cli.api_key {
        Some(key) => IntrinioConfig::new(key),
        None => IntrinioConfig::from_env()
            .context("Pass --api-key or set INTRINIO_API_KEY (a .env file is read)")?,
    };
    let provider = IntrinioProvider::new(config)?;

    match cli.command {
        Commands::Statements {
            ticker,
            statement,
            years,
            periods,
            format,
        } => {
            let output = gather_financial_statement_time_series(
                &provider,
                &Symbol::parse(&ticker)?,
                statement.parse::<StatementKind>()?,
                &parse_all::<FiscalYear>(&years)?,
                &parse_all::<FiscalPeriod>(&periods)?,
                format.parse::<OutputFormat>()?,
            )
            .await?;
            print_statements(output)?;
        }
        Commands::Compare {
            tickers,
            statement,
            year,
            period,
            format,
        } => {
            let output = gather_financial_statement_company_compare(
                &provider,
                &parse_symbols(&tickers)?,
                statement.parse::<StatementKind>()?,
                year.parse::<FiscalYear>()?,
                period.parse::<FiscalPeriod>()?,
                format.parse::<OutputFormat>()?,
            )
            .await?;
            print_statements(output)?;
        }
        Commands::Prices {
            ticker,
            start,
            end,
            format,
        } => {
            let output = gather_stock_time_series(
                &provider,
                &Symbol::parse(&ticker)?,
                start.as_deref().map(parse_date).transpose()?,
                end.as_deref().map(parse_date).transpose()?,
                format.parse::<OutputFormat>()?,
            )
            .await?;
            match output {
                PriceOutput::Records(series) => {
                    println!("{}", serde_json::to_string_pretty(&series)?);
                }
                PriceOutput::Table(df) => println!("{df}"),
            }
        }
        Commands::Returns { tickers, buy, sell } => {
            let df = gather_stock_returns(
                &provider,
                &parse_symbols(&tickers)?,
                parse_date(&buy)?,
                parse_date(&sell)?,
            )
            .await?;
            println!("{df}");
        }
    }

    Ok(())
}

fn print_statements(output: StatementOutput) -> Result<()> {
    match output {
        StatementOutput::Records(statements) => {
            println!("{}", serde_json::to_string_pretty(&statements)?);
        }
        StatementOutput::Table(df) => println!("{df}"),
    }
    Ok(())
}

fn parse_symbols(tickers: &[String]) -> trinio::Result<Vec<Symbol>> {
    tickers.iter().map(|t| Symbol::parse(t)).collect()
}

fn parse_all<T>(values: &[String]) -> trinio::Result<Vec<T>>
where
    T: std::str::FromStr<Err = trinio::DataError>,
{
    values.iter().map(|v| v.parse()).collect()
}
