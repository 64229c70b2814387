use super::open_ledger;
use crate::error::CliResult;
use crate::output::{print_json, OutputFormat};
use clap::Subcommand;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use surety_ledger::{Airline, FlightInfo, SuretyLedger};
use surety_types::NotificationRecord;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Subcommand, Debug, Clone)]
pub enum ShowCommands {
    /// Operational flag, consensus threshold, minimum fund and airline count
    Config,
    /// Airlines in registration order
    Airlines,
    /// Registered flights with their current status
    Flights,
    /// Treasury balance and its inflows
    Balance,
    /// Committed notifications
    Events {
        /// Only notifications above this height
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AirlineRow {
    address: String,
    name: String,
    state: String,
    funded: String,
    votes: String,
}

impl AirlineRow {
    fn project(ledger: &SuretyLedger, airline: &Airline) -> Self {
        let votes = ledger
            .state()
            .airlines
            .tally(&airline.address)
            .map(|tally| tally.yes_votes.to_string())
            .unwrap_or_else(|| "-".to_string());
        Self {
            address: airline.address.short(),
            name: airline.name.clone(),
            state: airline.state.to_string(),
            funded: airline.funded.to_ether_string(),
            votes,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct FlightRow {
    code: String,
    airline: String,
    route: String,
    timestamp: u64,
    status: String,
}

impl From<FlightInfo> for FlightRow {
    fn from(info: FlightInfo) -> Self {
        Self {
            code: info.code.to_string(),
            airline: info.airline_name,
            route: format!("{} -> {}", info.departure, info.arrival),
            timestamp: info.timestamp,
            status: info.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct BalanceRow {
    account: &'static str,
    ether: String,
}

#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    height: u64,
    event: &'static str,
    detail: String,
}

impl EventRow {
    fn project(record: &NotificationRecord) -> CliResult<Self> {
        let mut detail = serde_json::to_value(&record.notification)?;
        if let Some(fields) = detail.as_object_mut() {
            fields.remove("event");
        }
        Ok(Self {
            height: record.height,
            event: record.notification.name(),
            detail: detail.to_string(),
        })
    }
}

fn print_table<T: Tabled>(out: &mut dyn Write, rows: Vec<T>) -> CliResult<()> {
    if rows.is_empty() {
        writeln!(out, "(none)")?;
        return Ok(());
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(out, "{}", table)?;
    Ok(())
}

pub fn execute(
    command: ShowCommands,
    state: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let ledger = open_ledger(state, None)?;

    match command {
        ShowCommands::Config => {
            let config = ledger.fetch_data_contract_configuration();
            match format {
                OutputFormat::Json => print_json(out, &config)?,
                OutputFormat::Table => {
                    writeln!(out, "owner:               {}", ledger.owner())?;
                    writeln!(out, "operational:         {}", config.operational)?;
                    writeln!(out, "consensus threshold: {}", config.consensus_threshold)?;
                    writeln!(out, "min fund:            {} ether", config.min_fund.to_ether_string())?;
                    writeln!(out, "registered airlines: {}", config.registered_airline_count)?;
                    writeln!(out, "entropy seed:        {}", ledger.entropy_seed())?;
                    writeln!(out, "height:              {}", ledger.height())?;
                }
            }
        }
        ShowCommands::Airlines => match format {
            OutputFormat::Json => {
                let airlines: Vec<&Airline> = ledger.airlines().collect();
                print_json(out, &airlines)?;
            }
            OutputFormat::Table => {
                let rows = ledger
                    .airlines()
                    .map(|airline| AirlineRow::project(&ledger, airline))
                    .collect();
                print_table(out, rows)?;
            }
        },
        ShowCommands::Flights => {
            let flights = ledger
                .fetch_flights_codes()
                .iter()
                .map(|code| ledger.fetch_flight_info_by_code(code))
                .collect::<Result<Vec<_>, _>>()?;
            match format {
                OutputFormat::Json => print_json(out, &flights)?,
                OutputFormat::Table => {
                    print_table(out, flights.into_iter().map(FlightRow::from).collect())?
                }
            }
        }
        ShowCommands::Balance => {
            let treasury = &ledger.state().treasury;
            match format {
                OutputFormat::Json => print_json(out, treasury)?,
                OutputFormat::Table => {
                    let rows = vec![
                        ("airline funds", treasury.airline_funds),
                        ("oracle fees", treasury.oracle_fees),
                        ("premiums", treasury.premiums),
                        ("payouts", treasury.payouts),
                        ("balance", treasury.balance),
                    ]
                    .into_iter()
                    .map(|(account, amount)| BalanceRow {
                        account,
                        ether: amount.to_ether_string(),
                    })
                    .collect();
                    print_table(out, rows)?;
                }
            }
        }
        ShowCommands::Events { since } => {
            let records = ledger.notifications_since(since);
            match format {
                OutputFormat::Json => print_json(out, &records)?,
                OutputFormat::Table => {
                    let rows = records
                        .iter()
                        .map(EventRow::project)
                        .collect::<CliResult<Vec<_>>>()?;
                    print_table(out, rows)?;
                }
            }
        }
    }
    Ok(())
}
