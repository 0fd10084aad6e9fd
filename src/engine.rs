//! CSV batch driver over the ledger service.
//!
//! Reads `type,user,amount` commands in streaming fashion, applies each one
//! through [`LedgerService`], and reports final balances or full history.

use crate::balance::Balance;
use crate::command::{CommandRecord, LedgerCommand};
use crate::error::{LedgerError, Result};
use crate::service::LedgerService;
use csv::{ReaderBuilder, Trim};
use log::warn;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::sync::Arc;

/// Batch processor for ledger commands.
///
/// # Output Ordering
///
/// Users are written sorted by id in ascending order; history records for a
/// user follow application order.
pub struct LedgerEngine {
    service: Arc<LedgerService>,

    /// Every user id from a parsed command, including commands the ledger
    /// then rejected; such users are reported with their unchanged balance.
    users: BTreeSet<u64>,
}

impl LedgerEngine {
    /// Creates an engine over a fresh in-memory ledger.
    pub fn new() -> Self {
        Self::with_service(Arc::new(LedgerService::in_memory()))
    }

    /// Creates an engine over an existing, possibly shared, service.
    pub fn with_service(service: Arc<LedgerService>) -> Self {
        LedgerEngine {
            service,
            users: BTreeSet::new(),
        }
    }

    pub fn service(&self) -> &Arc<LedgerService> {
        &self.service
    }

    /// Processes commands from a CSV reader.
    ///
    /// Malformed rows and rejected commands are logged at warn level and
    /// skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                    continue;
                }
            };

            match record.parse() {
                Ok(command) => {
                    if let Err(e) = self.apply(command) {
                        warn!("Row {}: {}", row_num, e);
                    }
                }
                Err(message) => {
                    let e = LedgerError::InvalidRecord {
                        row: row_num,
                        message,
                    };
                    warn!("{}", e);
                }
            }
        }

        Ok(())
    }

    /// Applies a single command and returns the resulting balance.
    pub fn apply(&mut self, command: LedgerCommand) -> Result<Balance> {
        self.users.insert(command.user_id());
        match command {
            LedgerCommand::Charge { user_id, amount } => self.service.charge(user_id, amount),
            LedgerCommand::Use { user_id, amount } => self.service.use_points(user_id, amount),
        }
    }

    /// Writes `user,points` for every seen user.
    pub fn write_balances<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["user", "points"])?;
        for &user_id in &self.users {
            let balance = self.service.find_balance(user_id)?;
            csv_writer.write_record([balance.user_id.to_string(), balance.points.to_string()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes `id,user,type,amount` for every record of every seen user.
    pub fn write_history<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "user", "type", "amount"])?;
        for &user_id in &self.users {
            for record in self.service.find_history(user_id)? {
                csv_writer.write_record([
                    record.id.to_string(),
                    record.user_id.to_string(),
                    record.kind.to_string(),
                    record.amount.to_string(),
                ])?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
