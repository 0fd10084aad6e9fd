//! Command models for CSV batch input.

use serde::Deserialize;

/// Raw command record as read from CSV.
///
/// Fields are kept as strings so that a malformed row can be reported
/// instead of aborting the whole batch.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Command type: charge or use
    #[serde(rename = "type")]
    pub command_type: String,

    /// User ID
    pub user: String,

    /// Amount in points
    pub amount: String,
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    ///
    /// Returns `Err` with a human-readable message for unknown types or
    /// non-integer fields. Negative amounts parse successfully; rejecting
    /// them is the ledger's job.
    pub fn parse(&self) -> Result<LedgerCommand, String> {
        let user_id: u64 = self
            .user
            .trim()
            .parse()
            .map_err(|_| format!("invalid user id {:?}", self.user))?;
        let amount: i64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| format!("invalid amount {:?}", self.amount))?;

        match self.command_type.trim().to_lowercase().as_str() {
            "charge" => Ok(LedgerCommand::Charge { user_id, amount }),
            "use" => Ok(LedgerCommand::Use { user_id, amount }),
            other => Err(format!("unknown command type {:?}", other)),
        }
    }
}

/// A parsed command ready to apply to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCommand {
    /// Credit points to a user.
    Charge { user_id: u64, amount: i64 },

    /// Debit points from a user.
    Use { user_id: u64, amount: i64 },
}

impl LedgerCommand {
    pub fn user_id(&self) -> u64 {
        match *self {
            LedgerCommand::Charge { user_id, .. } | LedgerCommand::Use { user_id, .. } => user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(command_type: &str, user: &str, amount: &str) -> CommandRecord {
        CommandRecord {
            command_type: command_type.to_string(),
            user: user.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_parse_charge() {
        let parsed = record("charge", "1", "500").parse().unwrap();
        assert_eq!(
            parsed,
            LedgerCommand::Charge {
                user_id: 1,
                amount: 500
            }
        );
        assert_eq!(parsed.user_id(), 1);
    }

    #[test]
    fn test_parse_use_case_insensitive() {
        let parsed = record("USE", "2", "30").parse().unwrap();
        assert_eq!(
            parsed,
            LedgerCommand::Use {
                user_id: 2,
                amount: 30
            }
        );
    }

    #[test]
    fn test_parse_handles_whitespace() {
        let parsed = record("  charge ", " 3 ", " 10 ").parse().unwrap();
        assert_eq!(
            parsed,
            LedgerCommand::Charge {
                user_id: 3,
                amount: 10
            }
        );
    }

    #[test]
    fn test_parse_keeps_negative_amount() {
        let parsed = record("use", "1", "-5").parse().unwrap();
        assert_eq!(
            parsed,
            LedgerCommand::Use {
                user_id: 1,
                amount: -5
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(record("refund", "1", "10").parse().is_err());
    }

    #[test]
    fn test_parse_rejects_fractional_amount() {
        assert!(record("charge", "1", "1.5").parse().is_err());
    }

    #[test]
    fn test_parse_rejects_negative_user() {
        assert!(record("charge", "-1", "10").parse().is_err());
    }
}
