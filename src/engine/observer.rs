//! Hooks for watching what the driver does.

use std::fmt;

use super::result::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionCommand {
    Begin,
    Commit,
    Rollback,
}

impl fmt::Display for TransactionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionCommand::Begin => "BEGIN",
            TransactionCommand::Commit => "COMMIT",
            TransactionCommand::Rollback => "ROLLBACK",
        })
    }
}

/// Receives driver events. Every method defaults to doing nothing.
pub trait QueryObserver {
    /// Called once per `Driver::query`, after the outcome is known.
    fn translated_query_executed(&mut self, _result: &QueryResult) {}

    /// Called for every transaction command. `depth` is the nesting level
    /// the command applied to; 0 is the outermost transaction.
    fn transaction_command(&mut self, _command: TransactionCommand, _depth: usize, _success: bool) {}
}
