use std::fmt;

/// The four tables the journal reads and writes. Each is row-owned by `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Trades,
    UserSettings,
    SmartWithdrawalSettings,
    WithdrawalTransactions,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Trades => "trades",
            Table::UserSettings => "user_settings",
            Table::SmartWithdrawalSettings => "smart_withdrawal_settings",
            Table::WithdrawalTransactions => "withdrawal_transactions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self { column, ascending: true }
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, ascending: false }
    }

    /// PostgREST `order=` parameter value.
    pub fn to_query_value(&self) -> String {
        format!(
            "{}.{}",
            self.column,
            if self.ascending { "asc" } else { "desc" }
        )
    }
}
