//! Setup SQL for each table, printed when the backend reports a missing relation.

use gateway::Table;

const TRADES: &str = r#"CREATE TABLE trades (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  user_id UUID REFERENCES auth.users(id) ON DELETE CASCADE NOT NULL,
  asset TEXT NOT NULL,
  type TEXT CHECK (type IN ('LONG', 'SHORT')) NOT NULL,
  leverage INTEGER NOT NULL,
  quantity DECIMAL NOT NULL,
  open_price DECIMAL NOT NULL,
  close_price DECIMAL,
  pnl DECIMAL NOT NULL,
  pnl_type TEXT CHECK (pnl_type IN ('REALIZED', 'UNREALIZED')) NOT NULL,
  open_time TIMESTAMP WITH TIME ZONE NOT NULL,
  close_time TIMESTAMP WITH TIME ZONE,
  notes TEXT,
  selected_tags TEXT[],
  created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

ALTER TABLE trades ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Users can manage their own trades" ON trades
  FOR ALL USING (auth.uid() = user_id);
"#;

const USER_SETTINGS: &str = r#"CREATE TABLE user_settings (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  user_id UUID REFERENCES auth.users(id) ON DELETE CASCADE NOT NULL UNIQUE,
  starting_capital DECIMAL DEFAULT 0,
  notifications BOOLEAN DEFAULT true,
  email_updates BOOLEAN DEFAULT false,
  auto_backup BOOLEAN DEFAULT true,
  theme TEXT DEFAULT 'dark',
  created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

ALTER TABLE user_settings ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Users can manage their own settings" ON user_settings
  FOR ALL USING (auth.uid() = user_id);
"#;

const SMART_WITHDRAWAL_SETTINGS: &str = r#"CREATE TABLE smart_withdrawal_settings (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  user_id UUID REFERENCES auth.users(id) ON DELETE CASCADE NOT NULL UNIQUE,
  enabled BOOLEAN DEFAULT false,
  reinvest_percentage DECIMAL(5,2) DEFAULT 50,
  created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

ALTER TABLE smart_withdrawal_settings ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Users can view their own settings" ON smart_withdrawal_settings
  FOR SELECT USING (auth.uid() = user_id);
CREATE POLICY "Users can insert their own settings" ON smart_withdrawal_settings
  FOR INSERT WITH CHECK (auth.uid() = user_id);
CREATE POLICY "Users can update their own settings" ON smart_withdrawal_settings
  FOR UPDATE USING (auth.uid() = user_id);
"#;

// No UPDATE or DELETE policy: the ledger is append-only.
const WITHDRAWAL_TRANSACTIONS: &str = r#"CREATE TABLE withdrawal_transactions (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  user_id UUID REFERENCES auth.users(id) ON DELETE CASCADE NOT NULL,
  amount DECIMAL(15,2) NOT NULL,
  action TEXT CHECK (action IN ('WITHDRAW', 'REVERT')) NOT NULL,
  timestamp TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  description TEXT,
  reverts_transaction_id UUID REFERENCES withdrawal_transactions(id)
);

ALTER TABLE withdrawal_transactions ENABLE ROW LEVEL SECURITY;

CREATE POLICY "Users can view their own transactions" ON withdrawal_transactions
  FOR SELECT USING (auth.uid() = user_id);
CREATE POLICY "Users can insert their own transactions" ON withdrawal_transactions
  FOR INSERT WITH CHECK (auth.uid() = user_id);

CREATE INDEX IF NOT EXISTS idx_withdrawal_transactions_user_id ON withdrawal_transactions(user_id);
CREATE INDEX IF NOT EXISTS idx_withdrawal_transactions_timestamp ON withdrawal_transactions(timestamp);
"#;

/// The SQL that creates `table` with its row-level security policies.
pub fn setup_sql(table: Table) -> &'static str {
    match table {
        Table::Trades => TRADES,
        Table::UserSettings => USER_SETTINGS,
        Table::SmartWithdrawalSettings => SMART_WITHDRAWAL_SETTINGS,
        Table::WithdrawalTransactions => WITHDRAWAL_TRANSACTIONS,
    }
}
