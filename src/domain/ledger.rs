use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::domain::{
    account::{Account, AccountId, AccountInfo},
    security::{PriceSnapshot, Security, SecurityId, SecurityInfo},
};

/// The ledger operations the importer relies on. Row processing only reads;
/// the two setters are called when staged changes are committed.
pub trait LedgerStore {
    /// Finds the investment account carrying this external account number.
    fn investment_account(&self, number: &str) -> Option<AccountInfo>;
    fn sub_account_by_name(&self, parent: AccountId, name: &str) -> Option<AccountInfo>;
    fn current_balance(&self, account: AccountId) -> BigDecimal;
    fn security_by_ticker(&self, ticker: &str) -> Option<SecurityInfo>;
    /// The snapshot in effect on `date`, i.e. the latest dated on or before it.
    fn snapshot_for_date(&self, security: SecurityId, date: NaiveDate) -> Option<PriceSnapshot>;
    fn latest_snapshot(&self, security: SecurityId) -> Option<PriceSnapshot>;
    fn set_snapshot(&mut self, security: SecurityId, snapshot: &PriceSnapshot);
    fn current_price(&self, security: SecurityId) -> Option<BigDecimal>;
    fn set_current_price(&mut self, security: SecurityId, price: &BigDecimal);
}

/// In-memory ledger of accounts and securities.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ledger {
    pub accounts: Vec<Account>,
    pub securities: Vec<Security>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            securities: Vec::new(),
        }
    }

    pub fn add_investment_account(&mut self, name: &str, number: &str) -> AccountId {
        let id = AccountId(self.accounts.len() as u32);
        let mut account = Account::new(id, name);
        account.invest_number = Some(number.to_string());
        self.accounts.push(account);
        id
    }

    pub fn add_sub_account(
        &mut self,
        parent: AccountId,
        name: &str,
        balance: BigDecimal,
    ) -> AccountId {
        let id = AccountId(self.accounts.len() as u32);
        let mut account = Account::new(id, name);
        account.parent = Some(parent);
        account.balance = balance;
        self.accounts.push(account);
        id
    }

    pub fn add_security(&mut self, ticker: &str, name: &str) -> SecurityId {
        let id = SecurityId(self.securities.len() as u32);
        self.securities.push(Security::new(id, ticker, name));
        id
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(id.0 as usize)
    }

    pub fn account_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(id.0 as usize)
    }

    pub fn security(&self, id: SecurityId) -> Option<&Security> {
        self.securities.get(id.0 as usize)
    }

    pub fn security_mut(&mut self, id: SecurityId) -> Option<&mut Security> {
        self.securities.get_mut(id.0 as usize)
    }
}

impl LedgerStore for Ledger {
    fn investment_account(&self, number: &str) -> Option<AccountInfo> {
        self.accounts
            .iter()
            .find(|a| a.invest_number.as_deref() == Some(number))
            .map(Account::info)
    }

    fn sub_account_by_name(&self, parent: AccountId, name: &str) -> Option<AccountInfo> {
        self.accounts
            .iter()
            .find(|a| a.parent == Some(parent) && a.name == name)
            .map(Account::info)
    }

    fn current_balance(&self, account: AccountId) -> BigDecimal {
        self.account(account)
            .map(|a| a.balance.clone())
            .unwrap_or_default()
    }

    fn security_by_ticker(&self, ticker: &str) -> Option<SecurityInfo> {
        self.securities
            .iter()
            .find(|s| s.ticker.eq_ignore_ascii_case(ticker))
            .map(Security::info)
    }

    fn snapshot_for_date(&self, security: SecurityId, date: NaiveDate) -> Option<PriceSnapshot> {
        self.security(security)?.snapshot_for_date(date)
    }

    fn latest_snapshot(&self, security: SecurityId) -> Option<PriceSnapshot> {
        self.security(security)?.latest_snapshot()
    }

    fn set_snapshot(&mut self, security: SecurityId, snapshot: &PriceSnapshot) {
        if let Some(sec) = self.security_mut(security) {
            sec.set_snapshot(snapshot);
        }
    }

    fn current_price(&self, security: SecurityId) -> Option<BigDecimal> {
        self.security(security)?.current_price()
    }

    fn set_current_price(&mut self, security: SecurityId, price: &BigDecimal) {
        if let Some(sec) = self.security_mut(security) {
            sec.set_current_price(price);
        }
    }
}
