use bigdecimal::BigDecimal;
use num_traits::Zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub u32);

/// What the importer needs to know about a ledger account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: AccountId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// External investment account number, set on brokerage accounts only.
    pub invest_number: Option<String>,
    /// Parent investment account for per-security sub-accounts.
    pub parent: Option<AccountId>,
    /// Current balance: currency for cash accounts, shares for securities.
    pub balance: BigDecimal,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            invest_number: None,
            parent: None,
            balance: BigDecimal::zero(),
        }
    }

    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
