use bigdecimal::BigDecimal;

use crate::{
    common::message::ImportMessage,
    domain::{account::AccountInfo, security::SecurityInfo},
    worker::processor::RowContext,
};

/// Checks a row whose ticker has no security: the reported value should
/// match the account's own balance.
pub fn verify_account_balance(
    ctx: &mut RowContext<'_>,
    account: &AccountInfo,
    imported: &BigDecimal,
    ticker: &str,
    security_name: &str,
) {
    let balance = ctx.ledger.current_balance(account.id);
    if *imported != balance {
        ctx.messages.push(ImportMessage::BalanceMismatch {
            account: account.name.clone(),
            have: balance,
            imported: imported.clone(),
            ticker: ticker.to_string(),
            security_name: security_name.to_string(),
        });
    }
}

/// Checks the share count held in the security's sub-account of `account`.
pub fn verify_share_balance(
    ctx: &mut RowContext<'_>,
    account: &AccountInfo,
    security: &SecurityInfo,
    imported_shares: &BigDecimal,
) {
    let Some(sub_account) = ctx.ledger.sub_account_by_name(account.id, &security.name) else {
        ctx.messages.push(ImportMessage::MissingSecurityAccount {
            security: security.name.clone(),
            ticker: security.ticker.clone(),
            account: account.name.clone(),
        });
        return;
    };

    let balance = ctx.ledger.current_balance(sub_account.id);
    if *imported_shares != balance {
        ctx.messages.push(ImportMessage::ShareBalanceMismatch {
            sub_account: sub_account.name,
            ticker: security.ticker.clone(),
            account: account.name.clone(),
            have: balance,
            imported: imported_shares.clone(),
        });
    }
}
