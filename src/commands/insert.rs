//! Commands that record new ledger entries.
//!
//! These are not optimistic: nothing local changes until the request has been delivered, and a
//! delivered request is reported as saved even though the response is never read.

use crate::api::{ExpenseEntry, OtherIncomeEntry};
use crate::app::{ExpenseForm, IncomeMode, IncomeReceipt, OtherIncomeForm, Tab};
use crate::args::{DuesArgs, ExpenseArgs, OtherIncomeArgs};
use crate::commands::{open, plural, Out};
use crate::model::format_rupiah;
use crate::render::totals_line;
use crate::{Config, Mode, Result};
use tracing::debug;

/// Records one dues payment for every member with a positive amount.
///
/// Members are loaded for `--class` (all when absent) and narrowed by `--search`. The default
/// amount applies to every listed member, then each `--pay` sets a single member's amount.
///
/// # Errors
/// - Validation, when no member ends up with a positive amount or an amount is invalid.
/// - Transport, when the request could not be delivered. Check the spreadsheet in that case.
pub async fn dues(config: Config, mode: Mode, args: DuesArgs) -> Result<Out<IncomeReceipt>> {
    let mut app = open(&config, mode).await?;
    app.load_members(args.class().unwrap_or_default()).await?;
    if let Some(term) = args.search() {
        app.search_members(term).await;
    }
    app.set_week(Some(args.week()));
    if let Some(date) = args.date() {
        app.set_date(Some(date));
    }
    if let Some(amount) = args.default_amount() {
        app.apply_default_amount(amount).await?;
    }
    for payment in args.pay() {
        app.set_amount(&payment.nim, &payment.amount).await?;
    }
    debug!("{}", totals_line(app.totals().await));

    let receipt = app.submit_income().await?;
    let message = format!(
        "Saved week {}: {} member{}, total {}",
        receipt.week,
        receipt.count,
        plural(receipt.count),
        format_rupiah(receipt.total)
    );
    Ok(Out::new(message, receipt))
}

pub async fn expense(config: Config, mode: Mode, args: ExpenseArgs) -> Result<Out<ExpenseEntry>> {
    let mut app = open(&config, mode).await?;
    app.switch_tab(Tab::Expense).await?;
    let mut form = ExpenseForm {
        kategori: args.category().to_string(),
        keterangan: args.note().to_string(),
        nominal: args.amount(),
        pj: args.pj().to_string(),
        ..ExpenseForm::default()
    };
    if let Some(date) = args.date() {
        form.date = Some(date);
    }
    let entry = app.submit_expense(form).await?;
    let message = format!(
        "Saved expense {} {} (PJ: {})",
        entry.kategori, entry.nominal, entry.pj
    );
    Ok(Out::new(message, entry))
}

pub async fn other_income(
    config: Config,
    mode: Mode,
    args: OtherIncomeArgs,
) -> Result<Out<OtherIncomeEntry>> {
    let mut app = open(&config, mode).await?;
    app.switch_income_mode(IncomeMode::Other);
    let mut form = OtherIncomeForm {
        sumber: args.source().to_string(),
        keterangan: args.note().to_string(),
        nominal: args.amount(),
        pj: args.pj().to_string(),
        ..OtherIncomeForm::default()
    };
    if let Some(date) = args.date() {
        form.date = Some(date);
    }
    let entry = app.submit_other_income(form).await?;
    let message = format!(
        "Saved other income {} {} (PJ: {})",
        entry.sumber, entry.nominal, entry.pj
    );
    Ok(Out::new(message, entry))
}
