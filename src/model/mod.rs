//! Types that represent the ledger data model, such as `Member` and `Transaction`.
mod date;
mod member;
mod rupiah;
mod transaction;

pub use date::{format_date, format_tanggal, parse_iso_date, today};
pub use member::Member;
pub use rupiah::{format_number, format_rupiah, Rupiah};
use serde::{Deserialize, Serialize};
pub use transaction::{Summary, Transaction, TransactionType, TypeFilter};

/// One page of history as returned by `getHistory`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub transactions: Vec<Transaction>,
    /// Absent when the remote side did not compute totals.
    pub summary: Option<Summary>,
}
