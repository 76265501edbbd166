//! The bodies of write requests.

use crate::model::Rupiah;
use serde::{Deserialize, Serialize};

/// One member's dues payment inside a `createIncome` request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DuesPayment {
    pub nim: String,
    pub nama: String,
    pub kelas: String,
    pub minggu: u32,
    /// `YYYY-MM-DD`
    pub tanggal: String,
    pub nominal: Rupiah,
}

/// The payload of a `createExpense` request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub tanggal: String,
    pub kategori: String,
    pub keterangan: String,
    pub nominal: Rupiah,
    pub pj: String,
}

/// The payload of a `createOtherIncome` request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OtherIncomeEntry {
    pub tanggal: String,
    pub sumber: String,
    pub keterangan: String,
    pub nominal: Rupiah,
    pub pj: String,
}

/// A request on the write channel. Serializes to `{ "action": "...", ...payload }`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum WriteRequest {
    CreateIncome { transactions: Vec<DuesPayment> },
    CreateExpense(ExpenseEntry),
    CreateOtherIncome(OtherIncomeEntry),
    UpdateIncome { id: String, nominal: Rupiah },
    DeleteIncome { id: String },
    DeleteExpense { id: String },
}

/// The name of a write request, without its payload.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteAction {
    CreateIncome,
    CreateExpense,
    CreateOtherIncome,
    UpdateIncome,
    DeleteIncome,
    DeleteExpense,
}

serde_plain::derive_display_from_serialize!(WriteAction);
serde_plain::derive_fromstr_from_deserialize!(WriteAction);

impl WriteRequest {
    pub fn action(&self) -> WriteAction {
        match self {
            WriteRequest::CreateIncome { .. } => WriteAction::CreateIncome,
            WriteRequest::CreateExpense(_) => WriteAction::CreateExpense,
            WriteRequest::CreateOtherIncome(_) => WriteAction::CreateOtherIncome,
            WriteRequest::UpdateIncome { .. } => WriteAction::UpdateIncome,
            WriteRequest::DeleteIncome { .. } => WriteAction::DeleteIncome,
            WriteRequest::DeleteExpense { .. } => WriteAction::DeleteExpense,
        }
    }

    /// Wraps the request together with the shared secret for sending.
    pub(crate) fn envelope<'a>(&'a self, secret_key: &'a str) -> Envelope<'a> {
        Envelope {
            secret_key,
            request: self,
        }
    }
}

/// The JSON body actually posted: `{ "action", "secretKey", ...payload }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<'a> {
    secret_key: &'a str,
    #[serde(flatten)]
    request: &'a WriteRequest,
}
