//! Implements the gateway traits with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without a network connection (see `KAS_HIMA_IN_TEST_MODE`).

use crate::api::{Ack, ReadChannel, TransportError, WriteChannel, WriteRequest};
use crate::error::Res;
use crate::model::{HistoryPage, Member, Summary, Transaction, TransactionType};
use anyhow::{anyhow, bail, Context};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Everything the in-memory system of record holds.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TestState {
    pub members: Vec<Member>,
    /// Newest first, like the real history.
    pub history: Vec<Transaction>,
    /// Every request that was delivered, in order.
    pub sent: Vec<WriteRequest>,
}

/// An implementation of the gateway traits that does not use the network. It can hold any data
/// in memory and applies delivered writes to it the way the spreadsheet would. Failures can be
/// switched on to exercise rollback and error paths.
#[derive(Debug, Default)]
pub struct TestGateway {
    state: Mutex<TestState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl TestGateway {
    pub fn new(state: TestState) -> Self {
        Self {
            state: Mutex::new(state),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Creates a gateway holding the seed data from this module.
    pub fn seeded() -> Res<Self> {
        Ok(Self::new(TestState {
            members: load_csv(MEMBER_DATA).context("Unable to load seed members")?,
            history: load_csv(HISTORY_DATA).context("Unable to load seed history")?,
            sent: Vec::new(),
        }))
    }

    /// When `true`, every read fails.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// When `true`, every write fails as if the network were down and nothing is delivered.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// A copy of the current state.
    pub fn state(&self) -> TestState {
        self.lock().clone()
    }

    /// Replaces the current state.
    pub fn set_state(&self, state: TestState) {
        *self.lock() = state;
    }

    fn lock(&self) -> MutexGuard<'_, TestState> {
        // A panicking test must not poison the data for the assertions that follow.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reads(&self) -> Res<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("Simulated read failure");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReadChannel for TestGateway {
    async fn classes(&self) -> Res<Vec<String>> {
        self.check_reads()?;
        let classes: BTreeSet<String> = self.lock().members.iter().map(|m| m.kelas.clone()).collect();
        Ok(classes.into_iter().collect())
    }

    async fn members(&self, kelas: Option<&str>) -> Res<Vec<Member>> {
        self.check_reads()?;
        let state = self.lock();
        Ok(match kelas {
            Some(kelas) if !kelas.is_empty() => state
                .members
                .iter()
                .filter(|m| m.kelas == kelas)
                .cloned()
                .collect(),
            _ => state.members.clone(),
        })
    }

    async fn history(&self, limit: u32) -> Res<HistoryPage> {
        self.check_reads()?;
        let state = self.lock();
        Ok(HistoryPage {
            transactions: state.history.iter().take(limit as usize).cloned().collect(),
            summary: Some(Summary::of(&state.history)),
        })
    }
}

#[async_trait::async_trait]
impl WriteChannel for TestGateway {
    async fn send(&self, request: &WriteRequest) -> Result<Ack, TransportError> {
        let action = request.action();
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                action,
                anyhow!("Simulated network failure"),
            ));
        }
        let mut state = self.lock();
        apply(&mut state.history, request);
        state.sent.push(request.clone());
        debug!("Test gateway accepted {action}");
        Ok(Ack::new(action))
    }
}

/// Applies a delivered write. Requests that the spreadsheet would reject (e.g. an unknown id) are
/// silently ignored, just like the real thing looks from the outside.
fn apply(history: &mut Vec<Transaction>, request: &WriteRequest) {
    match request {
        WriteRequest::CreateIncome { transactions } => {
            for p in transactions {
                let mut t = Transaction::new(
                    new_id("IN"),
                    TransactionType::InMember,
                    p.nama.clone(),
                    format!("{} - Minggu {}", p.kelas, p.minggu),
                    p.nominal,
                    p.tanggal.clone(),
                );
                t.nim = Some(p.nim.clone());
                t.nama = Some(p.nama.clone());
                t.kelas = Some(p.kelas.clone());
                t.minggu = Some(p.minggu);
                history.insert(0, t);
            }
        }
        WriteRequest::CreateExpense(e) => {
            let mut t = Transaction::new(
                new_id("OUT"),
                TransactionType::Out,
                e.kategori.clone(),
                format!("{} (PJ: {})", e.keterangan, e.pj),
                e.nominal,
                e.tanggal.clone(),
            );
            t.kategori = Some(e.kategori.clone());
            t.keterangan = Some(e.keterangan.clone());
            t.pj = Some(e.pj.clone());
            history.insert(0, t);
        }
        WriteRequest::CreateOtherIncome(o) => {
            let mut t = Transaction::new(
                new_id("LAIN"),
                TransactionType::InOther,
                o.sumber.clone(),
                format!("{} (PJ: {})", o.keterangan, o.pj),
                o.nominal,
                o.tanggal.clone(),
            );
            t.sumber = Some(o.sumber.clone());
            t.keterangan = Some(o.keterangan.clone());
            t.pj = Some(o.pj.clone());
            history.insert(0, t);
        }
        WriteRequest::UpdateIncome { id, nominal } => {
            if let Some(t) = history
                .iter_mut()
                .find(|t| &t.id == id && t.kind == TransactionType::InMember)
            {
                t.nominal = *nominal;
            }
        }
        WriteRequest::DeleteIncome { id } => {
            history.retain(|t| !(&t.id == id && t.kind == TransactionType::InMember));
        }
        WriteRequest::DeleteExpense { id } => {
            history.retain(|t| !(&t.id == id && t.kind != TransactionType::InMember));
        }
    }
}

fn new_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &uuid[..8])
}

/// Loads rows from a CSV-formatted string with a header row.
fn load_csv<T>(csv_data: &str) -> Res<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Seed member data.
const MEMBER_DATA: &str = r##"nim,nama,kelas
2201001,Budi Santoso,SI-A
2201002,Siti Rahmawati,SI-A
2201003,Andi Pratama,SI-A
2201004,Dewi Lestari,SI-B
2201005,Rizky Maulana,SI-B
2201006,Putri Ayu Ningsih,SI-B
2201007,Fajar Nugroho,SI-C
2201008,Nabila Azzahra,SI-C
"##;

/// Seed history data, newest first.
const HISTORY_DATA: &str = r##"id,type,title,subtitle,nominal,date,nim,nama,kelas,minggu,kategori,sumber,keterangan,pj
IN-0006,in_member,Dewi Lestari,SI-B - Minggu 2,10000,2025-01-12,2201004,Dewi Lestari,SI-B,2,,,,
OUT-0002,out,Konsumsi,Rapat pleno (PJ: Sari),75000,2025-01-11,,,,,Konsumsi,,Rapat pleno,Sari
LAIN-0001,in_other,Sponsor,Seminar nasional (PJ: Fajar),250000,2025-01-10,,,,,,Sponsor,Seminar nasional,Fajar
IN-0005,in_member,Budi Santoso,SI-A - Minggu 2,10000,2025-01-12,2201001,Budi Santoso,SI-A,2,,,,
IN-0004,in_member,Siti Rahmawati,SI-A - Minggu 1,10000,2025-01-05,2201002,Siti Rahmawati,SI-A,1,,,,
OUT-0001,out,ATK,Kertas dan tinta (PJ: Andi),45000,2025-01-04,,,,,ATK,,Kertas dan tinta,Andi
IN-0003,in_member,Budi Santoso,SI-A - Minggu 1,10000,2025-01-05,2201001,Budi Santoso,SI-A,1,,,,
IN-0002,in_member,Andi Pratama,SI-A - Minggu 1,5000,2025-01-05,2201003,Andi Pratama,SI-A,1,,,,
IN-0001,in_member,Rizky Maulana,SI-B - Minggu 1,10000,2025-01-05,2201005,Rizky Maulana,SI-B,1,,,,
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DuesPayment, ExpenseEntry};
    use crate::model::Rupiah;

    #[test]
    fn test_seed_data_loads() {
        let gateway = TestGateway::seeded().unwrap();
        let state = gateway.state();
        assert_eq!(state.members.len(), 8);
        assert_eq!(state.history.len(), 9);
        let other = state.history.iter().find(|t| t.id == "LAIN-0001").unwrap();
        assert_eq!(other.kind, TransactionType::InOther);
        assert_eq!(other.sumber.as_deref(), Some("Sponsor"));
        assert_eq!(other.nim, None);
        let dues = state.history.iter().find(|t| t.id == "IN-0006").unwrap();
        assert_eq!(dues.minggu, Some(2));
    }

    #[tokio::test]
    async fn test_classes_are_distinct_and_sorted() {
        let gateway = TestGateway::seeded().unwrap();
        assert_eq!(gateway.classes().await.unwrap(), vec!["SI-A", "SI-B", "SI-C"]);
    }

    #[tokio::test]
    async fn test_members_filtered_by_class() {
        let gateway = TestGateway::seeded().unwrap();
        let members = gateway.members(Some("SI-C")).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.kelas == "SI-C"));
        assert_eq!(gateway.members(Some("")).await.unwrap().len(), 8);
        assert_eq!(gateway.members(None).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_history_limit_and_summary() {
        let gateway = TestGateway::seeded().unwrap();
        let page = gateway.history(3).await.unwrap();
        assert_eq!(page.transactions.len(), 3);
        let summary = page.summary.unwrap();
        assert_eq!(summary.masuk, 305_000);
        assert_eq!(summary.keluar, 120_000);
        assert_eq!(summary.saldo, 185_000);
    }

    #[tokio::test]
    async fn test_writes_are_applied() {
        let gateway = TestGateway::seeded().unwrap();
        gateway
            .send(&WriteRequest::CreateIncome {
                transactions: vec![DuesPayment {
                    nim: "2201007".to_string(),
                    nama: "Fajar Nugroho".to_string(),
                    kelas: "SI-C".to_string(),
                    minggu: 3,
                    tanggal: "2025-01-19".to_string(),
                    nominal: Rupiah::new(10_000),
                }],
            })
            .await
            .unwrap();
        gateway
            .send(&WriteRequest::CreateExpense(ExpenseEntry {
                tanggal: "2025-01-20".to_string(),
                kategori: "Transport".to_string(),
                keterangan: "Bensin".to_string(),
                nominal: Rupiah::new(30_000),
                pj: "Rizky".to_string(),
            }))
            .await
            .unwrap();
        gateway
            .send(&WriteRequest::UpdateIncome {
                id: "IN-0001".to_string(),
                nominal: Rupiah::new(20_000),
            })
            .await
            .unwrap();
        gateway
            .send(&WriteRequest::DeleteExpense {
                id: "OUT-0001".to_string(),
            })
            .await
            .unwrap();

        let state = gateway.state();
        assert_eq!(state.sent.len(), 4);
        assert_eq!(state.history.len(), 10);
        assert_eq!(state.history[0].kind, TransactionType::Out);
        assert_eq!(state.history[1].title, "Fajar Nugroho");
        assert_eq!(state.history[1].minggu, Some(3));
        let updated = state.history.iter().find(|t| t.id == "IN-0001").unwrap();
        assert_eq!(updated.nominal, Rupiah::new(20_000));
        assert!(state.history.iter().all(|t| t.id != "OUT-0001"));
    }

    #[tokio::test]
    async fn test_rejected_writes_look_delivered() {
        let gateway = TestGateway::seeded().unwrap();
        let before = gateway.state().history;
        // Dues cannot be deleted through deleteExpense, and unknown ids are ignored.
        let ack = gateway
            .send(&WriteRequest::DeleteExpense {
                id: "IN-0001".to_string(),
            })
            .await;
        assert!(ack.is_ok());
        let ack = gateway
            .send(&WriteRequest::UpdateIncome {
                id: "NOPE".to_string(),
                nominal: Rupiah::new(1),
            })
            .await;
        assert!(ack.is_ok());
        assert_eq!(gateway.state().history, before);
    }

    #[tokio::test]
    async fn test_failures() {
        let gateway = TestGateway::seeded().unwrap();
        gateway.set_fail_reads(true);
        assert!(gateway.classes().await.is_err());
        assert!(gateway.history(50).await.is_err());

        gateway.set_fail_writes(true);
        let result = gateway
            .send(&WriteRequest::DeleteIncome {
                id: "IN-0001".to_string(),
            })
            .await;
        assert!(result.is_err());
        let state = gateway.state();
        assert!(state.sent.is_empty());
        assert!(state.history.iter().any(|t| t.id == "IN-0001"));
    }
}
