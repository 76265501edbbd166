use crate::model::Rupiah;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The three kinds of ledger entries.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Dues paid by a member for a given week.
    InMember,
    /// Income that is not dues, e.g. a sponsorship.
    InOther,
    /// An expense.
    Out,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::InMember | TransactionType::InOther)
    }

    /// The badge shown next to an entry in the history list.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::InMember => "IURAN",
            TransactionType::InOther => "LAIN",
            TransactionType::Out => "KELUAR",
        }
    }
}

/// Restricts the history list to one kind of entry, or shows everything.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl TypeFilter {
    pub fn matches(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(only) => *only == kind,
        }
    }
}

impl Display for TypeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeFilter::All => write!(f, "all"),
            TypeFilter::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(TypeFilter::All);
        }
        TransactionType::from_str(s).map(TypeFilter::Only)
    }
}

/// One row of the history returned by the system of record.
///
/// `title` and `subtitle` are prepared by the remote side (e.g. member name and class for dues).
/// The remaining optional fields are only present for the matching `kind`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub nominal: Rupiah,
    /// Usually `YYYY-MM-DD`, but older rows may carry a full timestamp.
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelas: Option<String>,
    /// Week number, dues only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minggu: Option<u32>,
    /// Expense category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kategori: Option<String>,
    /// Source of other income.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sumber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
    /// Person responsible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pj: Option<String>,
}

impl Transaction {
    /// Creates a transaction with only the common fields set.
    pub fn new(
        id: impl Into<String>,
        kind: TransactionType,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        nominal: Rupiah,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            subtitle: subtitle.into(),
            nominal,
            date: date.into(),
            nim: None,
            nama: None,
            kelas: None,
            minggu: None,
            kategori: None,
            sumber: None,
            keterangan: None,
            pj: None,
        }
    }

    /// The short description used when asking whether to delete this entry, e.g.
    /// `Budi Santoso - Rp 10.000`.
    pub fn describe(&self) -> String {
        let who = match self.kind {
            TransactionType::InMember => self.nama.as_deref(),
            TransactionType::InOther => self.sumber.as_deref(),
            TransactionType::Out => self.kategori.as_deref(),
        }
        .unwrap_or(self.title.as_str());
        format!("{who} - {}", self.nominal)
    }
}

/// Running totals that come with the history.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub masuk: i64,
    #[serde(default)]
    pub keluar: i64,
    #[serde(default)]
    pub saldo: i64,
}

impl Summary {
    /// Sums `transactions` the way the system of record does.
    pub fn of(transactions: &[Transaction]) -> Self {
        let mut masuk = 0i64;
        let mut keluar = 0i64;
        for t in transactions {
            if t.kind.is_income() {
                masuk = masuk.saturating_add(t.nominal.signed());
            } else {
                keluar = keluar.saturating_add(t.nominal.signed());
            }
        }
        Self {
            masuk,
            keluar,
            saldo: masuk.saturating_sub(keluar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_dues_row() {
        let json = r#"{
            "id": "IN-0001",
            "type": "in_member",
            "title": "Budi Santoso",
            "subtitle": "SI-A - Minggu 3",
            "nominal": 10000,
            "date": "2025-01-05",
            "nim": "2201001",
            "nama": "Budi Santoso",
            "kelas": "SI-A",
            "minggu": 3,
            "pj": "Sari"
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind, TransactionType::InMember);
        assert_eq!(t.nominal, Rupiah::new(10_000));
        assert_eq!(t.minggu, Some(3));
        assert_eq!(t.kategori, None);
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let json = r#"{"id": "OUT-1", "type": "out", "nominal": 50000}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind, TransactionType::Out);
        assert_eq!(t.title, "");
        assert_eq!(t.date, "");
    }

    #[test]
    fn test_type_filter_parse() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "in_other".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(TransactionType::InOther)
        );
        assert!("income".parse::<TypeFilter>().is_err());
        assert_eq!(TypeFilter::Only(TransactionType::Out).to_string(), "out");
    }

    #[test]
    fn test_describe_uses_type_specific_field() {
        let mut t = Transaction::new(
            "OUT-1",
            TransactionType::Out,
            "Konsumsi rapat",
            "PJ: Sari",
            Rupiah::new(75_000),
            "2025-02-01",
        );
        assert_eq!(t.describe(), "Konsumsi rapat - Rp 75.000");
        t.kategori = Some("Konsumsi".to_string());
        assert_eq!(t.describe(), "Konsumsi - Rp 75.000");
    }

    #[test]
    fn test_summary_of() {
        let rows = vec![
            Transaction::new("a", TransactionType::InMember, "", "", Rupiah::new(10_000), ""),
            Transaction::new("b", TransactionType::InOther, "", "", Rupiah::new(5_000), ""),
            Transaction::new("c", TransactionType::Out, "", "", Rupiah::new(20_000), ""),
        ];
        let summary = Summary::of(&rows);
        assert_eq!(summary.masuk, 15_000);
        assert_eq!(summary.keluar, 20_000);
        assert_eq!(summary.saldo, -5_000);
    }
}
