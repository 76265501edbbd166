//! Plain-text rendering of the member and history lists, and the `View` seam through which the
//! controller and the optimistic mutator ask for a re-render.

use crate::model::{format_rupiah, format_tanggal, Member, Rupiah, Summary, Transaction};
use crate::totals::Totals;
use std::collections::BTreeMap;
use tracing::debug;

/// Something that shows the current lists to the user.
pub trait View: Send + Sync {
    /// Shows the visible members with the amount typed for each so far.
    fn render_members(&self, members: &[Member], amounts: &BTreeMap<String, Rupiah>, totals: Totals);

    /// Shows the visible history entries and the running totals.
    fn render_history(&self, rows: &[Transaction], summary: Option<Summary>);
}

/// A `View` for the command line: every render is written to the debug log. The final state is
/// printed by the command itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogView;

impl View for LogView {
    fn render_members(&self, members: &[Member], amounts: &BTreeMap<String, Rupiah>, totals: Totals) {
        debug!(
            "Rendered {} members\n{}\n{}",
            members.len(),
            members_table(members, amounts),
            totals_line(totals)
        );
    }

    fn render_history(&self, rows: &[Transaction], summary: Option<Summary>) {
        debug!("Rendered {} history entries\n{}", rows.len(), history_table(rows));
        if let Some(summary) = summary {
            debug!("{}", summary_line(summary));
        }
    }
}

/// One line per member: nim, name, class and the pending amount, if any.
pub fn members_table(members: &[Member], amounts: &BTreeMap<String, Rupiah>) -> String {
    if members.is_empty() {
        return "No members found".to_string();
    }
    members
        .iter()
        .map(|m| {
            let amount = match amounts.get(&m.nim) {
                Some(a) if a.is_positive() => a.to_string(),
                _ => "-".to_string(),
            };
            format!("{:<12} {:<28} {:<8} {:>14}", m.nim, m.nama, m.kelas, amount)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per entry: id, badge, date, signed amount, title and subtitle.
pub fn history_table(rows: &[Transaction]) -> String {
    if rows.is_empty() {
        return "No transactions found".to_string();
    }
    rows.iter()
        .map(|t| {
            let sign = if t.kind.is_income() { "+" } else { "-" };
            let line = format!(
                "{:<12} {:<7} {:<12} {:>15}  {} | {}",
                t.id,
                t.kind.label(),
                format_tanggal(&t.date),
                format!("{sign}{}", t.nominal),
                t.title,
                t.subtitle
            );
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary_line(summary: Summary) -> String {
    format!(
        "Masuk: {}  Keluar: {}  Saldo: {}",
        format_rupiah(summary.masuk),
        format_rupiah(summary.keluar),
        format_rupiah(summary.saldo)
    )
}

pub fn totals_line(totals: Totals) -> String {
    format!(
        "{} paying, total {}",
        totals.count,
        format_rupiah(totals.total)
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::TransactionType;
    use std::sync::Mutex;

    /// A `View` that remembers every render.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingView {
        pub(crate) members: Mutex<Vec<Vec<Member>>>,
        pub(crate) history: Mutex<Vec<Vec<Transaction>>>,
    }

    impl RecordingView {
        pub(crate) fn history_renders(&self) -> Vec<Vec<Transaction>> {
            self.history.lock().unwrap().clone()
        }

        pub(crate) fn member_renders(&self) -> Vec<Vec<Member>> {
            self.members.lock().unwrap().clone()
        }
    }

    impl View for RecordingView {
        fn render_members(&self, members: &[Member], _: &BTreeMap<String, Rupiah>, _: Totals) {
            self.members.lock().unwrap().push(members.to_vec());
        }

        fn render_history(&self, rows: &[Transaction], _: Option<Summary>) {
            self.history.lock().unwrap().push(rows.to_vec());
        }
    }

    #[test]
    fn test_history_table() {
        let rows = vec![
            Transaction::new(
                "IN-1",
                TransactionType::InMember,
                "Budi Santoso",
                "SI-A - Minggu 1",
                Rupiah::new(10_000),
                "2025-01-05",
            ),
            Transaction::new(
                "OUT-1",
                TransactionType::Out,
                "Konsumsi",
                "Rapat",
                Rupiah::new(75_000),
                "2025-01-11",
            ),
        ];
        let table = history_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("IN-1"));
        assert!(lines[0].contains("IURAN"));
        assert!(lines[0].contains("5 Jan 2025"));
        assert!(lines[0].contains("+Rp 10.000"));
        assert!(lines[0].ends_with("Budi Santoso | SI-A - Minggu 1"));
        assert!(lines[1].contains("-Rp 75.000"));
        assert!(lines[1].contains("KELUAR"));
    }

    #[test]
    fn test_history_table_trims_every_line() {
        let row = |id: &str| {
            Transaction::new(id, TransactionType::InOther, "Sponsor", "", Rupiah::new(1), "2025-01-05")
        };
        let table = history_table(&[row("IN-1"), row("IN-2")]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.lines().all(|l| l.ends_with("Sponsor |")));
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(history_table(&[]), "No transactions found");
        assert_eq!(members_table(&[], &BTreeMap::new()), "No members found");
    }

    #[test]
    fn test_members_table_shows_pending_amounts() {
        let members = vec![
            Member::new("2201001", "Budi Santoso", "SI-A"),
            Member::new("2201002", "Siti Rahmawati", "SI-A"),
        ];
        let mut amounts = BTreeMap::new();
        amounts.insert("2201001".to_string(), Rupiah::new(10_000));
        amounts.insert("2201002".to_string(), Rupiah::ZERO);
        let table = members_table(&members, &amounts);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].ends_with("Rp 10.000"));
        assert!(lines[1].ends_with('-'));
    }

    #[test]
    fn test_summary_and_totals_lines() {
        let summary = Summary {
            masuk: 305_000,
            keluar: 120_000,
            saldo: 185_000,
        };
        assert_eq!(
            summary_line(summary),
            "Masuk: Rp 305.000  Keluar: Rp 120.000  Saldo: Rp 185.000"
        );
        assert_eq!(
            totals_line(Totals {
                count: 3,
                total: 30_000
            }),
            "3 paying, total Rp 30.000"
        );
    }
}
