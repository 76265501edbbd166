//! Read-only commands.

use crate::args::{HistoryArgs, MembersArgs};
use crate::commands::{open, plural, Out};
use crate::model::{Member, Summary, Transaction};
use crate::render::{history_table, members_table, summary_line};
use crate::{Config, Mode, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// What `kas history` returns.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryOutput {
    pub transactions: Vec<Transaction>,
    pub summary: Option<Summary>,
}

/// Lists the class labels.
pub async fn classes(config: Config, mode: Mode) -> Result<Out<Vec<String>>> {
    let mut app = open(&config, mode).await?;
    let classes = app.load_classes().await?;
    let mut message = format!("{} class{}", classes.len(), if classes.len() == 1 { "" } else { "es" });
    for c in &classes {
        message.push_str("\n  ");
        message.push_str(c);
    }
    Ok(Out::new(message, classes))
}

/// Lists members. The class filter is applied by the remote side, the search locally.
pub async fn members(config: Config, mode: Mode, args: MembersArgs) -> Result<Out<Vec<Member>>> {
    let mut app = open(&config, mode).await?;
    app.load_members(args.class().unwrap_or_default()).await?;
    if let Some(term) = args.search() {
        app.search_members(term).await;
    }
    let visible = app.visible_members().await;
    let message = format!(
        "{} member{}\n{}",
        visible.len(),
        plural(visible.len()),
        members_table(&visible, &BTreeMap::new())
    );
    Ok(Out::new(message, visible))
}

/// Shows the latest history entries matching the filter, followed by the totals over everything
/// the remote side holds.
pub async fn history(config: Config, mode: Mode, args: HistoryArgs) -> Result<Out<HistoryOutput>> {
    let mut app = open(&config, mode).await?;
    app.load_history().await?;
    app.set_history_filter(args.kind()).await;
    if let Some(term) = args.search() {
        app.set_history_search(term).await;
    }
    let transactions = app.visible_history().await;
    let summary = app.store().lock().await.summary();
    let mut message = history_table(&transactions);
    if let Some(summary) = summary {
        message.push('\n');
        message.push_str(&summary_line(summary));
    }
    Ok(Out::new(
        message,
        HistoryOutput {
            transactions,
            summary,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::{TransactionType, TypeFilter};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_data_commands_need_a_session() {
        let env = TestEnv::new().await;
        let err = classes(env.config(), Mode::Test).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Auth);
    }

    #[tokio::test]
    async fn test_classes() {
        let env = TestEnv::logged_in().await;
        let out = classes(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.structure().unwrap(), &vec!["SI-A", "SI-B", "SI-C"]);
        assert!(out.message().starts_with("3 classes"));
    }

    #[tokio::test]
    async fn test_members_class_and_search() {
        let env = TestEnv::logged_in().await;
        let out = members(
            env.config(),
            Mode::Test,
            MembersArgs::new(Some("SI-B".to_string()), Some("PUTRI".to_string())),
        )
        .await
        .unwrap();
        let found = out.structure().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nama, "Putri Ayu Ningsih");
        assert!(out.message().starts_with("1 member\n"));
    }

    #[tokio::test]
    async fn test_history_filtered() {
        let env = TestEnv::logged_in().await;
        let out = history(
            env.config(),
            Mode::Test,
            HistoryArgs::new(TypeFilter::Only(TransactionType::InMember), Some("minggu 2".to_string())),
        )
        .await
        .unwrap();
        let output = out.structure().unwrap();
        assert_eq!(output.transactions.len(), 2);
        assert!(output
            .transactions
            .iter()
            .all(|t| t.kind == TransactionType::InMember));
        assert_eq!(output.summary.unwrap().saldo, 185_000);
        assert!(out.message().ends_with("Saldo: Rp 185.000"));
    }
}
