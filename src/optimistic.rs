//! Optimistic writes: change the Local Store first, then tell the remote side, and undo the local
//! change if the request never left the machine.
//!
//! The store lock is taken only around the synchronous mutation and render steps. It is released
//! before the network await so that a full reload can run while a write is in flight. Each undo
//! remembers the snapshot it was made against and does nothing once a reload has replaced it.

use crate::api::{Ack, TransportError, WriteChannel, WriteRequest};
use crate::error::Res;
use crate::model::Rupiah;
use crate::store::LocalStore;
use anyhow::anyhow;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Reverts one applied mutation.
pub type Undo = Box<dyn FnOnce(&mut LocalStore) + Send>;

/// How an optimistic write settled.
#[derive(Debug)]
pub enum Outcome {
    /// The request was delivered. Whether the remote side accepted it is unknown.
    Sent(Ack),
    /// The request could not be delivered and the local change was reverted.
    RolledBack(TransportError),
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent(_))
    }
}

/// Applies `mutation` to `store`, renders, sends `request` over `channel`, and rolls back with a
/// second render when the send fails.
///
/// When `mutation` fails nothing is changed and nothing is sent.
pub async fn apply_and_send<C, M, R>(
    store: &Mutex<LocalStore>,
    mutation: M,
    request: WriteRequest,
    channel: &C,
    render: R,
) -> Res<Outcome>
where
    C: WriteChannel + ?Sized,
    M: FnOnce(&mut LocalStore) -> Res<Undo>,
    R: Fn(&LocalStore),
{
    let undo = {
        let mut guard = store.lock().await;
        let undo = mutation(&mut *guard)?;
        render(&*guard);
        undo
    };

    match channel.send(&request).await {
        Ok(ack) => {
            debug!("Sent {}", ack.action());
            Ok(Outcome::Sent(ack))
        }
        Err(e) => {
            warn!("{e}, rolling back the local change");
            let mut guard = store.lock().await;
            undo(&mut *guard);
            render(&*guard);
            Ok(Outcome::RolledBack(e))
        }
    }
}

/// Sets the nominal of the history entry `id`. Undo restores the previous nominal unless the
/// history has been reloaded since.
pub fn set_nominal(
    id: impl Into<String>,
    nominal: Rupiah,
) -> impl FnOnce(&mut LocalStore) -> Res<Undo> {
    let id = id.into();
    move |store| {
        let snapshot = store.snapshot();
        let record = store
            .history_mut()
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("No transaction with id '{id}'"))?;
        let previous = record.nominal;
        record.nominal = nominal;
        Ok(Box::new(move |store: &mut LocalStore| {
            if store.snapshot() != snapshot {
                debug!("History was reloaded, leaving '{id}' as fetched");
                return;
            }
            match store.history_mut().iter_mut().find(|t| t.id == id) {
                Some(t) => t.nominal = previous,
                None => debug!("'{id}' is gone, nothing to restore"),
            }
        }))
    }
}

/// Removes the history entry `id`. Undo puts it back at its old index, or at the end if the list
/// has since shrunk. After a reload it does nothing.
pub fn remove(id: impl Into<String>) -> impl FnOnce(&mut LocalStore) -> Res<Undo> {
    let id = id.into();
    move |store| {
        let snapshot = store.snapshot();
        let index = store
            .position(&id)
            .ok_or_else(|| anyhow!("No transaction with id '{id}'"))?;
        let removed = store.history_mut().remove(index);
        Ok(Box::new(move |store: &mut LocalStore| {
            if store.snapshot() != snapshot {
                debug!("History was reloaded, not restoring '{}'", removed.id);
                return;
            }
            if store.position(&removed.id).is_some() {
                debug!("'{}' is already back, nothing to restore", removed.id);
                return;
            }
            let history = store.history_mut();
            let index = index.min(history.len());
            history.insert(index, removed);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestGateway, WriteAction};
    use crate::model::{HistoryPage, Transaction, TransactionType};
    use crate::render::tests::RecordingView;
    use crate::render::View;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn entry(id: &str, nominal: u64) -> Transaction {
        Transaction::new(
            id,
            TransactionType::InMember,
            "Budi Santoso",
            "SI-A - Minggu 1",
            Rupiah::new(nominal),
            "2025-01-05",
        )
    }

    fn store_with(rows: Vec<Transaction>) -> Mutex<LocalStore> {
        let mut store = LocalStore::new();
        store.set_history(HistoryPage {
            transactions: rows,
            summary: None,
        });
        Mutex::new(store)
    }

    fn update(id: &str, nominal: u64) -> WriteRequest {
        WriteRequest::UpdateIncome {
            id: id.to_string(),
            nominal: Rupiah::new(nominal),
        }
    }

    fn nominals(renders: &[Vec<Transaction>]) -> Vec<u64> {
        renders.iter().map(|r| r[0].nominal.value()).collect()
    }

    /// A channel that waits for a signal before failing.
    struct GatedChannel {
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl WriteChannel for GatedChannel {
        async fn send(&self, request: &WriteRequest) -> Result<Ack, TransportError> {
            self.entered.notify_one();
            self.release.notified().await;
            Err(TransportError::new(
                request.action(),
                anyhow!("connection reset"),
            ))
        }
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back() {
        let store = store_with(vec![entry("t1", 500)]);
        let gateway = TestGateway::default();
        gateway.set_fail_writes(true);
        let view = RecordingView::default();

        let outcome = apply_and_send(
            &store,
            set_nominal("t1", Rupiah::new(700)),
            update("t1", 700),
            &gateway,
            |s: &LocalStore| view.render_history(s.history(), s.summary()),
        )
        .await
        .unwrap();

        match outcome {
            Outcome::RolledBack(e) => assert_eq!(e.action(), WriteAction::UpdateIncome),
            other => panic!("expected a rollback, got {other:?}"),
        }
        assert_eq!(store.lock().await.find("t1").unwrap().nominal, Rupiah::new(500));
        assert_eq!(nominals(&view.history_renders()), vec![700, 500]);
    }

    #[tokio::test]
    async fn test_successful_send_keeps_change() {
        let store = store_with(vec![entry("t1", 500)]);
        let gateway = TestGateway::default();
        let view = RecordingView::default();

        let outcome = apply_and_send(
            &store,
            set_nominal("t1", Rupiah::new(700)),
            update("t1", 700),
            &gateway,
            |s: &LocalStore| view.render_history(s.history(), s.summary()),
        )
        .await
        .unwrap();

        assert!(outcome.is_sent());
        assert_eq!(store.lock().await.find("t1").unwrap().nominal, Rupiah::new(700));
        assert_eq!(nominals(&view.history_renders()), vec![700]);
        assert_eq!(gateway.state().sent, vec![update("t1", 700)]);
    }

    #[tokio::test]
    async fn test_unknown_id_sends_nothing() {
        let store = store_with(vec![entry("t1", 500)]);
        let gateway = TestGateway::default();
        let view = RecordingView::default();

        let result = apply_and_send(
            &store,
            remove("missing"),
            WriteRequest::DeleteIncome {
                id: "missing".to_string(),
            },
            &gateway,
            |s: &LocalStore| view.render_history(s.history(), s.summary()),
        )
        .await;

        assert!(result.is_err());
        assert!(gateway.state().sent.is_empty());
        assert!(view.history_renders().is_empty());
        assert_eq!(store.lock().await.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_reinserts_at_old_index() {
        let store = store_with(vec![entry("a", 1), entry("b", 2), entry("c", 3)]);
        let gateway = TestGateway::default();
        gateway.set_fail_writes(true);

        let outcome = apply_and_send(
            &store,
            remove("b"),
            WriteRequest::DeleteIncome { id: "b".to_string() },
            &gateway,
            |_: &LocalStore| {},
        )
        .await
        .unwrap();

        assert!(!outcome.is_sent());
        let ids: Vec<String> = store
            .lock()
            .await
            .history()
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_undo_clamps_to_shrunk_list() {
        let mut store = LocalStore::new();
        store.set_history(HistoryPage {
            transactions: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
            summary: None,
        });
        let undo_c = remove("c")(&mut store).unwrap();
        let undo_b = remove("b")(&mut store).unwrap();
        // c's old index is past the end of [a]
        undo_c(&mut store);
        undo_b(&mut store);
        let ids: Vec<&str> = store.history().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_undo_skips_after_reload() {
        let mut store = LocalStore::new();
        store.set_history(HistoryPage {
            transactions: vec![entry("a", 1), entry("b", 2)],
            summary: None,
        });
        let undo = remove("b")(&mut store).unwrap();
        store.set_history(HistoryPage {
            transactions: vec![entry("a", 1)],
            summary: None,
        });
        undo(&mut store);
        let ids: Vec<&str> = store.history().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_set_nominal_undo_keeps_reloaded_value() {
        let mut store = LocalStore::new();
        store.set_history(HistoryPage {
            transactions: vec![entry("t1", 500)],
            summary: None,
        });
        let undo = set_nominal("t1", Rupiah::new(700))(&mut store).unwrap();
        store.set_history(HistoryPage {
            transactions: vec![entry("t1", 900)],
            summary: None,
        });
        undo(&mut store);
        assert_eq!(store.find("t1").unwrap().nominal, Rupiah::new(900));
    }

    #[tokio::test]
    async fn test_reload_during_send_makes_rollback_a_no_op() {
        let store = Arc::new(store_with(vec![entry("t1", 500)]));
        let channel = GatedChannel {
            entered: Notify::new(),
            release: Notify::new(),
        };

        let write = apply_and_send(
            &store,
            set_nominal("t1", Rupiah::new(700)),
            update("t1", 700),
            &channel,
            |_: &LocalStore| {},
        );
        let reload = async {
            channel.entered.notified().await;
            // the lock is free while the write is in flight
            store.lock().await.set_history(HistoryPage {
                transactions: vec![entry("t2", 42)],
                summary: None,
            });
            channel.release.notify_one();
        };
        let (outcome, _) = tokio::join!(write, reload);

        assert!(!outcome.unwrap().is_sent());
        let store = store.lock().await;
        assert_eq!(store.find("t1"), None);
        assert_eq!(store.find("t2").unwrap().nominal, Rupiah::new(42));
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_with_same_record_survives_failed_send() {
        let store = Arc::new(store_with(vec![entry("t1", 500)]));
        let channel = GatedChannel {
            entered: Notify::new(),
            release: Notify::new(),
        };
        let view = RecordingView::default();

        let write = apply_and_send(
            &store,
            set_nominal("t1", Rupiah::new(700)),
            update("t1", 700),
            &channel,
            |s: &LocalStore| view.render_history(s.history(), s.summary()),
        );
        let reload = async {
            channel.entered.notified().await;
            store.lock().await.set_history(HistoryPage {
                transactions: vec![entry("t1", 900)],
                summary: None,
            });
            channel.release.notify_one();
        };
        let (outcome, _) = tokio::join!(write, reload);

        assert!(!outcome.unwrap().is_sent());
        assert_eq!(store.lock().await.find("t1").unwrap().nominal, Rupiah::new(900));
        assert_eq!(nominals(&view.history_renders()), vec![700, 900]);
    }
}
