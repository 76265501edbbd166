//! The controller. `App` owns the `AppState` and the Local Store, and every user action is one of
//! its transitions. Reads record a `LoadState`; writes either go straight to the gateway (creates)
//! or through the optimistic mutator (edits and deletes).

use crate::api::{
    DuesPayment, ExpenseEntry, Gateway, OtherIncomeEntry, ReadChannel, TransportError, WriteChannel,
    WriteRequest,
};
use crate::error::{Error, ErrorType, Res};
use crate::model::{today, Member, Rupiah, Transaction, TransactionType, TypeFilter};
use crate::optimistic::{self, Outcome, Undo};
use crate::render::View;
use crate::store::{self, LocalStore};
use crate::totals::{compute_totals, Totals};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The top-level tabs.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Income,
    Expense,
    History,
}

serde_plain::derive_display_from_serialize!(Tab);
serde_plain::derive_fromstr_from_deserialize!(Tab);

/// The two forms of the income tab.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeMode {
    #[default]
    Dues,
    Other,
}

serde_plain::derive_display_from_serialize!(IncomeMode);
serde_plain::derive_fromstr_from_deserialize!(IncomeMode);

/// Progress of one read.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// The weekly dues form. Amounts are keyed by nim.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DuesForm {
    pub week: Option<u32>,
    pub date: Option<NaiveDate>,
    pub amounts: BTreeMap<String, Rupiah>,
}

impl Default for DuesForm {
    fn default() -> Self {
        Self {
            week: None,
            date: Some(today()),
            amounts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExpenseForm {
    pub date: Option<NaiveDate>,
    pub kategori: String,
    pub keterangan: String,
    pub nominal: Rupiah,
    pub pj: String,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self {
            date: Some(today()),
            kategori: String::new(),
            keterangan: String::new(),
            nominal: Rupiah::ZERO,
            pj: String::new(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OtherIncomeForm {
    pub date: Option<NaiveDate>,
    pub sumber: String,
    pub keterangan: String,
    pub nominal: Rupiah,
    pub pj: String,
}

impl Default for OtherIncomeForm {
    fn default() -> Self {
        Self {
            date: Some(today()),
            sumber: String::new(),
            keterangan: String::new(),
            nominal: Rupiah::ZERO,
            pj: String::new(),
        }
    }
}

/// The entry a delete confirmation is waiting on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteTarget {
    pub id: String,
    pub kind: TransactionType,
}

/// Everything the user has selected or typed so far.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct AppState {
    pub tab: Tab,
    pub income_mode: IncomeMode,
    pub class_filter: String,
    pub member_search: String,
    pub history_filter: TypeFilter,
    pub history_search: String,
    pub dues: DuesForm,
    pub expense: ExpenseForm,
    pub other_income: OtherIncomeForm,
    pub edit_target: Option<String>,
    pub delete_target: Option<DeleteTarget>,
    pub classes_load: LoadState,
    pub members_load: LoadState,
    pub history_load: LoadState,
}

/// What a successful dues submission delivered.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct IncomeReceipt {
    pub week: u32,
    pub count: usize,
    pub total: i64,
}

pub struct App {
    state: AppState,
    store: Arc<Mutex<LocalStore>>,
    gateway: Arc<dyn Gateway>,
    view: Arc<dyn View>,
    history_limit: u32,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, view: Arc<dyn View>, history_limit: u32) -> Self {
        Self {
            state: AppState::default(),
            store: Arc::new(Mutex::new(LocalStore::new())),
            gateway,
            view,
            history_limit,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> Arc<Mutex<LocalStore>> {
        Arc::clone(&self.store)
    }

    pub async fn switch_tab(&mut self, tab: Tab) -> Result<()> {
        self.state.tab = tab;
        if tab == Tab::History {
            self.load_history().await?;
        }
        Ok(())
    }

    pub fn switch_income_mode(&mut self, mode: IncomeMode) {
        self.state.income_mode = mode;
    }

    /// Fetches the class labels for the class filter.
    pub async fn load_classes(&mut self) -> Result<Vec<String>> {
        self.state.classes_load = LoadState::Loading;
        let classes = match self.gateway.classes().await {
            Ok(classes) => classes,
            Err(e) => return Err(fail(&mut self.state.classes_load, e)),
        };
        self.state.classes_load = LoadState::Loaded;
        self.store.lock().await.set_classes(classes.clone());
        Ok(classes)
    }

    /// Fetches the members of `class`, or all members when it is empty. Pending amounts and the
    /// search term are cleared since the list they referred to is gone.
    pub async fn load_members(&mut self, class: &str) -> Result<()> {
        self.state.class_filter = class.to_string();
        self.state.members_load = LoadState::Loading;
        let kelas = (!class.is_empty()).then_some(class);
        let members = match self.gateway.members(kelas).await {
            Ok(members) => members,
            Err(e) => return Err(fail(&mut self.state.members_load, e)),
        };
        debug!("Loaded {} members", members.len());
        self.state.members_load = LoadState::Loaded;
        self.state.member_search.clear();
        self.state.dues.amounts.clear();
        self.store.lock().await.set_members(members);
        self.render_members().await;
        Ok(())
    }

    pub async fn search_members(&mut self, term: &str) {
        self.state.member_search = term.to_string();
        self.render_members().await;
    }

    /// Fetches the latest history page. This is the full reload that makes the Local Store agree
    /// with the system of record again.
    pub async fn load_history(&mut self) -> Result<()> {
        self.state.history_load = LoadState::Loading;
        let page = match self.gateway.history(self.history_limit).await {
            Ok(page) => page,
            Err(e) => return Err(fail(&mut self.state.history_load, e)),
        };
        debug!("Loaded {} history entries", page.transactions.len());
        self.state.history_load = LoadState::Loaded;
        self.store.lock().await.set_history(page);
        self.render_history().await;
        Ok(())
    }

    pub async fn set_history_filter(&mut self, filter: TypeFilter) {
        self.state.history_filter = filter;
        self.render_history().await;
    }

    pub async fn set_history_search(&mut self, term: &str) {
        self.state.history_search = term.to_string();
        self.render_history().await;
    }

    pub async fn visible_members(&self) -> Vec<Member> {
        let store = self.store.lock().await;
        store::search_members(store.members(), &self.state.member_search)
    }

    pub async fn visible_history(&self) -> Vec<Transaction> {
        let store = self.store.lock().await;
        store::filter_history(
            store.history(),
            self.state.history_filter,
            &self.state.history_search,
        )
    }

    pub fn set_week(&mut self, week: Option<u32>) {
        self.state.dues.week = week;
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.state.dues.date = date;
    }

    /// Records what was typed for one member. Anything that does not parse to a positive amount
    /// simply does not count.
    pub async fn set_amount(&mut self, nim: &str, text: &str) -> Result<()> {
        if !self.store.lock().await.members().iter().any(|m| m.nim == nim) {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("No member with nim '{nim}' in the current list"),
            ));
        }
        self.state
            .dues
            .amounts
            .insert(nim.to_string(), Rupiah::parse(text));
        self.render_members().await;
        Ok(())
    }

    /// Sets the same amount for every visible member.
    pub async fn apply_default_amount(&mut self, text: &str) -> Result<()> {
        let amount = Rupiah::parse(text);
        if !amount.is_positive() {
            return Err(Error::msg(ErrorType::Validation, "Enter a valid amount"));
        }
        for m in self.visible_members().await {
            self.state.dues.amounts.insert(m.nim, amount);
        }
        self.render_members().await;
        Ok(())
    }

    /// Totals over the amounts of the members currently loaded.
    pub async fn totals(&self) -> Totals {
        let store = self.store.lock().await;
        compute_totals(
            store
                .members()
                .iter()
                .filter_map(|m| self.state.dues.amounts.get(&m.nim))
                .map(Rupiah::signed),
        )
    }

    pub async fn can_submit(&self) -> bool {
        let dues = &self.state.dues;
        self.totals()
            .await
            .ready(dues.week.is_some(), dues.date.is_some())
    }

    /// Sends one dues payment per member with a positive amount. The form is reset on delivery.
    pub async fn submit_income(&mut self) -> Result<IncomeReceipt> {
        let (week, date) = match (self.state.dues.week, self.state.dues.date) {
            (Some(week), Some(date)) => (week, date),
            _ => {
                return Err(Error::msg(
                    ErrorType::Validation,
                    "Select a week and a date",
                ))
            }
        };
        let transactions: Vec<DuesPayment> = {
            let store = self.store.lock().await;
            store
                .members()
                .iter()
                .filter_map(|m| {
                    let nominal = self.state.dues.amounts.get(&m.nim)?;
                    nominal.is_positive().then(|| DuesPayment {
                        nim: m.nim.clone(),
                        nama: m.nama.clone(),
                        kelas: m.kelas.clone(),
                        minggu: week,
                        tanggal: iso(date),
                        nominal: *nominal,
                    })
                })
                .collect()
        };
        if transactions.is_empty() {
            return Err(Error::msg(ErrorType::Validation, "No payments entered"));
        }
        let receipt = IncomeReceipt {
            week,
            count: transactions.len(),
            total: compute_totals(transactions.iter().map(|p| p.nominal.signed())).total,
        };

        self.gateway
            .send(&WriteRequest::CreateIncome { transactions })
            .await
            .map_err(unconfirmed)?;
        info!(
            "Sent {} dues payments for week {week}",
            receipt.count
        );
        self.state.dues = DuesForm::default();
        self.state.member_search.clear();
        self.render_members().await;
        Ok(receipt)
    }

    /// Validates and sends an expense. The form is reset on delivery.
    pub async fn submit_expense(&mut self, form: ExpenseForm) -> Result<ExpenseEntry> {
        self.state.expense = form;
        let form = &self.state.expense;
        let tanggal = validate_entry(form.date, &form.kategori, "category", form.nominal, &form.pj)?;
        let entry = ExpenseEntry {
            tanggal,
            kategori: form.kategori.clone(),
            keterangan: form.keterangan.clone(),
            nominal: form.nominal,
            pj: form.pj.trim().to_string(),
        };
        self.gateway
            .send(&WriteRequest::CreateExpense(entry.clone()))
            .await
            .map_err(unconfirmed)?;
        self.state.expense = ExpenseForm::default();
        Ok(entry)
    }

    /// Validates and sends a non-dues income. The form is reset on delivery.
    pub async fn submit_other_income(&mut self, form: OtherIncomeForm) -> Result<OtherIncomeEntry> {
        self.state.other_income = form;
        let form = &self.state.other_income;
        let tanggal = validate_entry(form.date, &form.sumber, "source", form.nominal, &form.pj)?;
        let entry = OtherIncomeEntry {
            tanggal,
            sumber: form.sumber.clone(),
            keterangan: form.keterangan.clone(),
            nominal: form.nominal,
            pj: form.pj.trim().to_string(),
        };
        self.gateway
            .send(&WriteRequest::CreateOtherIncome(entry.clone()))
            .await
            .map_err(unconfirmed)?;
        self.state.other_income = OtherIncomeForm::default();
        Ok(entry)
    }

    /// Selects a dues entry for editing.
    pub async fn open_edit(&mut self, id: &str) -> Result<Transaction> {
        let t = self.find(id).await?;
        if t.kind != TransactionType::InMember {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("Only dues entries can be edited, '{id}' is {}", t.kind),
            ));
        }
        self.state.edit_target = Some(t.id.clone());
        Ok(t)
    }

    pub fn cancel_edit(&mut self) {
        self.state.edit_target = None;
    }

    /// Optimistically changes the nominal of the entry being edited.
    pub async fn save_edit(&mut self, text: &str) -> Result<Outcome> {
        if self.state.edit_target.is_none() {
            return Err(Error::msg(ErrorType::Validation, "Nothing is being edited"));
        }
        let nominal = Rupiah::parse(text);
        if !nominal.is_positive() {
            return Err(Error::msg(ErrorType::Validation, "Invalid amount"));
        }
        let Some(id) = self.state.edit_target.take() else {
            return Err(Error::msg(ErrorType::Validation, "Nothing is being edited"));
        };
        let request = WriteRequest::UpdateIncome {
            id: id.clone(),
            nominal,
        };
        self.optimistic(optimistic::set_nominal(id, nominal), request)
            .await
    }

    /// Selects any entry for deletion.
    pub async fn open_delete(&mut self, id: &str) -> Result<Transaction> {
        let t = self.find(id).await?;
        self.state.delete_target = Some(DeleteTarget {
            id: t.id.clone(),
            kind: t.kind,
        });
        Ok(t)
    }

    pub fn cancel_delete(&mut self) {
        self.state.delete_target = None;
    }

    /// Optimistically removes the entry awaiting deletion. Dues go through `deleteIncome`, all
    /// other entries through `deleteExpense`.
    pub async fn confirm_delete(&mut self) -> Result<Outcome> {
        let Some(target) = self.state.delete_target.take() else {
            return Err(Error::msg(ErrorType::Validation, "Nothing is selected for deletion"));
        };
        let request = match target.kind {
            TransactionType::InMember => WriteRequest::DeleteIncome {
                id: target.id.clone(),
            },
            TransactionType::InOther | TransactionType::Out => WriteRequest::DeleteExpense {
                id: target.id.clone(),
            },
        };
        self.optimistic(optimistic::remove(target.id), request).await
    }

    async fn optimistic<M>(&self, mutation: M, request: WriteRequest) -> Result<Outcome>
    where
        M: FnOnce(&mut LocalStore) -> Res<Undo>,
    {
        let view = Arc::clone(&self.view);
        let filter = self.state.history_filter;
        let term = self.state.history_search.clone();
        let render = move |s: &LocalStore| {
            view.render_history(&store::filter_history(s.history(), filter, &term), s.summary())
        };
        let outcome = optimistic::apply_and_send(
            &self.store,
            mutation,
            request,
            &*self.gateway,
            render,
        )
        .await
        .map_err(|e| Error::new(ErrorType::Validation, e))?;
        if let Outcome::RolledBack(e) = &outcome {
            warn!("Reverted the local change after: {e}");
        }
        Ok(outcome)
    }

    async fn find(&self, id: &str) -> Result<Transaction> {
        self.store.lock().await.find(id).cloned().ok_or_else(|| {
            Error::msg(
                ErrorType::Validation,
                format!("No transaction with id '{id}', try reloading the history"),
            )
        })
    }

    async fn render_members(&self) {
        let store = self.store.lock().await;
        let visible = store::search_members(store.members(), &self.state.member_search);
        let totals = compute_totals(
            store
                .members()
                .iter()
                .filter_map(|m| self.state.dues.amounts.get(&m.nim))
                .map(Rupiah::signed),
        );
        self.view
            .render_members(&visible, &self.state.dues.amounts, totals);
    }

    async fn render_history(&self) {
        let store = self.store.lock().await;
        let visible = store::filter_history(
            store.history(),
            self.state.history_filter,
            &self.state.history_search,
        );
        self.view.render_history(&visible, store.summary());
    }
}

/// Records a failed read and turns it into a public error.
fn fail(load: &mut LoadState, e: anyhow::Error) -> Error {
    let message = format!("{e:#}");
    warn!("Load failed: {message}");
    *load = LoadState::Failed(message);
    Error::new(ErrorType::Remote, e)
}

/// A create could not be delivered. It may or may not have reached the spreadsheet.
fn unconfirmed(e: TransportError) -> Error {
    Error::new(
        ErrorType::Transport,
        anyhow::Error::new(e).context("Check the spreadsheet to confirm"),
    )
}

/// Checks date, label, amount and PJ, in that order, returning the ISO date.
fn validate_entry(
    date: Option<NaiveDate>,
    label: &str,
    label_name: impl Display,
    nominal: Rupiah,
    pj: &str,
) -> Result<String> {
    let Some(date) = date else {
        return Err(Error::msg(ErrorType::Validation, "Select a date"));
    };
    if label.trim().is_empty() {
        return Err(Error::msg(
            ErrorType::Validation,
            format!("Select a {label_name}"),
        ));
    }
    if !nominal.is_positive() {
        return Err(Error::msg(ErrorType::Validation, "Enter an amount"));
    }
    if pj.trim().is_empty() {
        return Err(Error::msg(ErrorType::Validation, "Enter a PJ"));
    }
    Ok(iso(date))
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
