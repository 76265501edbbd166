//! These structs provide the CLI interface for the kas CLI.

use crate::model::{Rupiah, TypeFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// kas: the cash ledger of a student association, from the command line.
///
/// Records weekly member dues, other income and expenses in the association's spreadsheet and
/// shows the ledger history with running totals. The spreadsheet is reached through its
/// deployed web-app endpoint, which you configure once with `kas init`.
///
/// Data commands require a login with the configured PIN, see `kas login`.
#[derive(Debug, Parser, Clone)]
#[command(name = "kas")]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and write the configuration file.
    ///
    /// This is the first command you should run. You need the URL of the deployed spreadsheet
    /// web-app, the secret key the web-app checks on every write and a PIN of your choosing.
    Init(InitArgs),
    /// Start a session. Data commands are refused until you log in.
    Login(LoginArgs),
    /// End the session.
    Logout,
    /// Show, set or toggle the color theme preference.
    Theme(ThemeArgs),
    /// Check that the web-app endpoint answers. Works without a login.
    Ping,
    /// List the class labels.
    Classes,
    /// List members, optionally filtered by class and searched by name or nim.
    Members(MembersArgs),
    /// Show the latest ledger entries with the running totals.
    History(HistoryArgs),
    /// Record weekly dues payments.
    ///
    /// Members are loaded (optionally for one class and narrowed by --search), the default amount
    /// is applied to every listed member and --pay sets or overrides single members. One payment
    /// is recorded for every member whose amount is above zero.
    Dues(DuesArgs),
    /// Record an expense.
    Expense(ExpenseArgs),
    /// Record income that is not member dues.
    OtherIncome(OtherIncomeArgs),
    /// Change the amount of a dues entry.
    Edit(EditArgs),
    /// Delete a ledger entry.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and local state are held. Defaults to ~/kas-hima
    #[arg(long, env = "KAS_HOME", default_value_t = default_kas_home())]
    kas_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn kas_home(&self) -> &DisplayPath {
        &self.kas_home
    }
}

/// (Not shown): Args for the `kas init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the deployed web-app, e.g. https://script.google.com/macros/s/XXXX/exec
    #[arg(long)]
    endpoint: String,

    /// The secret key sent with every write.
    #[arg(long)]
    secret_key: String,

    /// The PIN that `kas login` will ask for.
    #[arg(long)]
    pin: String,

    /// How many history entries to fetch. Defaults to 50.
    #[arg(long)]
    history_limit: Option<u32>,
}

impl InitArgs {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn history_limit(&self) -> Option<u32> {
        self.history_limit
    }
}

/// (Not shown): Args for the `kas login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pin: String,
}

impl LoginArgs {
    pub fn pin(&self) -> &str {
        &self.pin
    }
}

/// What `kas theme` should do with the preference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    Light,
    Dark,
    /// Switch to the other theme.
    Toggle,
}

serde_plain::derive_display_from_serialize!(ThemeChoice);
serde_plain::derive_fromstr_from_deserialize!(ThemeChoice);

/// (Not shown): Args for the `kas theme` command.
#[derive(Debug, Parser, Clone)]
pub struct ThemeArgs {
    /// Leave out to print the current theme.
    choice: Option<ThemeChoice>,
}

impl ThemeArgs {
    pub fn choice(&self) -> Option<ThemeChoice> {
        self.choice
    }
}

/// (Not shown): Args for the `kas members` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct MembersArgs {
    /// Only members of this class. The label must match exactly.
    #[arg(long)]
    class: Option<String>,

    /// Only members whose name or nim contains this, ignoring case.
    #[arg(long)]
    search: Option<String>,
}

impl MembersArgs {
    pub fn new(class: Option<String>, search: Option<String>) -> Self {
        Self { class, search }
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// (Not shown): Args for the `kas history` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct HistoryArgs {
    /// One of all, in_member, in_other, out
    #[arg(long = "type", default_value_t = TypeFilter::All)]
    kind: TypeFilter,

    /// Only entries whose title, subtitle or date (e.g. "5 Jan 2025") contains this.
    #[arg(long)]
    search: Option<String>,
}

impl HistoryArgs {
    pub fn new(kind: TypeFilter, search: Option<String>) -> Self {
        Self { kind, search }
    }

    pub fn kind(&self) -> TypeFilter {
        self.kind
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// One `--pay NIM=AMOUNT` value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Payment {
    pub nim: String,
    pub amount: String,
}

impl FromStr for Payment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((nim, amount)) if !nim.trim().is_empty() => Ok(Self {
                nim: nim.trim().to_string(),
                amount: amount.trim().to_string(),
            }),
            _ => Err(format!("Expected NIM=AMOUNT, got '{s}'")),
        }
    }
}

/// (Not shown): Args for the `kas dues` command.
#[derive(Debug, Parser, Clone)]
pub struct DuesArgs {
    /// The week number the payments are for.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    week: u32,

    /// The payment date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Load only the members of this class.
    #[arg(long)]
    class: Option<String>,

    /// Narrow the loaded members by name or nim before applying --default-amount.
    #[arg(long)]
    search: Option<String>,

    /// An amount to apply to every listed member, e.g. 10000 or 10.000
    #[arg(long)]
    default_amount: Option<String>,

    /// The amount paid by one member, repeatable, e.g. --pay 2201001=10000
    #[arg(long)]
    pay: Vec<Payment>,
}

impl DuesArgs {
    pub fn new(week: u32) -> Self {
        Self {
            week,
            date: None,
            class: None,
            search: None,
            default_amount: None,
            pay: Vec::new(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_default_amount(mut self, amount: impl Into<String>) -> Self {
        self.default_amount = Some(amount.into());
        self
    }

    pub fn with_payment(mut self, nim: impl Into<String>, amount: impl Into<String>) -> Self {
        self.pay.push(Payment {
            nim: nim.into(),
            amount: amount.into(),
        });
        self
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn default_amount(&self) -> Option<&str> {
        self.default_amount.as_deref()
    }

    pub fn pay(&self) -> &[Payment] {
        &self.pay
    }
}

/// (Not shown): Args for the `kas expense` command.
#[derive(Debug, Parser, Clone)]
pub struct ExpenseArgs {
    /// What the money was spent on, e.g. Konsumsi
    #[arg(long)]
    category: String,

    /// e.g. 75000 or "Rp 75.000"
    #[arg(long)]
    amount: Rupiah,

    /// The person responsible.
    #[arg(long)]
    pj: String,

    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    note: String,
}

impl ExpenseArgs {
    pub fn new(category: impl Into<String>, amount: Rupiah, pj: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount,
            pj: pj.into(),
            date: None,
            note: String::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Rupiah {
        self.amount
    }

    pub fn pj(&self) -> &str {
        &self.pj
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// (Not shown): Args for the `kas other-income` command.
#[derive(Debug, Parser, Clone)]
pub struct OtherIncomeArgs {
    /// Where the money came from, e.g. Sponsor
    #[arg(long)]
    source: String,

    #[arg(long)]
    amount: Rupiah,

    /// The person responsible.
    #[arg(long)]
    pj: String,

    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    note: String,
}

impl OtherIncomeArgs {
    pub fn new(source: impl Into<String>, amount: Rupiah, pj: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            amount,
            pj: pj.into(),
            date: None,
            note: String::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn amount(&self) -> Rupiah {
        self.amount
    }

    pub fn pj(&self) -> &str {
        &self.pj
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }
}

/// (Not shown): Args for the `kas edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The id of a dues entry, as shown by `kas history`.
    id: String,

    /// The new amount.
    amount: String,
}

impl EditArgs {
    pub fn new(id: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// (Not shown): Args for the `kas delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the entry, as shown by `kas history`.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn default_kas_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("kas-hima"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --kas-home or KAS_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("kas-hima")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
