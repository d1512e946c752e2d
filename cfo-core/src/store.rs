//! Whole-file JSON persistence for expenses, reminders and category corrections.
//!
//! Every save reads the full collection, appends, and rewrites the file. There is
//! no locking and no atomic rename: two writers racing on the same directory can
//! lose one write.
//!
//! Missing files load as empty collections. Empty or malformed files also load
//! as empty (malformed ones with a warning); the same policy applies to all
//! three files. A save that finds a malformed file first moves it to
//! `<name>.corrupt` so the rewrite never destroys the only copy.
//!
//! Amounts must be finite and non-negative: JSON has no encoding for NaN or
//! infinity, so such a record would come back as a malformed file.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Category, Expense, Reminder};

pub const EXPENSES_FILE: &str = "expenses.json";
pub const REMINDERS_FILE: &str = "reminders.json";
pub const CORRECTIONS_FILE: &str = "category_corrections.json";

/// Lower-cased receipt text -> category label
pub type Corrections = BTreeMap<String, String>;

/// Local data directory holding the three JSON files
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.dir.join(EXPENSES_FILE)
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.dir.join(REMINDERS_FILE)
    }

    pub fn corrections_path(&self) -> PathBuf {
        self.dir.join(CORRECTIONS_FILE)
    }

    pub fn save_expense(&self, expense: &Expense) -> Result<()> {
        check_amount(expense.amount).context("refusing to save expense")?;
        let mut all: Vec<Expense> = read_json_for_update(&self.expenses_path())?;
        all.push(expense.clone());
        write_json(&self.expenses_path(), &all)
    }

    pub fn load_expenses(&self) -> Result<Vec<Expense>> {
        read_json(&self.expenses_path())
    }

    pub fn save_reminder(&self, reminder: &Reminder) -> Result<()> {
        check_amount(reminder.amount)
            .with_context(|| format!("refusing to save reminder '{}'", reminder.name))?;
        let mut all: Vec<Reminder> = read_json_for_update(&self.reminders_path())?;
        all.push(reminder.clone());
        write_json(&self.reminders_path(), &all)
    }

    pub fn load_reminders(&self) -> Result<Vec<Reminder>> {
        read_json(&self.reminders_path())
    }

    /// Remember `category` for `text`. The key is the lower-cased text; saving
    /// the same key again overwrites the earlier category.
    pub fn save_correction(&self, text: &str, category: Category) -> Result<()> {
        let mut corrections: Corrections = read_json_for_update(&self.corrections_path())?;
        corrections.insert(text.to_lowercase(), category.label().to_string());
        write_json(&self.corrections_path(), &corrections)
    }

    pub fn load_corrections(&self) -> Result<Corrections> {
        read_json(&self.corrections_path())
    }
}

/// Amounts stored on disk must survive a JSON round trip
pub fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount must be a finite number >= 0, got {amount}");
    }
    Ok(())
}

/// Path a malformed store file is moved to before it is rewritten
pub fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    load_json(path, false)
}

fn read_json_for_update<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    load_json(path, true)
}

fn load_json<T: DeserializeOwned + Default>(path: &Path, set_aside_malformed: bool) -> Result<T> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "store file not found; starting empty");
            return Ok(T::default());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };

    if s.trim().is_empty() {
        return Ok(T::default());
    }

    match serde_json::from_str(&s) {
        Ok(v) => Ok(v),
        Err(e) if set_aside_malformed => {
            let aside = corrupt_path(path);
            fs::rename(path, &aside)
                .with_context(|| format!("move {} to {}", path.display(), aside.display()))?;
            warn!(
                path = %path.display(),
                moved_to = %aside.display(),
                error = %e,
                "malformed store file moved aside; starting empty"
            );
            Ok(T::default())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed store file; treating as empty");
            Ok(T::default())
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .with_context(|| format!("serialize {}", path.display()))?;

    fs::write(path, buf).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
