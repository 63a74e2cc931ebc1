//! Raw state of the new bill form and its conversion to typed values

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::state::data::{BillCategory, SelectedFile, DEFAULT_PCT};

/// The receipt picker. Its value is cleared after every selection so that
/// picking the same file again is still reported as a new selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    files: Vec<SelectedFile>,
    value: String,
}

impl FileInput {
    /// Record a file chosen by the user
    pub fn choose(&mut self, file: SelectedFile) {
        self.value = file.name.clone();
        self.files = vec![file];
    }

    /// Move the first selected file out and clear the input
    pub fn take_first(&mut self) -> Option<SelectedFile> {
        let first = self.files.drain(..).next();
        self.clear();
        first
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.value.clear();
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One edited field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEdit {
    Category(BillCategory),
    Name(String),
    Amount(String),
    Date(String),
    Vat(String),
    Pct(String),
    Commentary(String),
}

/// Text typed into the new bill form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBillForm {
    pub category: BillCategory,
    pub name: String,
    pub amount: String,
    /// ISO date, YYYY-MM-DD
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
    pub receipt: FileInput,
}

/// Typed form values, ready to become a bill
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub category: BillCategory,
    pub name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub vat: Option<Decimal>,
    pub pct: u32,
    pub commentary: Option<String>,
}

impl NewBillForm {
    pub fn apply(&mut self, edit: FormEdit) {
        match edit {
            FormEdit::Category(category) => self.category = category,
            FormEdit::Name(name) => self.name = name,
            FormEdit::Amount(amount) => self.amount = amount,
            FormEdit::Date(date) => self.date = date,
            FormEdit::Vat(vat) => self.vat = vat,
            FormEdit::Pct(pct) => self.pct = pct,
            FormEdit::Commentary(commentary) => self.commentary = commentary,
        }
    }

    /// Read every field. Date and amount are required; pct falls back to 20.
    pub fn parse(&self) -> Result<FormValues, ValidationError> {
        let date = self.date.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingField("Date"));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let amount = parse_amount(&self.amount)?
            .ok_or(ValidationError::MissingField("Montant TTC"))?;

        let vat = parse_amount(&self.vat)?;

        let pct = self.pct.trim().parse().unwrap_or(DEFAULT_PCT);

        let commentary = Some(self.commentary.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(FormValues {
            category: self.category,
            name: self.name.trim().to_string(),
            amount,
            date,
            vat,
            pct,
            commentary,
        })
    }
}

/// Non-negative decimal; accepts a comma as decimal separator
fn parse_amount(raw: &str) -> Result<Option<Decimal>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.replace(',', ".").parse::<Decimal>() {
        Ok(amount) if !amount.is_sign_negative() => Ok(Some(amount)),
        _ => Err(ValidationError::InvalidAmount(raw.to_string())),
    }
}
