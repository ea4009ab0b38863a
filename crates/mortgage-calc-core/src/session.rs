//! Edit-driven calculator session.
//!
//! A `CalculatorSession` is what a form front end drives: each edit stores
//! the typed text, applies it to the [`LoanInputs`] (including the down
//! payment / percentage sync), and recomputes the breakdown. When the
//! calculation fails the previous breakdown is kept and the error message is
//! exposed until the next successful edit.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::format::{format_currency, format_fixed2};
use crate::inputs::{field_slot, LoanField, LoanInputs, FIELD_COUNT};
use crate::payment::{calculate_payment, PaymentBreakdown};
use crate::MortgageResult;

/// A single form edit: the field and the text typed into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub field: LoanField,
    /// Raw text; JSON numbers are accepted and kept in their JSON spelling.
    #[serde(deserialize_with = "text_or_number", default)]
    pub value: String,
}

impl FieldEdit {
    pub fn new(field: LoanField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// The three render targets, formatted as `$0.00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBreakdown {
    pub total_monthly_payment: String,
    pub monthly_principal_and_interest: String,
    pub monthly_tax_and_insurance: String,
}

impl From<&PaymentBreakdown> for FormattedBreakdown {
    fn from(b: &PaymentBreakdown) -> Self {
        Self {
            total_monthly_payment: format_currency(b.total_monthly_payment),
            monthly_principal_and_interest: format_currency(b.monthly_principal_and_interest),
            monthly_tax_and_insurance: format_currency(b.monthly_tax_and_insurance),
        }
    }
}

/// Serialisable view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub inputs: LoanInputs,
    pub display: BTreeMap<LoanField, String>,
    pub breakdown: PaymentBreakdown,
    pub formatted: FormattedBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CalculatorSession {
    inputs: LoanInputs,
    display: [String; FIELD_COUNT],
    breakdown: PaymentBreakdown,
    error: Option<String>,
}

impl CalculatorSession {
    /// Empty form: all inputs zero, breakdown zero, no error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply typed text to `field` and recompute.
    ///
    /// On error the displayed breakdown is left untouched and the message is
    /// recorded; the error is also returned to the caller.
    pub fn edit(&mut self, field: LoanField, text: &str) -> MortgageResult<PaymentBreakdown> {
        self.display[field_slot(field)] = text.to_string();
        self.inputs.apply_text(field, text);
        self.refresh_counterpart(field);
        self.recompute()
    }

    /// Apply an already-numeric value to `field` and recompute.
    pub fn edit_value(&mut self, field: LoanField, value: Decimal) -> MortgageResult<PaymentBreakdown> {
        self.display[field_slot(field)] = value.to_string();
        self.inputs.set(field, value);
        self.refresh_counterpart(field);
        self.recompute()
    }

    /// Replay a sequence of edits in order. Failed edits are recorded in the
    /// session state rather than stopping the replay.
    pub fn apply_edits<'a, I>(&mut self, edits: I)
    where
        I: IntoIterator<Item = &'a FieldEdit>,
    {
        for edit in edits {
            // outcome is kept in self.error
            let _ = self.edit(edit.field, &edit.value);
        }
    }

    pub fn inputs(&self) -> &LoanInputs {
        &self.inputs
    }

    pub fn breakdown(&self) -> &PaymentBreakdown {
        &self.breakdown
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Text shown in the field, as typed or as last re-derived.
    pub fn display_text(&self, field: LoanField) -> &str {
        &self.display[field_slot(field)]
    }

    pub fn formatted(&self) -> FormattedBreakdown {
        FormattedBreakdown::from(&self.breakdown)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            inputs: self.inputs.clone(),
            display: LoanField::ALL
                .into_iter()
                .map(|f| (f, self.display_text(f).to_string()))
                .collect(),
            breakdown: self.breakdown,
            formatted: self.formatted(),
            error: self.error.clone(),
        }
    }

    fn refresh_counterpart(&mut self, field: LoanField) {
        if let Some(other) = LoanInputs::synced_counterpart(field) {
            self.display[field_slot(other)] = format_fixed2(self.inputs.get(other));
        }
    }

    fn recompute(&mut self) -> MortgageResult<PaymentBreakdown> {
        match calculate_payment(&self.inputs) {
            Ok(breakdown) => {
                self.breakdown = breakdown;
                self.error = None;
                Ok(breakdown)
            }
            Err(e) => {
                debug!(error = %e, "keeping previous breakdown");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
