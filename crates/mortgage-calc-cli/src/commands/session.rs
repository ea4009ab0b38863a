use clap::Args;
use serde_json::Value;
use std::time::Instant;

use mortgage_calc_core::session::{CalculatorSession, FieldEdit};
use mortgage_calc_core::types::with_metadata;
use mortgage_calc_core::LoanField;

use crate::input;

/// Arguments for replaying form edits
#[derive(Args)]
pub struct SessionArgs {
    /// Path to a JSON array of {"field", "value"} edits
    #[arg(long)]
    pub input: Option<String>,

    /// A single edit as field=value; repeat in the order the fields were typed
    #[arg(long = "edit", value_parser = parse_edit)]
    pub edits: Vec<FieldEdit>,
}

fn parse_edit(spec: &str) -> Result<FieldEdit, String> {
    let (field, value) = spec
        .split_once('=')
        .ok_or_else(|| format!("Edit must be field=value, got '{spec}'"))?;
    let field: LoanField = field.parse().map_err(|e| format!("{e}"))?;
    Ok(FieldEdit::new(field, value))
}

pub fn run_session(args: SessionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let edits: Vec<FieldEdit> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if !args.edits.is_empty() {
        args.edits
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, --edit field=value, or stdin required".into());
    };

    let start = Instant::now();
    let mut session = CalculatorSession::new();
    session.apply_edits(&edits);

    let snapshot = session.snapshot();
    let warnings = snapshot.error.iter().cloned().collect();
    let elapsed = start.elapsed().as_micros() as u64;
    let result = with_metadata("Form edit replay", &edits, warnings, elapsed, snapshot);
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let edit = parse_edit("homePrice=300000").unwrap();
        assert_eq!(edit, FieldEdit::new(LoanField::HomePrice, "300000"));

        let edit = parse_edit("property_tax=").unwrap();
        assert_eq!(edit.value, "");
    }

    #[test]
    fn test_parse_edit_rejects_bad_specs() {
        assert!(parse_edit("home_price").is_err());
        assert!(parse_edit("hoa=100").is_err());
    }
}
