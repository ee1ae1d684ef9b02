//! Parsing of transaction JSON sent by the dashboard or read from a backup file.
//!
//! Backups may come from older versions of the dashboard, so the field names
//! and value types are looser than what the API sends back.

use serde::Deserialize;
use serde_json::Value;
use time::{Date, macros::format_description};

use crate::{
    Error,
    transaction::{Kind, NewTransaction},
};

/// The JSON body for a single transaction.
///
/// Every field is optional so that a missing field is reported as
/// [Error::MissingField] rather than a generic deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionPayload {
    /// `income` or `expense`.
    #[serde(default, alias = "jenis")]
    pub kind: Option<Value>,
    /// What the transaction was for.
    #[serde(default, alias = "deskripsi")]
    pub description: Option<Value>,
    /// A whole number, or a string holding one.
    #[serde(default, alias = "jumlah")]
    pub amount: Option<Value>,
    /// A date formatted as `YYYY-MM-DD`.
    #[serde(default, alias = "tanggal")]
    pub date: Option<Value>,
}

impl TransactionPayload {
    /// Check that every field is present and convert the payload into a
    /// [NewTransaction].
    ///
    /// A field counts as missing when it is absent, `null`, `false`, an empty
    /// string or the number zero.
    ///
    /// # Errors
    /// Returns [Error::MissingField] for the first missing field, otherwise the
    /// error from parsing the offending field.
    pub fn into_new_transaction(self) -> Result<NewTransaction, Error> {
        self.convert(require)
    }

    /// Convert a record read from a backup file into a [NewTransaction].
    ///
    /// Only absent and `null` fields count as missing. Backups store whatever
    /// the service exported, including zero amounts, so the other values are
    /// left to the field parsers.
    ///
    /// # Errors
    /// Returns [Error::MissingField] for the first missing field, otherwise the
    /// error from parsing the offending field.
    pub fn into_restored_transaction(self) -> Result<NewTransaction, Error> {
        self.convert(require_present)
    }

    fn convert(
        self,
        check: fn(Option<Value>, &'static str) -> Result<Value, Error>,
    ) -> Result<NewTransaction, Error> {
        let kind = check(self.kind, "kind")?;
        let description = check(self.description, "description")?;
        let amount = check(self.amount, "amount")?;
        let date = check(self.date, "date")?;

        Ok(NewTransaction {
            kind: parse_kind(&kind)?,
            description: parse_description(description)?,
            amount: parse_amount(&amount)?,
            date: parse_date(&date)?,
        })
    }
}

fn require(value: Option<Value>, field: &'static str) -> Result<Value, Error> {
    match value {
        Some(value) if !is_falsy(&value) => Ok(value),
        _ => Err(Error::MissingField(field)),
    }
}

fn require_present(value: Option<Value>, field: &'static str) -> Result<Value, Error> {
    match value {
        Some(Value::Null) | None => Err(Error::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a JSON value for an error message without quoting strings twice.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_kind(value: &Value) -> Result<Kind, Error> {
    match value {
        Value::String(text) => text.parse(),
        other => Err(Error::InvalidKind(value_text(other))),
    }
}

fn parse_description(value: Value) -> Result<String, Error> {
    match value {
        Value::String(text) => Ok(text),
        // Numbers and booleans are kept as their JSON text.
        Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => Err(Error::InvalidJson("description must be text".to_owned())),
    }
}

/// Read an amount in whole Rupiah.
///
/// JSON integers are used as is, JSON floats are accepted only when they have
/// no fractional part, and strings are trimmed and parsed as an integer.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the value is not a whole number.
pub fn parse_amount(value: &Value) -> Result<i64, Error> {
    let invalid = || Error::InvalidAmount(value_text(value));

    match value {
        Value::Number(number) => {
            if let Some(amount) = number.as_i64() {
                return Ok(amount);
            }

            // `i64::MAX as f64` rounds up to 2^63, so the upper bound is strict.
            match number.as_f64() {
                Some(amount)
                    if amount.fract() == 0.0
                        && amount >= -9_223_372_036_854_775_808.0
                        && amount < 9_223_372_036_854_775_808.0 =>
                {
                    Ok(amount as i64)
                }
                _ => Err(invalid()),
            }
        }
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Read a calendar date formatted as `YYYY-MM-DD`.
///
/// Older backups store dates as full timestamps such as
/// `2024-01-01T00:00:00.000Z`. Only the date part of these is kept.
///
/// # Errors
/// Returns [Error::InvalidDate] if the value is not a valid date.
pub fn parse_date(value: &Value) -> Result<Date, Error> {
    let text = match value {
        Value::String(text) => text.trim(),
        other => return Err(Error::InvalidDate(value_text(other))),
    };

    let date_part = text.split_once('T').map_or(text, |(date, _)| date);

    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        transaction::{Kind, NewTransaction},
    };

    use super::{TransactionPayload, parse_amount, parse_date};

    fn payload(value: serde_json::Value) -> TransactionPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_complete_payload() {
        let got = payload(json!({
            "kind": "income",
            "description": "Salary",
            "amount": 5000000,
            "date": "2024-01-25"
        }))
        .into_new_transaction()
        .unwrap();

        assert_eq!(
            got,
            NewTransaction::new(Kind::Income, "Salary", 5_000_000, date!(2024 - 01 - 25))
        );
    }

    #[test]
    fn parses_legacy_field_names() {
        let got = payload(json!({
            "jenis": "pengeluaran",
            "deskripsi": "Makan siang",
            "jumlah": "25000",
            "tanggal": "2024-02-01T00:00:00.000Z"
        }))
        .into_new_transaction()
        .unwrap();

        assert_eq!(
            got,
            NewTransaction::new(Kind::Expense, "Makan siang", 25_000, date!(2024 - 02 - 01))
        );
    }

    #[test]
    fn rejects_missing_or_falsy_fields() {
        let cases = [
            (json!({"description": "a", "amount": 1, "date": "2024-01-01"}), "kind"),
            (
                json!({"kind": "income", "description": "", "amount": 1, "date": "2024-01-01"}),
                "description",
            ),
            (
                json!({"kind": "income", "description": "a", "amount": 0, "date": "2024-01-01"}),
                "amount",
            ),
            (
                json!({"kind": "income", "description": "a", "amount": 1, "date": null}),
                "date",
            ),
        ];

        for (body, want_field) in cases {
            let got = payload(body).into_new_transaction();

            match got {
                Err(Error::MissingField(field)) => assert_eq!(field, want_field),
                other => panic!("got {other:?}, want missing field {want_field}"),
            }
        }
    }

    #[test]
    fn amount_coercion() {
        assert_eq!(parse_amount(&json!(1000)).unwrap(), 1000);
        assert_eq!(parse_amount(&json!("1000")).unwrap(), 1000);
        assert_eq!(parse_amount(&json!(" -42 ")).unwrap(), -42);
        assert_eq!(parse_amount(&json!(250.0)).unwrap(), 250);
        assert!(matches!(
            parse_amount(&json!("abc")),
            Err(Error::InvalidAmount(text)) if text == "abc"
        ));
        assert!(matches!(
            parse_amount(&json!(12.5)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount(&json!([1])),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(
            parse_amount(&json!(i64::MIN)).unwrap(),
            i64::MIN
        );
        assert!(matches!(
            parse_amount(&json!(9_223_372_036_854_775_808u64)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount(&json!(1e19)),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn restored_record_keeps_zero_amount() {
        let got = payload(json!({
            "kind": "expense",
            "description": "Free sample",
            "amount": 0,
            "date": "2024-01-01"
        }))
        .into_restored_transaction()
        .unwrap();

        assert_eq!(
            got,
            NewTransaction::new(Kind::Expense, "Free sample", 0, date!(2024 - 01 - 01))
        );
    }

    #[test]
    fn restored_record_rejects_absent_or_null_fields() {
        let cases = [
            (json!({"description": "a", "amount": 1, "date": "2024-01-01"}), "kind"),
            (
                json!({"kind": "income", "description": "a", "amount": null, "date": "2024-01-01"}),
                "amount",
            ),
        ];

        for (body, want_field) in cases {
            let got = payload(body).into_restored_transaction();

            match got {
                Err(Error::MissingField(field)) => assert_eq!(field, want_field),
                other => panic!("got {other:?}, want missing field {want_field}"),
            }
        }
    }

    #[test]
    fn date_parsing() {
        assert_eq!(parse_date(&json!("2024-01-01")).unwrap(), date!(2024 - 01 - 01));
        assert_eq!(
            parse_date(&json!("2023-12-31T17:00:00.000Z")).unwrap(),
            date!(2023 - 12 - 31)
        );
        assert!(matches!(
            parse_date(&json!("2024-13-01")),
            Err(Error::InvalidDate(_))
        ));
        assert!(matches!(
            parse_date(&json!(20240101)),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        let got = payload(json!({
            "kind": "transfer",
            "description": "a",
            "amount": 1,
            "date": "2024-01-01"
        }))
        .into_new_transaction();

        assert!(matches!(got, Err(Error::InvalidKind(kind)) if kind == "transfer"));
    }
}
