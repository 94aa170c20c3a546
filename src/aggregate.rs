use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::models::{AggregateTotals, WordCountRecord};

pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed date {date:?} in ledger record for {filename:?}")]
    MalformedDate {
        filename: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub fn aggregate(
    records: &[WordCountRecord],
    now: NaiveDateTime,
) -> Result<AggregateTotals, LedgerError> {
    let seven_days_ago = now - Duration::days(7);
    let one_day_ago = now - Duration::days(1);
    let mut totals = AggregateTotals::default();

    for record in records {
        let date = NaiveDateTime::parse_from_str(&record.date, LEDGER_DATE_FORMAT).map_err(
            |source| LedgerError::MalformedDate {
                filename: record.filename.clone(),
                date: record.date.clone(),
                source,
            },
        )?;

        totals.total += record.new_words;
        if date > seven_days_ago {
            totals.total_7d += record.new_words;
        }
        if date > one_day_ago {
            totals.total_24h += record.new_words;
        }
    }

    Ok(totals)
}
