use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WordCountLedger {
    pub files: Vec<WordCountRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordCountRecord {
    pub filename: String,
    pub date: String,
    pub new_words: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    pub total: u64,
    pub total_7d: u64,
    pub total_24h: u64,
}

#[derive(Debug, Clone)]
pub struct ReportMessage {
    pub subject: String,
    pub html_body: String,
}
