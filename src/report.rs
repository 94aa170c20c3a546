use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::models::{AggregateTotals, ReportMessage};

pub const SUBJECT: &str = "New Word Forms Report";

const SIGNATURE: &str = "Sent by the New Word Forms Report Generator";
const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn compose(
    totals: &AggregateTotals,
    current_prompts: &[&str],
    generated_at: NaiveDateTime,
) -> ReportMessage {
    let body = compose_body(totals, current_prompts, generated_at);

    ReportMessage {
        subject: SUBJECT.to_string(),
        html_body: render_html(&body),
    }
}

pub fn compose_body(
    totals: &AggregateTotals,
    current_prompts: &[&str],
    generated_at: NaiveDateTime,
) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "Report of new word forms found. Report generated at {}.",
        generated_at.format(GENERATED_AT_FORMAT)
    );
    body.push_str("\n\n\n");

    let _ = writeln!(body, "Total: {}", totals.total);
    let _ = writeln!(body, "Total last 7 days: {}", totals.total_7d);
    let _ = writeln!(body, "Total last 24 hours: {}", totals.total_24h);
    body.push_str("\n\n\n");

    body.push_str(&current_prompts.join("\n"));
    body.push_str("\n\n\n");
    body.push_str(SIGNATURE);

    body
}

// Every line becomes a paragraph; paragraphs with no text collapse to <br>
// so blank lines still render as vertical space in mail clients.
pub fn render_html(body: &str) -> String {
    let html = format!("<p>{}</p>", body.replace('\n', "</p><p>"));
    html.replace("<p></p>", "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, crate::aggregate::LEDGER_DATE_FORMAT).unwrap()
    }

    #[test]
    fn empty_paragraphs_become_line_breaks() {
        assert_eq!(render_html("A\n\nB"), "<p>A</p><br><p>B</p>");
    }

    #[test]
    fn single_line_is_a_single_paragraph() {
        assert_eq!(render_html("hello"), "<p>hello</p>");
    }

    #[test]
    fn body_sections_appear_in_order() {
        let totals = AggregateTotals {
            total: 100,
            total_7d: 0,
            total_24h: 0,
        };
        let prompts = vec!["# Week 2", "write about rivers"];

        let body = compose_body(&totals, &prompts, ts("2023-01-08T00:00:01"));

        assert_eq!(
            body,
            "Report of new word forms found. Report generated at 2023-01-08 00:00:01.\
             \n\n\n\
             Total: 100\n\
             Total last 7 days: 0\n\
             Total last 24 hours: 0\n\
             \n\n\n\
             # Week 2\nwrite about rivers\
             \n\n\n\
             Sent by the New Word Forms Report Generator"
        );
    }

    #[test]
    fn message_carries_the_fixed_subject_and_html_body() {
        let totals = AggregateTotals::default();
        let message = compose(&totals, &[], ts("2024-03-01T09:15:00"));

        assert_eq!(message.subject, "New Word Forms Report");
        assert!(message.html_body.starts_with("<p>Report of new word forms"));
        assert!(message.html_body.contains("<br>"));
        assert!(!message.html_body.contains("<p></p>"));
        assert!(!message.html_body.contains('\n'));
    }
}
