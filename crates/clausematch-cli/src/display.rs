//! Text rendering for matching reports.
//!
//! One card per clause, grouped under a header, with a green/red marker and
//! the fields a negotiator needs to act on it.

use clausematch_core::{
    ClauseOutcome, MatchStatus, MatchingReport, PartyClauseView, PartyReport, ReportSummary,
    ResolutionMethod, VariantId,
};

const MAX_TEXT_WIDTH: usize = 72;

// ── Public API ──

/// Print the full report, including both parties' ranks of each selection.
pub fn print_report(report: &MatchingReport) {
    println!("=== {} ===", report.template);
    println!();

    for outcome in &report.clauses {
        print_outcome(outcome);
    }
    print_summary(&report.summary, report.is_finalizable());
}

/// Print one party's view of the report.
pub fn print_party_report(report: &PartyReport) {
    println!("=== {} ({}) ===", report.template, report.party);
    println!();

    for clause in &report.clauses {
        print_party_clause(clause);
    }
    print_summary(&report.summary, report.finalizable);
}

// ── Clause cards ──

fn print_outcome(outcome: &ClauseOutcome) {
    let resolved = &outcome.resolved;
    print_header(
        &outcome.title,
        outcome.clause_type.as_str(),
        resolved.match_status,
    );
    print_field("method", resolved.method.as_str());
    print_field("confidence", &resolved.confidence.to_string());
    if let Some(variant) = &resolved.selected_variant {
        print_field("selected", variant.as_str());
    }
    if let Some(text) = &outcome.selected_text
        && !text.is_empty()
    {
        print_field("text", &truncate(text));
    }
    if let Some(rank) = outcome.mutual_rank.party_a {
        print_field("party A rank", &rank.to_string());
    }
    if let Some(rank) = outcome.mutual_rank.party_b {
        print_field("party B rank", &rank.to_string());
    }
    print_alternatives(&resolved.alternatives);
    print_field("reasoning", &resolved.reasoning);
    println!();
}

fn print_party_clause(clause: &PartyClauseView) {
    print_header(&clause.title, clause.clause_type.as_str(), clause.match_status);
    print_field("method", clause.method.as_str());
    print_field("confidence", &clause.confidence.to_string());
    if let Some(variant) = &clause.selected_variant {
        print_field("selected", variant.as_str());
    }
    if let Some(text) = &clause.selected_text
        && !text.is_empty()
    {
        print_field("text", &truncate(text));
    }
    if let Some(rank) = clause.own_rank {
        print_field("your rank", &rank.to_string());
    }
    if let Some(rank) = clause.counterpart_rank {
        print_field("their rank", &rank.to_string());
    }
    print_alternatives(&clause.alternatives);
    print_field("reasoning", &clause.reasoning);
    println!();
}

// ── Summary ──

fn print_summary(summary: &ReportSummary, finalizable: bool) {
    println!("Summary");
    print_field("clauses", &summary.total.to_string());
    print_field("green", &summary.green.to_string());
    print_field("red", &summary.red.to_string());
    for method in ResolutionMethod::ALL {
        let count = summary.count(method);
        if count > 0 {
            print_field(method.as_str(), &count.to_string());
        }
    }
    print_field(
        "finalizable",
        if finalizable { "yes" } else { "no, negotiate red clauses" },
    );
}

// ── Helpers ──

fn print_header(title: &str, clause_type: &str, status: MatchStatus) {
    let marker = match status {
        MatchStatus::Green => "[GREEN]",
        MatchStatus::Red => "[RED]  ",
    };
    if title.is_empty() {
        println!("{marker} {clause_type}");
    } else {
        println!("{marker} {title} ({clause_type})");
    }
}

fn print_field(name: &str, value: &str) {
    println!("  {:<22} {}", name, value);
}

fn print_alternatives(alternatives: &[VariantId]) {
    if alternatives.is_empty() {
        return;
    }
    let ids: Vec<&str> = alternatives.iter().map(|v| v.as_str()).collect();
    print_field("alternatives", &ids.join(", "));
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_WIDTH {
        let short: String = text.chars().take(MAX_TEXT_WIDTH - 3).collect();
        format!("{short}...")
    } else {
        text.to_string()
    }
}
