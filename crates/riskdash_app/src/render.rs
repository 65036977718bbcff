//! Plain-text rendering of the dashboard view model.

use std::fmt::Write;

use riskdash_core::{Company, DashboardViewModel, JobStatus};

const BAR_WIDTH: usize = 40;

pub fn companies(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "No companies yet.\n".to_string();
    }
    let mut out = String::new();
    for company in companies {
        let sector = company.sector.as_deref().unwrap_or("-");
        let _ = writeln!(out, "{:<8} {:<32} {}", company.symbol, company.name, sector);
    }
    out
}

pub fn documents(view: &DashboardViewModel) -> String {
    let company = view.selected_company.as_deref().unwrap_or("?");
    if view.documents.is_empty() {
        return format!("No documents uploaded for {company}.\n");
    }
    let mut out = String::new();
    for doc in &view.documents {
        let _ = writeln!(
            out,
            "FY{}  {:>5} pages  {:>8} words  uploaded {}",
            doc.fiscal_year,
            doc.page_count,
            doc.word_count,
            doc.upload_date.format("%Y-%m-%d")
        );
    }
    out
}

pub fn jobs(view: &DashboardViewModel) -> String {
    let mut out = String::new();
    for job in &view.jobs {
        let marker = match job.status {
            JobStatus::Pending | JobStatus::Processing => "..",
            JobStatus::Completed => "ok",
            JobStatus::Failed | JobStatus::Unreachable => "!!",
        };
        let _ = write!(
            out,
            "[{marker}] {} {} FY{} {:>3}% {}",
            job.job_id, job.company, job.fiscal_year, job.progress, job.status
        );
        if !job.message.is_empty() {
            let _ = write!(out, " - {}", job.message);
        }
        out.push('\n');
    }
    out
}

pub fn analytics(view: &DashboardViewModel) -> String {
    let company = view.selected_company.as_deref().unwrap_or("?");
    let Some(latest) = &view.latest else {
        return format!("No analysis results for {company}.\n");
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{company} FY{}: urgency {:.1}/100",
        latest.fiscal_year, latest.urgency_score
    );
    if let Some(delta) = latest.sentiment_delta {
        let _ = writeln!(out, "Sentiment vs prior year: {delta:+.1}%");
    }
    if !latest.summary.is_empty() {
        let _ = writeln!(out, "{}", latest.summary);
    }
    if !latest.key_phrases.is_empty() {
        let _ = writeln!(out, "Key phrases: {}", latest.key_phrases.join(", "));
    }
    if !latest.new_risks.is_empty() {
        let _ = writeln!(out, "New risks: {}", latest.new_risks.join(", "));
    }

    out.push_str("\nTrend\n");
    for point in &view.trend {
        let _ = writeln!(
            out,
            "{:<7} urgency {:>5.1} {:<width$} sentiment {:>5.1}",
            point.label,
            point.urgency,
            bar(point.urgency),
            point.sentiment_magnitude,
            width = BAR_WIDTH
        );
    }

    if !view.radar.is_empty() {
        out.push_str("\nCategories\n");
        let label_width = view.radar.iter().map(|p| p.label.len()).max().unwrap_or(0);
        for point in &view.radar {
            let _ = writeln!(
                out,
                "{:<label_width$} {:>5.1} {}",
                point.label,
                point.magnitude,
                bar(point.magnitude)
            );
        }
    }
    out
}

fn bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}
