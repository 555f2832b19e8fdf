// Colored terminal output for crawl outcomes and snapshot results.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use crate::pipeline::snapshot::{SiteReport, SiteStatus, Snapshot};
use crate::site::SiteRole;

/// Terms shown per bar chart.
pub const DISPLAY_LIMIT: usize = 15;

/// Display how each input site fared.
pub fn display_site_reports(reports: &[SiteReport]) {
    if reports.is_empty() {
        return;
    }

    println!(
        "\n{}",
        format!("=== Sites ({}) ===", reports.len()).bold()
    );
    println!();

    for report in reports {
        let role = match report.role {
            SiteRole::Business => "business".cyan(),
            SiteRole::Competitor => "competitor".normal(),
        };
        let status = match &report.status {
            SiteStatus::Cached => "cached".green().to_string(),
            SiteStatus::Crawled {
                pages,
                failed_pages: 0,
            } => format!("crawled {pages} pages").green().to_string(),
            SiteStatus::Crawled {
                pages,
                failed_pages,
            } => format!("crawled {pages} pages, {failed_pages} skipped")
                .yellow()
                .to_string(),
            SiteStatus::Failed(err) => {
                let reason = super::truncate_chars(&err.to_string(), 80);
                format!("excluded: {reason}").red().to_string()
            }
        };
        println!("  {:<10}  {:<40} {}", role, report.input, status);
    }

    let failed = reports.iter().filter(|r| !r.is_usable()).count();
    if failed > 0 {
        println!();
        println!("  {} {} site(s) excluded from this run", "!".bright_red(), failed);
    }
}

/// Display both vocabularies and both difference sets, then where they went.
pub fn display_snapshot(snapshot: &Snapshot) {
    display_site_reports(&snapshot.sites);

    snapshot
        .business
        .display("Business vocabulary", DISPLAY_LIMIT);
    snapshot
        .competitors
        .display("Competitor vocabulary", DISPLAY_LIMIT);
    snapshot
        .business_over_competitors
        .display("Only you emphasize", DISPLAY_LIMIT);
    snapshot
        .competitors_over_business
        .display("Only competitors emphasize", DISPLAY_LIMIT);

    let files = &snapshot.files;
    println!("\n{}", "Saved:".bold());
    for path in [
        &files.business_vocabulary,
        &files.competitor_vocabulary,
        &files.business_difference,
        &files.competitor_difference,
    ] {
        println!("  {}", path.display().to_string().dimmed());
    }
}
