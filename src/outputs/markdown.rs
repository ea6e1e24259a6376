//! Markdown report output.
//!
//! Renders one table row per article with the columns Title, Date, Image,
//! Search Phrase Count, Description and Contains Money.

use crate::models::SearchReport;
use crate::utils::upcase;
use std::fmt::Write;

fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

pub fn report_to_markdown(report: &SearchReport) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# {} results for \"{}\"\n", upcase(&report.site), report.search_phrase);
    if !report.section.is_empty() {
        let _ = writeln!(md, "- Section: {}", report.section);
    }
    let _ = writeln!(md, "- Months: {}", report.months);
    let _ = writeln!(md, "- Reference date: {}", report.reference_date);
    let _ = writeln!(md, "- Generated at: {}\n", report.generated_at);

    if report.articles.is_empty() {
        md.push_str("_No articles found._\n");
        return md;
    }

    md.push_str("| Title | Date | Image | Search Phrase Count | Description | Contains Money |\n");
    md.push_str("|-------|------|-------|---------------------|-------------|----------------|\n");
    for article in &report.articles {
        let image = article
            .image_path()
            .map(|p| cell(&p.display().to_string()))
            .unwrap_or_default();
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} | {} |",
            cell(article.title()),
            article.publish_date(),
            image,
            article.search_phrase_count(),
            cell(article.description().unwrap_or_default()),
            if article.contains_money_amount() { "yes" } else { "no" },
        );
    }
    md
}
