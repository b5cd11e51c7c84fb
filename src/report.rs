use crate::models::{AnalysisReport, SentimentLabel};

const TOP_THEMES: usize = 5;

pub fn format_text(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("\n=== Review Analysis ===\n\n");
    output.push_str(&format!("Reviews analyzed: {}\n", report.reviews.len()));
    output.push_str(&format!("Banks: {}\n", report.organizations().len()));
    output.push_str(&format!(
        "Sentiment: {} positive / {} negative / {} neutral\n",
        count_label(report, SentimentLabel::Positive),
        count_label(report, SentimentLabel::Negative),
        count_label(report, SentimentLabel::Neutral),
    ));

    for organization in report.organizations() {
        output.push_str(&format!(
            "\n[{}] {} reviews\n",
            organization,
            report.reviews_for(&organization)
        ));

        output.push_str("  Mean sentiment by rating:\n");
        for row in report
            .sentiment_summary
            .iter()
            .filter(|r| r.organization == organization)
        {
            output.push_str(&format!("    {} star: {:+.2}\n", row.rating, row.mean_sentiment));
        }

        output.push_str("  Top themes:\n");
        for row in report
            .theme_summary
            .iter()
            .filter(|r| r.organization == organization)
            .take(TOP_THEMES)
        {
            output.push_str(&format!("    - {}: {}\n", row.theme, row.count));
        }
    }

    output
}

pub fn format_markdown(report: &AnalysisReport) -> String {
    let mut output = String::new();

    output.push_str("# Review Analysis\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Reviews Analyzed | {} |\n", report.reviews.len()));
    output.push_str(&format!("| Banks | {} |\n", report.organizations().len()));
    output.push_str(&format!(
        "| Positive | {} |\n| Negative | {} |\n| Neutral | {} |\n",
        count_label(report, SentimentLabel::Positive),
        count_label(report, SentimentLabel::Negative),
        count_label(report, SentimentLabel::Neutral),
    ));

    output.push_str("\n## Sentiment by Rating\n\n");
    output.push_str("| Bank | Rating | Mean Sentiment |\n");
    output.push_str("|------|--------|----------------|\n");
    for row in &report.sentiment_summary {
        output.push_str(&format!(
            "| {} | {} | {:+.2} |\n",
            row.organization, row.rating, row.mean_sentiment
        ));
    }

    output.push_str("\n## Themes\n\n");
    output.push_str("| Bank | Theme | Count |\n");
    output.push_str("|------|-------|-------|\n");
    for row in &report.theme_summary {
        output.push_str(&format!("| {} | {} | {} |\n", row.organization, row.theme, row.count));
    }

    output
}

fn count_label(report: &AnalysisReport, label: SentimentLabel) -> usize {
    report
        .reviews
        .iter()
        .filter(|r| r.sentiment_label == label)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnnotatedReview, Review, SentimentAggregate, SentimentPrediction, ThemeAggregate, ThemeSet,
    };
    use chrono::NaiveDate;

    fn sample_report() -> AnalysisReport {
        let review = AnnotatedReview::new(
            Review {
                text: "Login keeps failing".to_string(),
                rating: 2,
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                organization: "BankA".to_string(),
                source: "Google Play".to_string(),
            },
            SentimentPrediction {
                label: SentimentLabel::Negative,
                score: 0.9,
            },
            ThemeSet::from_matches(vec!["Account Access Issues".to_string()]),
        );

        AnalysisReport {
            reviews: vec![review],
            sentiment_summary: vec![SentimentAggregate {
                organization: "BankA".into(),
                rating: 2,
                mean_sentiment: -1.0,
            }],
            theme_summary: vec![ThemeAggregate {
                organization: "BankA".into(),
                theme: "Account Access Issues".into(),
                count: 1,
            }],
        }
    }

    #[test]
    fn test_text_report() {
        let text = format_text(&sample_report());
        assert!(text.contains("Reviews analyzed: 1"));
        assert!(text.contains("[BankA] 1 reviews"));
        assert!(text.contains("2 star: -1.00"));
        assert!(text.contains("- Account Access Issues: 1"));
    }

    #[test]
    fn test_markdown_report() {
        let markdown = format_markdown(&sample_report());
        assert!(markdown.contains("| BankA | 2 | -1.00 |"));
        assert!(markdown.contains("| BankA | Account Access Issues | 1 |"));
        assert!(markdown.contains("| Negative | 1 |"));
    }

    #[test]
    fn test_empty_report() {
        let text = format_text(&AnalysisReport::default());
        assert!(text.contains("Reviews analyzed: 0"));
        assert!(text.contains("Banks: 0"));
    }
}
