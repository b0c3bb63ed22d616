use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::analysis::{
    Comparison, CorrelationInsight, CorrelationStrength, RegionComparison, RegionTrend,
    SummaryTable, TrendDirection,
};
use crate::continent::ResolutionReport;
use crate::dataset::Indicator;
use crate::scoring::ScoreBreakdown;

/// Below this width the summary table switches to short column headers
const NARROW_TERMINAL: usize = 90;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format an indicator value in compact notation (1.5k, 2.3M, 72.4)
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    let formatted = if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{:.1}", value)
    };

    // "1.0k" -> "1k"
    formatted.replace(".0M", "M").replace(".0k", "k")
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_else(|| "-".to_string())
}

fn short_label(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::GdpPerCapita => "GDP",
        Indicator::LifeExpectancy => "Life",
        Indicator::HealthExpPerCapita => "Health",
        Indicator::ChildMortality => "Mort.",
    }
}

/// Multi-line breakdown of one progress score.
///
/// Imputed values are marked with `*` and explained in a footnote.
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let score = format!("{:.1}", breakdown.score);
    let title = format!("{} ({})", breakdown.country, breakdown.year);
    if use_colors {
        lines.push(format!("{}  score {}", title.bold(), score.bold().green()));
    } else {
        lines.push(format!("{}  score {}", title, score));
    }

    if breakdown.used_fallback_year() {
        lines.push(format!(
            "  no data for {}, using latest year {}",
            breakdown.requested_year, breakdown.year
        ));
    }

    lines.push(format!(
        "  {:<30} {:>9} {:>7} {:>6} {:>7}",
        "Indicator", "Value", "Scaled", "Weight", "Points"
    ));

    for (indicator, component) in &breakdown.components {
        let marker = if component.imputed { "*" } else { "" };
        let value = format!("{}{}", format_value(component.raw), marker);
        let line = format!(
            "  {:<30} {:>9} {:>7.1} {:>6.2} {:>7.1}",
            indicator.label(),
            value,
            component.scaled,
            component.weight,
            component.contribution
        );
        if use_colors && component.imputed {
            lines.push(line.dimmed().to_string());
        } else {
            lines.push(line);
        }
    }

    if breakdown.imputed_count() > 0 {
        lines.push("  * missing, filled with the column median".to_string());
    }

    lines.join("\n")
}

/// Side-by-side result of scoring two countries
pub fn format_comparison(comparison: &Comparison, use_colors: bool) -> String {
    let mut out = format_breakdown(&comparison.first, use_colors);
    out.push_str("\n\n");
    out.push_str(&format_breakdown(&comparison.second, use_colors));
    out.push_str("\n\n");

    let verdict = match &comparison.leader {
        Some(leader) => format!("{} leads by {:.1} points", leader, comparison.difference),
        None => "Both countries score the same".to_string(),
    };
    if use_colors {
        out.push_str(&verdict.bold().to_string());
    } else {
        out.push_str(&verdict);
    }
    out
}

/// Per-continent means as an aligned table.
///
/// Vestigial continents are starred and explained in a footnote; rows without
/// countries are dimmed.
pub fn format_summary_table(table: &SummaryTable, use_colors: bool) -> String {
    let narrow = get_terminal_width().is_some_and(|w| w < NARROW_TERMINAL);
    let header_for = |indicator: Indicator| {
        if narrow {
            short_label(indicator).to_string()
        } else {
            indicator.label().to_string()
        }
    };

    let widths: Vec<usize> = Indicator::ALL
        .iter()
        .map(|&i| header_for(i).len().max(8))
        .collect();

    let mut header = format!("{:<14} {:>9}", "Continent", "Countries");
    for (indicator, width) in Indicator::ALL.iter().zip(&widths) {
        header.push_str(&format!("  {:>width$}", header_for(*indicator), width = *width));
    }

    let mut lines = vec![format!("Continent averages for {}", table.year), String::new()];
    if use_colors {
        lines.push(header.bold().to_string());
    } else {
        lines.push(header);
    }

    for row in &table.rows {
        let name = if row.vestigial {
            format!("{}*", row.region.as_str())
        } else {
            row.region.as_str().to_string()
        };
        let mut line = format!("{:<14} {:>9}", name, row.countries);
        for (indicator, width) in Indicator::ALL.iter().zip(&widths) {
            line.push_str(&format!(
                "  {:>width$}",
                format_optional(row.mean(*indicator)),
                width = *width
            ));
        }
        if use_colors && (row.vestigial || row.countries == 0) {
            lines.push(line.dimmed().to_string());
        } else {
            lines.push(line);
        }
    }

    if table.rows.iter().any(|r| r.vestigial) {
        lines.push(String::new());
        lines.push("* no country maps here, listed for completeness".to_string());
    }

    lines.join("\n")
}

/// Correlation coefficient plus its narrative
pub fn format_correlation(insight: &CorrelationInsight, use_colors: bool) -> String {
    let r = format!("{:+.2}", insight.r);
    let r = if !use_colors {
        r
    } else {
        match insight.strength {
            CorrelationStrength::Strong => r.bold().to_string(),
            CorrelationStrength::Moderate => r.yellow().to_string(),
            CorrelationStrength::Weak => r.dimmed().to_string(),
        }
    };

    format!(
        "Pearson r = {} ({} countries)\n{}",
        r,
        insight.pairs,
        insight.narrative()
    )
}

/// Latest values for two continents plus the verdict
pub fn format_region_comparison(comparison: &RegionComparison, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "{}: {} vs {}",
        comparison.indicator.label(),
        comparison.first,
        comparison.second
    )];
    for (region, point) in [
        (comparison.first, comparison.first_value),
        (comparison.second, comparison.second_value),
    ] {
        lines.push(format!(
            "  {:<14} {:>9}  ({})",
            region.as_str(),
            format_value(point.value),
            point.year
        ));
    }

    let verdict = comparison.narrative();
    if use_colors {
        lines.push(verdict.bold().to_string());
    } else {
        lines.push(verdict);
    }
    lines.join("\n")
}

/// Year-by-year continent means with the overall direction
pub fn format_trend(trend: &RegionTrend, use_colors: bool) -> String {
    let mut lines = vec![
        format!("{} trend in {}", trend.indicator.label(), trend.region),
        String::new(),
    ];
    for point in &trend.points {
        lines.push(format!("  {}  {:>9}", point.year, format_value(point.value)));
    }
    lines.push(String::new());

    let summary = trend.narrative();
    if !use_colors {
        lines.push(summary);
    } else {
        // green when the move is an improvement
        let improved = match trend.direction {
            TrendDirection::Rising => trend.indicator.higher_is_better(),
            TrendDirection::Falling => !trend.indicator.higher_is_better(),
            TrendDirection::Flat => false,
        };
        if improved {
            lines.push(summary.green().to_string());
        } else if trend.direction == TrendDirection::Flat {
            lines.push(summary.dimmed().to_string());
        } else {
            lines.push(summary.red().to_string());
        }
    }
    lines.join("\n")
}

/// What the clean step kept and dropped
pub fn format_clean_report(report: &ResolutionReport, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "Kept {} of {} rows ({} countries tagged)",
        report.rows_kept, report.rows_in, report.countries_resolved
    )];

    if report.unresolved.is_empty() {
        return lines.join("\n");
    }

    let names: Vec<&str> = report.unresolved.iter().map(|u| u.country()).collect();
    let mut summary = format!(
        "Dropped {} rows for {} unresolved names",
        report.rows_dropped(),
        names.len()
    );
    if report.lookup_failures() > 0 {
        summary.push_str(&format!(" ({} lookup failures)", report.lookup_failures()));
    }
    if use_colors {
        lines.push(summary.yellow().to_string());
    } else {
        lines.push(summary);
    }

    let joined = names.join(", ");
    let joined = match get_terminal_width() {
        Some(width) if width > 20 => truncate(&joined, width - 2),
        _ => joined,
    };
    lines.push(format!("  {}", joined));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ContinentSummary, Direction, YearValue};
    use crate::continent::ContinentLabel;
    use crate::error::Unresolved;
    use crate::scoring::Component;
    use std::collections::BTreeMap;

    fn breakdown(country: &str, score: f64, imputed: bool) -> ScoreBreakdown {
        let components: BTreeMap<Indicator, Component> = Indicator::ALL
            .iter()
            .map(|&i| {
                (
                    i,
                    Component {
                        raw: 1_500.0,
                        scaled: 50.0,
                        weight: 0.25,
                        contribution: 12.5,
                        imputed: imputed && i == Indicator::GdpPerCapita,
                    },
                )
            })
            .collect();
        ScoreBreakdown {
            country: country.to_string(),
            requested_year: 2020,
            year: 2020,
            score,
            components,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(72.44), "72.4");
        assert_eq!(format_value(1_000.0), "1k");
        assert_eq!(format_value(12_345.0), "12.3k");
        assert_eq!(format_value(2_300_000.0), "2.3M");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Congo, Dem. Rep.", 8), "Congo...");
    }

    #[test]
    fn test_breakdown_lists_components() {
        let out = format_breakdown(&breakdown("Chile", 50.0, false), false);
        assert!(out.starts_with("Chile (2020)  score 50.0"));
        for indicator in Indicator::ALL {
            assert!(out.contains(indicator.label()));
        }
        assert!(!out.contains("column median"));
    }

    #[test]
    fn test_breakdown_marks_imputed_and_fallback() {
        let mut b = breakdown("Chile", 50.0, true);
        b.requested_year = 2023;
        let out = format_breakdown(&b, false);
        assert!(out.contains("1.5k*"));
        assert!(out.contains("column median"));
        assert!(out.contains("no data for 2023, using latest year 2020"));
    }

    #[test]
    fn test_comparison_verdict() {
        let comparison = Comparison {
            first: breakdown("Chile", 61.25, false),
            second: breakdown("Peru", 48.0, false),
            leader: Some("Chile".to_string()),
            difference: 13.25,
        };
        let out = format_comparison(&comparison, false);
        assert!(out.ends_with("Chile leads by 13.2 points") || out.ends_with("Chile leads by 13.3 points"));
    }

    #[test]
    fn test_summary_table_has_every_continent() {
        let table = SummaryTable {
            year: 2020,
            rows: ContinentLabel::ALL
                .iter()
                .map(|&region| ContinentSummary {
                    region,
                    countries: if region == ContinentLabel::Antarctica { 0 } else { 3 },
                    vestigial: region.is_vestigial(),
                    means: [Some(12_000.0), Some(71.5), None, Some(20.0)],
                })
                .collect(),
        };
        let out = format_summary_table(&table, false);
        assert!(out.starts_with("Continent averages for 2020"));
        for label in ContinentLabel::ALL {
            assert!(out.contains(label.as_str()));
        }
        assert!(out.contains("12k"));
        assert!(out.contains(" -"));
        assert!(out.contains("Antarctica*"));
        assert!(out.ends_with("* no country maps here, listed for completeness"));
    }

    #[test]
    fn test_correlation_output() {
        let insight = CorrelationInsight {
            x: Indicator::GdpPerCapita,
            y: Indicator::ChildMortality,
            year: 2020,
            region: None,
            pairs: 150,
            r: -0.62,
            strength: CorrelationStrength::Moderate,
            direction: Direction::Negative,
        };
        let out = format_correlation(&insight, false);
        assert!(out.starts_with("Pearson r = -0.62 (150 countries)"));
        assert!(out.contains("moderate negative"));
    }

    #[test]
    fn test_region_comparison_output() {
        let comparison = RegionComparison {
            indicator: Indicator::LifeExpectancy,
            first: ContinentLabel::Asia,
            first_value: YearValue { year: 2021, value: 73.5 },
            second: ContinentLabel::Europe,
            second_value: YearValue { year: 2021, value: 80.0 },
            higher: Some(ContinentLabel::Europe),
            percent_gap: Some(8.84),
        };
        let out = format_region_comparison(&comparison, false);
        assert!(out.starts_with("Life expectancy: Asia vs Europe"));
        assert!(out.contains("73.5"));
        assert!(out.ends_with("Europe has higher life expectancy than Asia by 8.84%."));
    }

    #[test]
    fn test_trend_output() {
        let trend = RegionTrend {
            region: ContinentLabel::Africa,
            indicator: Indicator::ChildMortality,
            points: vec![
                YearValue { year: 2000, value: 150.0 },
                YearValue { year: 2010, value: 95.0 },
                YearValue { year: 2020, value: 70.0 },
            ],
            direction: TrendDirection::Falling,
        };
        let out = format_trend(&trend, false);
        assert!(out.starts_with("Child mortality trend in Africa"));
        assert!(out.contains("  2010       95.0"));
        assert!(out.ends_with("Child mortality in Africa fell from 150.00 (2000) to 70.00 (2020)."));
    }

    #[test]
    fn test_clean_report() {
        let clean = ResolutionReport {
            rows_in: 4,
            rows_kept: 4,
            countries_resolved: 2,
            unresolved: vec![],
        };
        assert_eq!(
            format_clean_report(&clean, false),
            "Kept 4 of 4 rows (2 countries tagged)"
        );

        let dropped = ResolutionReport {
            rows_in: 10,
            rows_kept: 7,
            countries_resolved: 3,
            unresolved: vec![
                Unresolved::NoMatch("Euro area".into()),
                Unresolved::LookupFailed {
                    name: "Chad".into(),
                    reason: "timed out".into(),
                },
            ],
        };
        let out = format_clean_report(&dropped, false);
        assert!(out.contains("Dropped 3 rows for 2 unresolved names (1 lookup failures)"));
        assert!(out.contains("Euro area"));
    }
}
