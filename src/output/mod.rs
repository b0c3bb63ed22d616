pub mod formatter;

pub use formatter::{
    format_breakdown, format_clean_report, format_comparison, format_correlation,
    format_region_comparison, format_summary_table, format_trend, format_value,
    should_use_colors,
};
