//! Text renderings of a [`Report`]. Numbers are shown to one decimal place.

use crate::error::AirQualityError;
use crate::models::{DailyAverage, Metric, Report, ReportRow, ThresholdBand};

const NO_VALUE: &str = "n/a";

fn value(v: Option<f64>) -> String {
    v.map_or_else(|| NO_VALUE.to_string(), |v| format!("{:.1}", v))
}

fn band_suffix(band: Option<ThresholdBand>) -> String {
    band.map(|b| format!(" ({} {})", b.indicator(), b.label()))
        .unwrap_or_default()
}

/// `1234567` → `"1,234,567"`
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Markdown report with one section per region.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("## 🌍 Egypt Air Quality Report\n\n");
    md.push_str(&format!("**📍 Regions**: {}\n", report.region_filter));
    md.push_str(&format!("**📅 Analysis Period**: Last {} days\n", report.period_days));
    md.push_str(&format!(
        "**🕒 Generated**: {} UTC\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if report.is_empty {
        md.push_str("⚠️ *No data found for the specified criteria*\n\n");
        return md;
    }

    for row in &report.rows {
        md.push_str(&markdown_section(row));
    }

    md
}

fn markdown_section(row: &ReportRow) -> String {
    let line = |icon: &str, metric: Metric| {
        format!(
            "• {} **{}**: {} {}{}\n",
            icon,
            metric.display_name(),
            value(row.metric(metric)),
            metric.units(),
            band_suffix(row.band(metric))
        )
    };

    let mut section = format!("### 📍 {}\n**Environmental Metrics:**\n", row.region);
    section.push_str(&line("🌡️", Metric::Temperature));
    section.push_str(&line("💧", Metric::Humidity));
    section.push_str(&line("🌫️", Metric::Pm25));
    section.push_str(&line("🏭", Metric::Pm10));
    section.push_str(&line("🚗", Metric::No2));
    section.push_str(&line("🌿", Metric::Co2));
    section.push_str(&format!(
        "• 📊 **Readings**: {}\n",
        format_thousands(row.reading_count)
    ));
    section.push_str(&format!(
        "• **Period**: {} to {}\n\n",
        row.period_start.format("%Y-%m-%d %H:%M"),
        row.period_end.format("%Y-%m-%d %H:%M")
    ));
    section
}

/// Fixed-width table for terminals.
pub fn render_text(report: &Report) -> String {
    let mut out = format!(
        "Air quality: {}, last {} days (generated {} UTC)\n",
        report.region_filter,
        report.period_days,
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    if report.is_empty {
        out.push_str("No data found for the specified criteria.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<16} {:>7} {:>7} {:>7} {:>7} {:>6} {:>6} {:>9}  {}\n",
        "Region", "PM2.5", "PM10", "NO2", "CO2", "Temp", "Humid", "Readings", "PM2.5/PM10"
    ));

    for row in &report.rows {
        let bands = format!(
            "{}/{}",
            row.pm25_band.map_or(NO_VALUE, |b| b.label()),
            row.pm10_band.map_or(NO_VALUE, |b| b.label())
        );
        out.push_str(&format!(
            "{:<16} {:>7} {:>7} {:>7} {:>7} {:>6} {:>6} {:>9}  {}\n",
            row.region,
            value(row.avg_pm25),
            value(row.avg_pm10),
            value(row.avg_no2),
            value(row.avg_co2),
            value(row.avg_temperature),
            value(row.avg_humidity),
            format_thousands(row.reading_count),
            bands
        ));
    }

    out.push_str(&format!(
        "\n{} regions, {} readings\n",
        report.rows.len(),
        format_thousands(report.total_readings())
    ));
    out
}

pub fn render_trend(region: &str, metric: Metric, days: u32, trend: &[DailyAverage]) -> String {
    let mut out = format!(
        "{} trend in {} (last {} days)\n",
        metric.display_name(),
        region,
        days
    );

    if trend.is_empty() {
        out.push_str("No data found for the specified criteria.\n");
        return out;
    }

    for day in trend {
        out.push_str(&format!(
            "{}  {:>8} {}  ({} readings)\n",
            day.date,
            value(day.average),
            metric.units(),
            day.readings
        ));
    }
    out
}

/// Failure panel. Connectivity problems and schema problems read
/// differently from each other and from an empty result.
pub fn render_error(err: &AirQualityError) -> String {
    match err {
        AirQualityError::DataSourceUnavailable { message } => format!(
            "## ❌ Database Connection Error\n\n\
            Unable to reach the reading store.\n\n\
            **Error**: {}\n\n\
            Please check your database credentials and network connectivity, then try again.",
            message
        ),
        AirQualityError::MalformedSchema(message) => format!(
            "## ❌ Reading Table Error\n\n\
            The store is reachable but the reading table does not have the expected layout.\n\n\
            **Error**: {}\n\n\
            Ask an operator to verify the table and its columns.",
            message
        ),
        other => format!("## ❌ System Error\n\n**Error**: {}", other),
    }
}
