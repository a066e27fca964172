//! Canned analysis text keyed off the user's question.
//!
//! Dispatch is a fixed table: the first intent with a keyword contained in
//! the lowercased prompt wins, `General` otherwise.

use crate::models::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Temperature,
    Comparison,
    Health,
    Region,
    General,
}

/// Checked in this order.
pub const INTENT_KEYWORDS: [(Intent, &[&str]); 4] = [
    (Intent::Temperature, &["temperature", "temp", "hot", "cold", "warm"]),
    (Intent::Comparison, &["compare", "comparison", "versus", "vs"]),
    (Intent::Health, &["health", "risk", "safe", "danger"]),
    (Intent::Region, &["region", "area", "location"]),
];

pub const REGION_CONTEXT: [(&str, &str); 8] = [
    ("Red Sea", "Coastal region with tourism and shipping activities. Generally has good air quality due to sea breezes."),
    ("Delta", "Agricultural region with high population density. PM2.5 levels are often elevated due to agricultural activities."),
    ("Greater Cairo", "Urban metropolitan area with significant traffic and industrial emissions. Typically has the highest pollution levels."),
    ("Sinai", "Desert region with dust storms and minimal industrial activity. Air quality is generally good but affected by dust."),
    ("New Valley", "Desert oasis with agricultural activities. Moderate pollution levels with seasonal variations."),
    ("Upper Egypt", "Southern region with mixed urban and rural areas. Air quality varies by location and season."),
    ("North Coast", "Mediterranean coastal region with good air quality influenced by sea breezes."),
    ("Canal Cities", "Urban areas along Suez Canal with shipping and industrial emissions. Moderate to high pollution levels."),
];

pub fn region_context(region: &str) -> Option<&'static str> {
    REGION_CONTEXT
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, context)| *context)
}

impl Intent {
    pub fn classify(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        INTENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| prompt.contains(k)))
            .map_or(Intent::General, |(intent, _)| *intent)
    }

    fn heading(&self) -> &'static str {
        match self {
            Intent::Temperature => "🌡️ **Temperature Analysis**",
            Intent::Comparison => "📊 **Regional Comparison**",
            Intent::Health => "🏥 **Health Impact Analysis**",
            Intent::Region => "📍 **Regional Profile**",
            Intent::General => "🤖 **Environmental Analysis**",
        }
    }

    fn insights(&self) -> &'static str {
        match self {
            Intent::Temperature => "**Key Temperature Insights:**\n\
                - Regional temperatures follow Egypt's coastal, delta and desert climate zones\n\
                - Coastal regions are generally cooler than desert areas\n\
                - Temperature affects pollutant dispersion and formation",
            Intent::Comparison => "**Comparative Analysis:**\n\
                - Averages are computed over the same window for every region\n\
                - Urban, rural and coastal regions differ in their pollutant mix\n\
                - Threshold bands make regions directly comparable",
            Intent::Health => "**Health Guidelines (WHO):**\n\
                - PM2.5: Good (0-12 μg/m³), Moderate (12-35 μg/m³), Poor (>35 μg/m³)\n\
                - PM10: Good (0-50 μg/m³), Moderate (50-100 μg/m³), Poor (>100 μg/m³)\n\n\
                **Recommendations:**\n\
                - Monitor air quality in high-pollution areas\n\
                - Sensitive groups should take precautions where bands are Moderate or Poor",
            Intent::Region => "**Regional Context:**",
            Intent::General => "**Environmental Intelligence:**\n\
                Summary of measured environmental conditions across Egyptian regions.",
        }
    }

    fn closing(&self) -> &'static str {
        match self {
            Intent::Temperature => "Based on your question",
            Intent::Comparison => "Comparison based on",
            Intent::Health => "Health analysis for",
            Intent::Region => "Regional analysis for",
            Intent::General => "Analysis based on",
        }
    }
}

/// Wrap a rendered report in the template for the prompt's intent.
pub fn respond(prompt: &str, report: &Report, rendered: &str) -> String {
    let intent = Intent::classify(prompt);
    let mut out = format!("{}\n\n{}\n\n{}", intent.heading(), rendered.trim_end(), intent.insights());

    if intent == Intent::Region {
        let contexts: Vec<String> = report
            .rows
            .iter()
            .filter_map(|row| region_context(&row.region).map(|c| format!("- **{}**: {}", row.region, c)))
            .collect();

        if contexts.is_empty() {
            out.push_str("\nEgypt's diverse geography creates varied environmental conditions across regions.");
        } else {
            out.push('\n');
            out.push_str(&contexts.join("\n"));
        }
    }

    out.push_str(&format!("\n\n*{}: \"{}\"*", intent.closing(), prompt.trim()));
    out
}

/// Plain data summary followed by the question, used when analysis is off.
pub fn plain_summary(prompt: &str, rendered: &str) -> String {
    let mut out = format!("📊 **DATA SUMMARY**\n\n{}", rendered.trim_end());
    if !prompt.trim().is_empty() {
        out.push_str(&format!("\n\n**Your Question:** {}", prompt.trim()));
    }
    out
}
