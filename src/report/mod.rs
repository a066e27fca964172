pub mod formatter;
pub mod render;
pub mod responder;

pub use formatter::ReportFormatter;
pub use render::{format_thousands, render_error, render_markdown, render_text, render_trend};
pub use responder::{plain_summary, region_context, respond, Intent};
