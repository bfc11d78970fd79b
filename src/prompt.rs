//! The fixed summary prompt.
//!
//! Only the retrieved record's cause and resolution are substituted into
//! the template. The record's id and name are kept out of the rendered
//! prompt entirely, which is the strongest form of the "do not print the
//! exception id or name" instruction.

use crate::store::StoredDocument;

const SUMMARY_TEMPLATE: &str = "\
You are a production support engineer and you need to store summaries of \
exceptions you observed so they are helpful when the exception comes again.

Summarize this exception in one to two paragraphs, at least 50 words.
Use the details below to summarize the exception.

Exception Details:
{details}

Only print the summary of the exception.
Do not include the exception id or the exception name in the output.
";

/// Formats the retrieved document into the context block of the prompt.
pub fn format_details(document: &StoredDocument) -> String {
    format!(
        "Cause: {}\nResolution: {}",
        document.exception_cause, document.exception_resolution
    )
}

/// Renders the full prompt for a retrieved document.
pub fn render_prompt(document: &StoredDocument) -> String {
    SUMMARY_TEMPLATE.replace("{details}", &format_details(document))
}
