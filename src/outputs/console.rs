//! Plain-text results printed to stdout.
//!
//! ```text
//! Original Title: El fin de la guerra
//! Translated Title: The end of the war
//!
//!
//! Repeated Words Analysis:
//! the: 4
//! war: 3
//! ```

use crate::analysis::WordFrequencyReport;
use crate::models::TranslatedTitle;
use std::fmt::Write;

pub fn render_translation(title: &TranslatedTitle) -> String {
    format!(
        "Original Title: {}\nTranslated Title: {}\n",
        title.original, title.translated
    )
}

pub fn render_repeated_words(report: &WordFrequencyReport) -> String {
    let mut out = String::from("\nRepeated Words Analysis:\n");
    for (word, count) in report.repeated() {
        let _ = writeln!(out, "{word}: {count}");
    }
    out
}

pub fn print_translation(title: &TranslatedTitle) {
    println!("{}", render_translation(title));
}

pub fn print_repeated_words(report: &WordFrequencyReport) {
    print!("{}", render_repeated_words(report));
}
