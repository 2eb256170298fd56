//! Macros every `.bib` file can use without defining them.

use std::collections::HashMap;

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// The month abbreviations of the standard styles.
pub fn predefined() -> HashMap<String, String> {
    MONTHS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
