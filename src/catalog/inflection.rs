//! String inflection for catalog field names.
//!
//! Catalog names are camelCase API identifiers (`pagePath`, `deviceCategory`).
//! Users write them as words ("page path", "device categories"), so each name
//! is expanded into the surface forms a question may contain. Uses the
//! `inflector` crate with a few irregular plurals common in analytics
//! vocabularies.

use inflector::Inflector;

/// Irregular plurals that inflector doesn't handle well for analytics names.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("medium", "media"),
    ("criterion", "criteria"),
    ("person", "people"),
    ("child", "children"),
    ("analysis", "analyses"),
];

/// Turn a camelCase API name into lower-case words.
///
/// # Examples
/// ```ignore
/// assert_eq!(humanize("pagePath"), "page path");
/// assert_eq!(humanize("sessions"), "sessions");
/// ```
pub fn humanize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    name.to_sentence_case().to_lowercase()
}

/// Pluralize the last word of a phrase, handling irregulars first.
pub fn pluralize(phrase: &str) -> String {
    if phrase.is_empty() {
        return String::new();
    }

    let lower = phrase.to_lowercase();
    let (head, last) = match lower.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, lower.as_str()),
    };

    let plural_last = IRREGULAR_PLURALS
        .iter()
        .find(|(singular, plural)| last == *singular || last == *plural)
        .map(|(_, plural)| plural.to_string())
        .unwrap_or_else(|| last.to_plural());

    match head {
        Some(head) => format!("{} {}", head, plural_last),
        None => plural_last,
    }
}

/// All forms under which a catalog name may appear in a normalized question.
///
/// The raw lower-cased name comes first, then the humanized and plural forms.
/// Duplicates are removed.
pub fn surface_forms(name: &str) -> Vec<String> {
    let mut forms = Vec::with_capacity(3);
    let candidates = [name.to_lowercase(), humanize(name), pluralize(&humanize(name))];
    for form in candidates {
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    }
    forms
}
