//! Identifier case conversion.
//!
//! Templates derive package names, module names and class names from a
//! human-entered project name ("Test Project" → `test_project`). The
//! renderer exposes these as helpers; answer defaults use them too.
//!
//! | Input | snake | kebab | pascal |
//! |-------|-------|-------|--------|
//! | `Test Project` | `test_project` | `test-project` | `TestProject` |
//! | `HTTPServer` | `http_server` | `http-server` | `HttpServer` |
//! | `myApp v2` | `my_app_v2` | `my-app-v2` | `MyAppV2` |

pub fn snake_case(s: &str) -> String {
    split_words(s).join("_")
}

pub fn kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

pub fn pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// URL/file-safe slug: ASCII alphanumerics only, words joined by `-`.
///
/// Unlike [`kebab_case`] this drops every non-ASCII character, so the
/// result is always usable as a path segment.
pub fn slugify(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            w.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Split into lowercase words.
///
/// Boundaries: any non-alphanumeric character, a lower→upper transition
/// (`myApp`), and the last capital of an acronym run (`HTTPServer`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_alphanumeric() {
            flush(&mut words, &mut current);
            continue;
        }

        current.push(c);

        let Some(&next) = chars.peek() else {
            continue;
        };

        let camel = (c.is_lowercase() || c.is_numeric()) && next.is_uppercase();
        let acronym_end = c.is_uppercase()
            && next.is_uppercase()
            && chars.clone().nth(1).is_some_and(char::is_lowercase);

        if camel || acronym_end {
            flush(&mut words, &mut current);
        }
    }
    flush(&mut words, &mut current);

    words
}

fn flush(words: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        words.push(current.to_lowercase());
        current.clear();
    }
}
