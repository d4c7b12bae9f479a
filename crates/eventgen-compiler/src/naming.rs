//! Identifier sanitization for generated Ballerina source.
//!
//! Spec strings are untrusted: property names, event names and schema names
//! may contain any character or collide with a keyword. Everything here is
//! total, there is no input that makes sanitization fail.

/// Ballerina reserved words. Any of these used as an identifier must be
/// quoted with a leading `'`.
///
/// `error` is deliberately absent: it is rewritten to `_error` instead.
pub const KEYWORDS: &[&str] = &[
    "abstract", "annotation", "any", "anydata", "ascending", "base16", "base64", "boolean",
    "break", "by", "byte", "check", "checkpanic", "class", "client", "collect", "commit",
    "conflict", "const", "continue", "decimal", "default", "descending", "distinct", "do",
    "else", "enum", "equals", "external", "fail", "false", "field", "final", "float",
    "foreach", "fork", "from", "function", "future", "group", "handle", "if", "import", "in",
    "int", "is", "isolated", "join", "json", "let", "limit", "listener", "lock", "map",
    "match", "never", "new", "null", "object", "on", "order", "outer", "panic", "private",
    "public", "readonly", "record", "remote", "resource", "retry", "return", "returns",
    "rollback", "select", "service", "source", "start", "stream", "string", "table",
    "transaction", "transactional", "trap", "true", "type", "typedesc", "typeof", "var",
    "wait", "where", "while", "worker", "xml", "xmlns",
];

/// Characters that must be backslash-escaped inside a quoted identifier.
const ESCAPE_CHARS: &[char] = &[
    '[', ']', '\\', '?', '!', '<', '>', '@', '#', '&', '~', '`', '*', '-', '=', '^', '+', '(',
    ')', ';', ':', '/', '{', '}', '|', '.', '$', '\'',
];

/// Returns true if `word` is a Ballerina keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_escape_char(c: char) -> bool {
    ESCAPE_CHARS.contains(&c) || c.is_whitespace()
}

/// Name splitting treats underscores as word boundaries too.
fn is_split_char(c: char) -> bool {
    is_escape_char(c) || c == '_'
}

/// Plain identifier grammar: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_plain_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Escapes a raw spec name into a legal Ballerina identifier.
///
/// Plain non-keyword names pass through untouched. `error` becomes `_error`.
/// Everything else is quoted with `'` after backslash-escaping special
/// characters. A trailing optional marker (`?`) is kept unescaped and the
/// quote is added only when the name before it is a keyword.
pub fn escape(identifier: &str) -> String {
    if identifier == "error" {
        return "_error".to_string();
    }
    if is_plain_identifier(identifier) && !is_keyword(identifier) {
        return identifier.to_string();
    }

    let mut escaped = String::with_capacity(identifier.len() + 4);
    for c in identifier.chars() {
        if is_escape_char(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    if let Some(stem) = escaped.strip_suffix('?') {
        let stem = stem.strip_suffix('\\').unwrap_or(stem);
        return if is_keyword(stem) {
            format!("'{}?", stem)
        } else {
            format!("{}?", stem)
        };
    }

    format!("'{}", escaped)
}

/// Builds a camel/Pascal case name from an arbitrary spec string.
///
/// The string is split on special characters and underscores; the first
/// segment is kept as written and every following segment is capitalized
/// with the rest lowercased. The first character is then upper- or
/// lower-cased according to `capitalize_first`.
pub fn get_valid_name(identifier: &str, capitalize_first: bool) -> String {
    let joined = if !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit()) {
        identifier.to_string()
    } else {
        identifier
            .split(is_split_char)
            .filter(|segment| !segment.is_empty())
            .enumerate()
            .map(|(i, segment)| {
                if i == 0 {
                    segment.to_string()
                } else {
                    capitalize_segment(segment)
                }
            })
            .collect()
    };

    let mut chars = joined.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if capitalize_first => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

fn capitalize_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Type name for a schema: PascalCase, escaped.
pub fn type_name(schema_name: &str) -> String {
    escape(&get_valid_name(schema_name, true))
}

/// Variable name for a value of the given type: camelCase, escaped.
pub fn variable_name(schema_name: &str) -> String {
    escape(&get_valid_name(schema_name, false))
}

/// Handler name for an event: `on` + PascalCase(event).
pub fn function_name_for_event(event_name: &str) -> String {
    format!("on{}", get_valid_name(event_name, true))
}

/// Client operation name for a message: `do` + PascalCase(message).
pub fn client_function_name(message_name: &str) -> String {
    format!("do{}", get_valid_name(message_name, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_unchanged() {
        for name in ["foo", "fooBar", "_private", "snake_case", "x1"] {
            assert_eq!(escape(name), name);
        }
    }

    #[test]
    fn keywords_are_quoted() {
        for keyword in KEYWORDS {
            assert!(escape(keyword).starts_with('\''), "{keyword} was not quoted");
        }
        assert_eq!(escape("type"), "'type");
    }

    #[test]
    fn error_gets_an_alternate_spelling() {
        assert_eq!(escape("error"), "_error");
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(escape("first-name"), "'first\\-name");
        assert_eq!(escape("a.b"), "'a\\.b");
        assert_eq!(escape("$ref"), "'\\$ref");
        assert_eq!(escape("with space"), "'with\\ space");
        assert_eq!(escape("1st"), "'1st");
    }

    #[test]
    fn optional_marker_is_preserved() {
        assert_eq!(escape("name?"), "name?");
        assert_eq!(escape("type?"), "'type?");
    }

    #[test]
    fn valid_names() {
        assert_eq!(get_valid_name("foo", true), "Foo");
        assert_eq!(get_valid_name("foo#foo#", true), "FooFoo");
        assert_eq!(get_valid_name("foo#foo0#", true), "FooFoo0");
        assert_eq!(get_valid_name("foo", false), "foo");
        assert_eq!(get_valid_name("foo#foo#", false), "fooFoo");
        assert_eq!(get_valid_name("foo#foo0#", false), "fooFoo0");
    }

    #[test]
    fn valid_names_split_on_underscores_and_lowercase_tails() {
        assert_eq!(get_valid_name("app_mention", true), "AppMention");
        assert_eq!(get_valid_name("member_JOINED_channel", true), "MemberJoinedChannel");
        assert_eq!(get_valid_name("GenericEvent", false), "genericEvent");
    }

    #[test]
    fn numeric_names_pass_through() {
        assert_eq!(get_valid_name("404", true), "404");
        assert_eq!(get_valid_name("", true), "");
    }

    #[test]
    fn derived_names() {
        assert_eq!(function_name_for_event("app_mention"), "onAppMention");
        assert_eq!(client_function_name("subscribe-ticker"), "doSubscribeTicker");
        assert_eq!(type_name("user-profile"), "UserProfile");
        assert_eq!(variable_name("GenericEvent"), "genericEvent");
        assert_eq!(variable_name("Type"), "'type");
    }
}
