//! Splitting console lines into command tokens.

const DOTTED_METHODS: &[&str] = &["all", "count", "show", "destroy", "update"];

/// Tokenize a command line.
///
/// The dotted form `<Kind>.<method>(<args>)` is rewritten to
/// `<method> <Kind> <args...>`. Anything else is split by [`split_args`].
pub fn tokenize(line: &str) -> Vec<String> {
    dotted(line).unwrap_or_else(|| split_args(line))
}

/// Split on whitespace outside of quotes and braces.
///
/// Quoted and braced segments are kept verbatim, delimiters included, so the
/// caller decides whether to strip quotes. An unterminated quote or brace runs
/// to the end of the line.
pub fn split_args(line: &str) -> Vec<String> {
    split_on(line, char::is_whitespace)
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect()
}

/// Rewrite single-quoted string literals as JSON strings.
///
/// Double-quoted literals pass through untouched, so apostrophes inside them
/// survive. Inside a single-quoted literal `\'` becomes `'` and a bare `"` is
/// escaped.
pub fn single_to_double_quotes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '\'' | '"') => {
                quote = Some(c);
                out.push('"');
            }
            (None, c) => out.push(c),
            (Some(q), '\\') => match chars.next() {
                Some('\'') if q == '\'' => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            (Some(q), c) if c == q => {
                quote = None;
                out.push('"');
            }
            (Some('\''), '"') => out.push_str("\\\""),
            (Some(_), c) => out.push(c),
        }
    }
    out
}

fn dotted(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    let (kind, call) = line.split_once('.')?;
    let (method, rest) = call.split_once('(')?;
    let args = rest.strip_suffix(')')?;

    let is_ident = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_ident(kind) || !DOTTED_METHODS.contains(&method) {
        return None;
    }

    let mut tokens = vec![method.to_string(), kind.to_string()];
    tokens.extend(
        split_on(args, |c| c == ',')
            .into_iter()
            .map(|arg| arg.trim().to_string())
            .filter(|arg| !arg.is_empty()),
    );
    Some(tokens)
}

/// Split `line` wherever `is_separator` matches outside quotes and braces.
fn split_on(line: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for c in line.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '{' => {
                    depth += 1;
                    current.push(c);
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                c if depth == 0 && is_separator(c) => {
                    parts.push(std::mem::take(&mut current));
                }
                c => current.push(c),
            },
        }
    }
    parts.push(current);
    parts
}
