//! Parsing helpers for written C++ type texts.
//!
//! Base specifiers and variable types arrive from the AST dump as plain
//! strings (`"Parent<int>"`, `"const Child2 &"`, `"typename Parent<T>::Type"`).
//! These helpers split and normalize them far enough for hierarchy
//! resolution; they are not a general C++ type parser.

/// A written type split at its template-id, e.g. `Parent<int>::Type` into
/// `template = "Parent"`, `args = ["int"]`, `suffix = "::Type"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateId<'a> {
    pub template: &'a str,
    pub args: Vec<String>,
    pub suffix: &'a str,
}

/// Strip elaboration keywords, cv-qualifiers and reference/pointer sigils.
///
/// E.g. `const struct Parent &` -> `Parent`.
pub fn strip_elaboration(written: &str) -> &str {
    let mut s = written.trim();
    loop {
        let before = s;
        for prefix in ["typename ", "const ", "volatile ", "struct ", "class ", "union ", "enum "] {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.trim_start();
                break;
            }
        }
        if before == s {
            break;
        }
    }
    s.trim_end_matches(['*', '&', ' ', '\t'])
}

/// Split a written type at its first top-level template-id.
///
/// Returns `None` when the type carries no template arguments.
pub fn split_template_id(written: &str) -> Option<TemplateId<'_>> {
    let open = written.find('<')?;
    let template = written[..open].trim();

    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in written[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            },
            _ => {},
        }
    }
    let close = close?;

    let args = split_arguments(&written[open + 1..close]);
    let suffix = written[close + 1..].trim();
    Some(TemplateId {
        template,
        args,
        suffix,
    })
}

/// Split a template argument list on top-level commas.
fn split_arguments(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(args[start..i].trim().to_owned());
                start = i + 1;
            },
            _ => {},
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        out.push(last.to_owned());
    }
    out
}

/// The trailing segment of a possibly-qualified name
/// (`"ns::Parent"` -> `"Parent"`).
pub fn unqualified_tail(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name).trim()
}

/// Normalize a type text for comparison: collapse whitespace, keeping a
/// single space only between adjacent identifier characters.
///
/// `"S<N + 1>"` and `"S< N+1 >"` both normalize to `"S<N+1>"`, while
/// `"unsigned int"` keeps its separating space.
pub fn normalize_type_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            if is_ident_char(c) && out.chars().next_back().is_some_and(is_ident_char) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Whether any identifier token in `text` names one of `params`.
pub fn mentions_param(text: &str, params: &[String]) -> bool {
    if params.is_empty() {
        return false;
    }
    identifier_tokens(text).any(|tok| params.iter().any(|p| p == tok))
}

/// Substitute template parameter identifiers with their argument texts.
///
/// Purely textual; no evaluation. `"S<N + 1>"` with `N := 0` becomes
/// `"S<0 + 1>"`, a distinct written type that the instantiation depth budget
/// bounds if it keeps growing.
pub fn substitute_params(text: &str, bindings: &[(String, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if is_ident_char(c) {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if !is_ident_char(c) {
                    break;
                }
                end = i + c.len_utf8();
                chars.next();
            }
            let tok = &text[start..end];
            match bindings.iter().find(|(name, _)| name == tok) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(tok),
            }
        } else {
            out.push(c);
            chars.next();
        }
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn identifier_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_ident_char(c)).filter(|tok| !tok.is_empty() && !tok.starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
#[path = "../../tests/src/semantic/type_name_tests.rs"]
mod tests;
