//! Runtime message templates.
//!
//! Templates use the same placeholder syntax as `format!`, restricted to what can
//! be checked at runtime against a slice of `Display` arguments:
//!
//! * `{}` takes the next argument, `{N}` takes argument `N` explicitly,
//! * either may carry a `Display` format spec after a colon:
//!   `[[fill]align][0][width][.precision]`, e.g. `{:.2}`, `{:>8}`, `{0:05}`,
//!   `{:*^7}`,
//! * `{{` and `}}` are literal braces.
//!
//! Specs that need another formatting trait (`{:?}`, `{:x}`, `{:e}`), sign or
//! alternate flags, and named or `$` arguments are rejected.
//!
//! Rendering never panics. [`render_lossy`] turns every mismatch into the raw
//! template followed by a short note describing what went wrong.

use std::fmt::{self, Write};

/// Argument list accepted by runtime templates.
pub type Args<'a> = [&'a dyn fmt::Display];

/// Why a template could not be rendered with the given arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("missing argument {index}, {given} given")]
    MissingArgument { index: usize, given: usize },
    #[error("{unused} of {given} arguments unused")]
    UnusedArguments { unused: usize, given: usize },
    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
    #[error("unsupported placeholder `{{{0}}}`")]
    UnsupportedPlaceholder(String),
    #[error("argument {0} failed to format")]
    Argument(usize),
}

/// Substitutes `args` into `template`.
///
/// # Errors
///
/// Returns a [`TemplateError`] when the placeholders and the arguments disagree,
/// when a brace is unbalanced, or when an argument's `Display` impl fails.
pub fn render(template: &str, args: &Args<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut used = vec![false; args.len()];
    let mut next_implicit = 0usize;
    let mut rest = template;
    let mut offset = 0usize;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let tail = &rest[pos..];

        // Literal braces.
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            offset = at + 2;
            continue;
        }
        if tail.starts_with('}') {
            return Err(TemplateError::UnbalancedBrace(at));
        }

        let close = tail.find('}').ok_or(TemplateError::UnbalancedBrace(at))?;
        let inner = &tail[1..close];
        if inner.contains('{') {
            return Err(TemplateError::UnbalancedBrace(at));
        }

        let unsupported = || TemplateError::UnsupportedPlaceholder(inner.to_owned());
        let (position, spec) = match inner.split_once(':') {
            Some((position, spec)) => {
                (position, FormatSpec::parse(spec).ok_or_else(unsupported)?)
            }
            None => (inner, FormatSpec::default()),
        };

        let index = if position.is_empty() {
            let index = next_implicit;
            next_implicit += 1;
            index
        } else if position.bytes().all(|b| b.is_ascii_digit()) {
            position.parse::<usize>().map_err(|_| unsupported())?
        } else {
            return Err(unsupported());
        };

        let arg = args.get(index).ok_or(TemplateError::MissingArgument {
            index,
            given: args.len(),
        })?;
        spec.write(&mut out, *arg).map_err(|_| TemplateError::Argument(index))?;
        if let Some(flag) = used.get_mut(index) {
            *flag = true;
        }

        rest = &tail[close + 1..];
        offset = at + close + 1;
    }
    out.push_str(rest);

    let unused = used.iter().filter(|u| !**u).count();
    if unused > 0 {
        return Err(TemplateError::UnusedArguments {
            unused,
            given: args.len(),
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::Left),
            '^' => Some(Self::Center),
            '>' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Parsed `[[fill]align][0][width][.precision]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: None,
            zero: false,
            width: None,
            precision: None,
        }
    }
}

impl FormatSpec {
    /// `None` for anything outside the supported subset.
    fn parse(spec: &str) -> Option<Self> {
        let mut parsed = Self::default();
        let mut rest = spec;

        let mut chars = rest.chars();
        let first = chars.next();
        let second = chars.next();
        if let (Some(fill), Some(align)) = (first, second.and_then(Align::from_char)) {
            parsed.fill = fill;
            parsed.align = Some(align);
            rest = &rest[fill.len_utf8() + 1..];
        } else if let Some(align) = first.and_then(Align::from_char) {
            parsed.align = Some(align);
            rest = &rest[1..];
        }

        if let Some(stripped) = rest.strip_prefix('0') {
            parsed.zero = true;
            rest = stripped;
        }

        let (width, tail) = leading_number(rest)?;
        parsed.width = width;
        rest = tail;

        if let Some(stripped) = rest.strip_prefix('.') {
            let (precision, tail) = leading_number(stripped)?;
            parsed.precision = Some(precision?);
            rest = tail;
        }

        rest.is_empty().then_some(parsed)
    }

    fn write(&self, out: &mut String, arg: &dyn fmt::Display) -> fmt::Result {
        let (Some(width), None) = (self.width, self.align) else {
            // No width, or an explicit alignment: format the body, then pad it.
            let mut body = String::new();
            match self.precision {
                Some(p) => write!(body, "{arg:.p$}")?,
                None => write!(body, "{arg}")?,
            }
            self.pad(out, &body);
            return Ok(());
        };

        // Width without alignment keeps the argument's own default alignment.
        match (self.zero, self.precision) {
            (true, Some(p)) => write!(out, "{arg:0width$.p$}"),
            (true, None) => write!(out, "{arg:0width$}"),
            (false, Some(p)) => write!(out, "{arg:width$.p$}"),
            (false, None) => write!(out, "{arg:width$}"),
        }
    }

    fn pad(&self, out: &mut String, body: &str) {
        let len = body.chars().count();
        let missing = self.width.unwrap_or(0).saturating_sub(len);
        let (before, after) = match self.align {
            Some(Align::Left) | None => (0, missing),
            Some(Align::Center) => (missing / 2, missing - missing / 2),
            Some(Align::Right) => (missing, 0),
        };
        out.extend(std::iter::repeat_n(self.fill, before));
        out.push_str(body);
        out.extend(std::iter::repeat_n(self.fill, after));
    }
}

/// Splits leading ASCII digits off `text`. `None` on overflow.
fn leading_number(text: &str) -> Option<(Option<usize>, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return Some((None, text));
    }
    Some((Some(text[..end].parse().ok()?), &text[end..]))
}

/// Like [`render`], but falls back to `"<template> (format error: <reason>)"`.
#[must_use]
pub fn render_lossy(template: &str, args: &Args<'_>) -> String {
    match render(template, args) {
        Ok(message) => message,
        Err(err) => format!("{template} (format error: {err})"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use proptest::prelude::*;

    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn substitutes_in_order() {
        let port = 8080;
        let out = render("Server started on port {}", &[&port]).unwrap();
        assert_eq!(out, "Server started on port 8080");
    }

    #[test]
    fn explicit_indexes_can_repeat() {
        let out = render("{1}-{0}-{1}", &[&"a", &"b"]).unwrap();
        assert_eq!(out, "b-a-b");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let out = render("{{}} {} }}", &[&1]).unwrap();
        assert_eq!(out, "{} 1 }");
    }

    #[test]
    fn plain_text_without_args() {
        assert_eq!(render("no placeholders", &[]).unwrap(), "no placeholders");
        assert_eq!(render("", &[]).unwrap(), "");
    }

    #[test]
    fn too_few_arguments() {
        let err = render("{} and {}", &[&1]).unwrap_err();
        assert_eq!(err, TemplateError::MissingArgument { index: 1, given: 1 });
    }

    #[test]
    fn too_many_arguments() {
        let err = render("only {}", &[&1, &2, &3]).unwrap_err();
        assert_eq!(err, TemplateError::UnusedArguments { unused: 2, given: 3 });
    }

    #[test]
    fn unbalanced_braces() {
        assert_eq!(render("oops {", &[]), Err(TemplateError::UnbalancedBrace(5)));
        assert_eq!(render("oops }", &[]), Err(TemplateError::UnbalancedBrace(5)));
        assert_eq!(render("{{x} {", &[]), Err(TemplateError::UnbalancedBrace(3)));
    }

    #[test]
    fn unsupported_placeholder() {
        let err = render("{:?}", &[&1]).unwrap_err();
        assert_eq!(err, TemplateError::UnsupportedPlaceholder(":?".into()));
        for other in ["{:x}", "{:e}", "{:+}", "{:#}", "{:1$}", "{name}", "{:.}", "{:>5x}"] {
            assert!(
                matches!(render(other, &[&1]), Err(TemplateError::UnsupportedPlaceholder(_))),
                "{other}"
            );
        }
    }

    #[test]
    fn precision_is_applied() {
        assert_eq!(render("{:.2}", &[&1.23456_f64]).unwrap(), "1.23");
        assert_eq!(render("{:.3}", &[&"abcdef"]).unwrap(), "abc");
    }

    #[test]
    fn width_and_alignment() {
        assert_eq!(render("{:>5}", &[&"ab"]).unwrap(), "   ab");
        assert_eq!(render("{:<5}|", &[&"ab"]).unwrap(), "ab   |");
        assert_eq!(render("{:*^7}", &[&"ab"]).unwrap(), "**ab***");
        assert_eq!(render("{:->6.1}", &[&2.0_f64]).unwrap(), "---2.0");
    }

    #[test]
    fn width_alone_keeps_default_alignment() {
        assert_eq!(render("{:5}", &[&42]).unwrap(), "   42");
        assert_eq!(render("{:5}|", &[&"ab"]).unwrap(), "ab   |");
    }

    #[test]
    fn zero_padding_with_explicit_index() {
        assert_eq!(render("{1:03}-{0}", &[&"x", &7]).unwrap(), "007-x");
        assert_eq!(render("{0:08.3}", &[&-1.5_f64]).unwrap(), "-001.500");
    }

    #[test]
    fn failing_display_is_reported() {
        assert_eq!(render("{}", &[&Broken]), Err(TemplateError::Argument(0)));
        assert_eq!(render("{:>4}", &[&Broken]), Err(TemplateError::Argument(0)));
        assert_eq!(render("{:4}", &[&Broken]), Err(TemplateError::Argument(0)));
    }

    #[test]
    fn lossy_keeps_raw_template() {
        let out = render_lossy("user {} logged in from {}", &[&"bob"]);
        assert_eq!(
            out,
            "user {} logged in from {} (format error: missing argument 1, 1 given)"
        );
    }

    #[test]
    fn multibyte_text_survives() {
        let out = render("héllo {} wörld", &[&"ñ"]).unwrap();
        assert_eq!(out, "héllo ñ wörld");
    }

    proptest! {
        #[test]
        fn lossy_never_panics(template in ".*", a in any::<i64>(), b in ".*") {
            let _ = render_lossy(&template, &[&a, &b]);
        }

        #[test]
        fn brace_free_text_is_identity(text in "[^{}]*") {
            prop_assert_eq!(render(&text, &[]).unwrap(), text);
        }
    }
}
