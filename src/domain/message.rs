use super::value::Value;
use std::borrow::Cow;
use std::fmt::{self, Write as _};

/// Rendered in place of a `{}` placeholder that has no argument.
pub const MISSING_ARGUMENT: &str = "<missing>";

/// The message part of a log call.
///
/// Each variant is one calling convention: verbatim text, a compile-time template
/// (`format_args!`), or a runtime template with typed arguments.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    /// Preformatted text. Never subject to placeholder substitution.
    Text(&'a str),
    /// Template and arguments checked at compile time.
    Formatted(fmt::Arguments<'a>),
    /// Runtime template with `{}` placeholders and `{{`/`}}` escapes.
    Template {
        template: &'a str,
        args: &'a [Value],
    },
}

impl<'a> Message<'a> {
    pub fn template(template: &'a str, args: &'a [Value]) -> Self {
        Message::Template { template, args }
    }

    pub fn render(&self) -> Cow<'a, str> {
        match *self {
            Message::Text(text) => Cow::Borrowed(text),
            Message::Formatted(args) => match args.as_str() {
                Some(text) => Cow::Borrowed(text),
                None => Cow::Owned(args.to_string()),
            },
            Message::Template { template, args } => Cow::Owned(render_template(template, args)),
        }
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(text: &'a str) -> Self {
        Message::Text(text)
    }
}

impl<'a> From<&'a String> for Message<'a> {
    fn from(text: &'a String) -> Self {
        Message::Text(text.as_str())
    }
}

impl<'a> From<fmt::Arguments<'a>> for Message<'a> {
    fn from(args: fmt::Arguments<'a>) -> Self {
        Message::Formatted(args)
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Substitutes `{}` placeholders left to right.
///
/// Placeholders without an argument render [`MISSING_ARGUMENT`]; surplus arguments are
/// appended, each preceded by a single space. A lone `{` or `}` is kept as-is.
pub fn render_template(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut args_iter = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' if chars.peek() == Some(&'}') => {
                chars.next();
                match args_iter.next() {
                    Some(arg) => {
                        let _ = write!(out, "{arg}");
                    }
                    None => out.push_str(MISSING_ARGUMENT),
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            other => out.push(other),
        }
    }

    for extra in args_iter {
        let _ = write!(out, " {extra}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_verbatim() {
        let msg = Message::from("100% done {} {{braces}}");
        assert_eq!(msg.render(), "100% done {} {{braces}}");
    }

    #[test]
    fn test_formatted_matches_format_macro() {
        let user = "bob";
        let count = 3;
        assert_eq!(
            Message::from(format_args!("user {user} logged in {count} times")).render(),
            format!("user {user} logged in {count} times")
        );
    }

    #[test]
    fn test_formatted_literal_is_borrowed() {
        assert!(matches!(
            Message::from(format_args!("static text")).render(),
            Cow::Borrowed("static text")
        ));
    }

    #[test]
    fn test_template_matches_format_macro() {
        let args = [Value::from("bob"), Value::from(3), Value::from(2.5)];
        let rendered = Message::template("user {} logged in {} times, avg {}", &args).render();
        assert_eq!(
            rendered,
            format!("user {} logged in {} times, avg {}", "bob", 3, 2.5)
        );
    }

    #[test]
    fn test_template_escapes() {
        let args = [Value::from(1)];
        assert_eq!(render_template("{{}} {} {{x}}", &args), format!("{{}} {} {{x}}", 1));
    }

    #[test]
    fn test_template_missing_argument() {
        assert_eq!(render_template("a {} b {}", &[Value::from(1)]), "a 1 b <missing>");
    }

    #[test]
    fn test_template_surplus_arguments_appended() {
        let args = [Value::from("x"), Value::from(2), Value::from(true)];
        assert_eq!(render_template("got {}", &args), "got x 2 true");
    }

    #[test]
    fn test_template_lone_braces_kept() {
        assert_eq!(render_template("a { b } c", &[]), "a { b } c");
    }

    #[test]
    fn test_template_unicode() {
        let args = [Value::from("世界")];
        assert_eq!(render_template("こんにちは {}!", &args), "こんにちは 世界!");
    }
}
