extern crate combine;

use combine::parser::char::string;
use combine::{any, attempt, choice, eof, many1, optional, satisfy, skip_many, skip_many1, token};
use combine::{EasyParser, Parser, Stream};

/// Shape of an input line before keywords are looked at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `$name <= text`
    Store { name: String, value: String },
    /// `$name = expression`
    Assign { name: String, expression: String },
    /// A first word and whatever follows it.
    Words { head: String, rest: Option<String> },
}

impl Shape {
    pub fn parse<I: Stream<Token = char>>() -> impl Parser<I, Output = Self> {
        choice((attempt(binding()), words())).skip(eof())
    }
}

pub fn parse_shape(input: &str) -> Option<Shape> {
    match Shape::parse().easy_parse(input) {
        Ok((shape, _)) => Some(shape),
        Err(_) => None,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn blanks<I: Stream<Token = char>>() -> impl Parser<I, Output = ()> {
    skip_many(satisfy(char::is_whitespace))
}

fn rest<I: Stream<Token = char>>() -> impl Parser<I, Output = String> {
    many1(any())
}

fn binding<I: Stream<Token = char>>() -> impl Parser<I, Output = Shape> {
    (
        token('$').with(many1(satisfy(is_name_char))),
        blanks(),
        choice((attempt(string("<=")), string("="))),
        blanks(),
        rest(),
    )
        .map(|(name, _, op, _, value): (String, _, _, _, String)| match op {
            "<=" => Shape::Store { name, value },
            _ => Shape::Assign {
                name,
                expression: value,
            },
        })
}

fn words<I: Stream<Token = char>>() -> impl Parser<I, Output = Shape> {
    (
        many1(satisfy(|c: char| !c.is_whitespace())),
        optional(skip_many1(satisfy(char::is_whitespace)).with(rest())),
    )
        .map(|(head, rest)| Shape::Words { head, rest })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(head: &str, rest: Option<&str>) -> Option<Shape> {
        Some(Shape::Words {
            head: head.to_string(),
            rest: rest.map(String::from),
        })
    }

    #[test]
    fn single_word() {
        assert_eq!(parse_shape("list"), words("list", None));
    }

    #[test]
    fn word_with_rest() {
        assert_eq!(parse_shape("save  my file"), words("save", Some("my file")));
    }

    #[test]
    fn raw_store() {
        assert_eq!(
            parse_shape("$x <= 42"),
            Some(Shape::Store {
                name: "x".into(),
                value: "42".into()
            })
        );
        assert_eq!(
            parse_shape("$rate<=1 + 2"),
            Some(Shape::Store {
                name: "rate".into(),
                value: "1 + 2".into()
            })
        );
    }

    #[test]
    fn evaluated_assign() {
        assert_eq!(
            parse_shape("$radius = 5 feet in meters"),
            Some(Shape::Assign {
                name: "radius".into(),
                expression: "5 feet in meters".into()
            })
        );
    }

    #[test]
    fn assign_keeps_extra_equals() {
        assert_eq!(
            parse_shape("$a == 1"),
            Some(Shape::Assign {
                name: "a".into(),
                expression: "= 1".into()
            })
        );
    }

    #[test]
    fn comparison_is_not_a_binding() {
        assert_eq!(parse_shape("$a < 5"), words("$a", Some("< 5")));
    }

    #[test]
    fn binding_needs_a_value() {
        assert_eq!(parse_shape("$a ="), words("$a", Some("=")));
    }

    #[test]
    fn invalid_name_is_not_a_binding() {
        assert_eq!(parse_shape("$a-b = 1"), words("$a-b", Some("= 1")));
    }

    #[test]
    fn empty_line_has_no_shape() {
        assert_eq!(parse_shape(""), None);
    }
}
