//! Parsing of `table.function(arg, ...)` call expressions
//!
//! Only the literal subset the entry points need is understood: numbers,
//! double-quoted strings, `nil`, `true` and `false`.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{alpha1, alphanumeric1, char, multispace0};
use nom::combinator::{all_consuming, map, recognize};
use nom::multi::{many0_count, separated_list0};
use nom::number::complete::double;
use nom::sequence::{delimited, pair, separated_pair};
use nom::{IResult, Parser};
use std::fmt;

use crate::scripting::bridge::ScriptValue;
use crate::scripting::ScriptError;

/// A parsed call of a scripting function
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptCall {
    pub table: String,
    pub function: String,
    pub args: Vec<ScriptValue>,
}

impl ScriptCall {
    pub fn new(table: impl Into<String>, function: impl Into<String>, args: Vec<ScriptValue>) -> Self {
        Self {
            table: table.into(),
            function: function.into(),
            args,
        }
    }

    /// Parse a call such as `regional_supply.add_to_supply(1, 75)`
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        all_consuming(delimited(multispace0, call_expr, multispace0))
            .parse(source)
            .map(|(_, call)| call)
            .map_err(|e| ScriptError::Parse {
                source_text: source.to_string(),
                message: e.to_string(),
            })
    }

    /// `table.function`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.function)
    }
}

impl fmt::Display for ScriptCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.qualified_name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match arg {
                ScriptValue::Nil => write!(f, "nil")?,
                ScriptValue::Boolean(b) => write!(f, "{}", b)?,
                ScriptValue::Number(n) => write!(f, "{}", n)?,
                ScriptValue::String(s) => write!(f, "\"{}\"", s)?,
            }
        }
        write!(f, ")")
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn value(input: &str) -> IResult<&str, ScriptValue> {
    alt((
        map(tag("nil"), |_| ScriptValue::Nil),
        map(tag("true"), |_| ScriptValue::Boolean(true)),
        map(tag("false"), |_| ScriptValue::Boolean(false)),
        map(
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
            |s: &str| ScriptValue::String(s.to_string()),
        ),
        map(double, ScriptValue::Number),
    ))
    .parse(input)
}

fn argument(input: &str) -> IResult<&str, ScriptValue> {
    delimited(multispace0, value, multispace0).parse(input)
}

fn call_expr(input: &str) -> IResult<&str, ScriptCall> {
    let (input, (table, function)) =
        separated_pair(identifier, char('.'), identifier).parse(input)?;
    let (input, args) = delimited(
        pair(multispace0, char('(')),
        separated_list0(char(','), argument),
        pair(multispace0, char(')')),
    )
    .parse(input)?;

    Ok((input, ScriptCall::new(table, function, args)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mutator_call() {
        let call = ScriptCall::parse("regional_supply.add_to_demand(1, 50)").unwrap();
        assert_eq!(call.table, "regional_supply");
        assert_eq!(call.function, "add_to_demand");
        assert_eq!(
            call.args,
            vec![ScriptValue::Number(1.0), ScriptValue::Number(50.0)]
        );
    }

    #[test]
    fn test_parse_query_with_whitespace() {
        let call = ScriptCall::parse("  regional_supply.get_resource_quantity( 7 )  ").unwrap();
        assert_eq!(call.function, "get_resource_quantity");
        assert_eq!(call.args, vec![ScriptValue::Number(7.0)]);
    }

    #[test]
    fn test_parse_no_arguments() {
        let call = ScriptCall::parse("regional_supply.get_resource_quantity()").unwrap();
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_parse_literal_kinds() {
        let call = ScriptCall::parse(r#"t.f(nil, true, false, "ore", -2.5, 4294967296)"#).unwrap();
        assert_eq!(
            call.args,
            vec![
                ScriptValue::Nil,
                ScriptValue::Boolean(true),
                ScriptValue::Boolean(false),
                ScriptValue::String("ore".into()),
                ScriptValue::Number(-2.5),
                ScriptValue::Number(4294967296.0),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ScriptCall::parse("add_to_supply(1, 2)").is_err());
        assert!(ScriptCall::parse("regional_supply.add_to_supply(1, 2").is_err());
        assert!(ScriptCall::parse("regional_supply.add_to_supply(1 2)").is_err());
        assert!(ScriptCall::parse("regional_supply.add_to_supply(1, 2) extra").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let source = r#"regional_supply.add_to_supply(1, 75, "x", nil)"#;
        let call = ScriptCall::parse(source).unwrap();
        assert_eq!(call.to_string(), source);
        assert_eq!(ScriptCall::parse(&call.to_string()).unwrap(), call);
    }
}
