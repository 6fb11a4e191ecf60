//! Type shorthand parser using nom.
//!
//! Schema files may spell a column type the way it reads in SQL:
//!
//! ```text
//! DECIMAL(10,2)
//! ───┬─── ─┬ ┬
//!    │     │ └── scale
//!    │     └── size
//!    └── logical type
//! ```

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0},
    combinator::{map_res, opt},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::{DdlError, DdlResult};
use crate::model::LogicalType;

/// A parsed type shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub logical_type: LogicalType,
    pub size: Option<u32>,
    pub scale: Option<u32>,
}

/// Parse a type shorthand such as `VARCHAR(255)` or `DOUBLE(3, 2)`.
pub fn parse_type_spec(input: &str) -> DdlResult<TypeSpec> {
    let input = input.trim();

    match type_spec(input) {
        Ok(("", (name, dims))) => {
            let logical_type = name.parse::<LogicalType>()?;
            let (size, scale) = match dims {
                Some((size, scale)) => (Some(size), scale),
                None => (None, None),
            };
            Ok(TypeSpec {
                logical_type,
                size,
                scale,
            })
        }
        Ok((remaining, _)) => Err(DdlError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(DdlError::parse(0, format!("Parse failed: {:?}", e))),
    }
}

fn type_spec(input: &str) -> IResult<&str, (&str, Option<(u32, Option<u32>)>)> {
    pair(type_name, opt(preceded(multispace0, dimensions)))(input)
}

fn type_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// `(size)` or `(size,scale)`.
fn dimensions(input: &str) -> IResult<&str, (u32, Option<u32>)> {
    delimited(
        char('('),
        pair(ws(number), opt(preceded(char(','), ws(number)))),
        char(')'),
    )(input)
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}
