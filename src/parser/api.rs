use std::time::Instant;

use num_bigint::BigInt;
use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use tracing::trace;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/calc_grammar.pest"] // relative to src
pub struct GuestParser;

const TAB_WIDTH: usize = 2;

/// Renders the raw token tree, one pair per line.
pub fn parse_to_token_tree(source: &str) -> Result<String, String> {
    let mut tree = vec![];
    let result = GuestParser::parse(Rule::program, source);
    match result {
        Ok(pairs) => {
            for pair in pairs {
                tree.push(pair_to_string(pair, 0).join("\n"));
            }
        }
        Err(rule) => {
            return Err(format!("Parse error due to {:?}", rule));
        }
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    tree.push(format!("{}{}", " ".repeat(level * TAB_WIDTH), rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

pub fn parse_to_pairs(source: &str) -> Result<Pairs<Rule>, Error<Rule>> {
    GuestParser::parse(Rule::program, source)
}

pub fn parse_to_ast(source: &str) -> Result<Expr, Error<Rule>> {
    let start = Instant::now();
    let mut pairs = GuestParser::parse(Rule::program, source)?;
    let program = pairs.next().unwrap();
    let expression = program.into_inner().next().unwrap();
    let ast = build_ast_from_expression(expression)?;
    trace!(
        micros = start.elapsed().as_micros() as u64,
        "parsed calc source"
    );
    Ok(ast)
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn build_ast_from_expression(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    match pair.as_rule() {
        Rule::expression => {
            let inner = pair.into_inner().next().unwrap();
            build_ast_from_expression(inner)
        }
        Rule::comparison => build_ast_from_binary_chain(pair, build_ast_from_sum),
        _ => Err(get_unexpected_error(1, &pair)),
    }
}

fn build_ast_from_sum(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    build_ast_from_binary_chain(pair, build_ast_from_product)
}

fn build_ast_from_product(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    build_ast_from_binary_chain(pair, build_ast_from_unary)
}

/// Folds `operand (op operand)*` left-associatively.
fn build_ast_from_binary_chain(
    pair: Pair<Rule>,
    operand: fn(Pair<Rule>) -> Result<Expr, Error<Rule>>,
) -> Result<Expr, Error<Rule>> {
    let mut pair_iter = pair.into_inner();
    let first = pair_iter.next().unwrap();
    let mut left = operand(first)?;
    while let Some(op_pair) = pair_iter.next() {
        let op = match BinaryOp::from_symbol(op_pair.as_str()) {
            Some(op) => op,
            None => return Err(get_unexpected_error(2, &op_pair)),
        };
        let right_pair = pair_iter.next().unwrap();
        let right = operand(right_pair)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn build_ast_from_unary(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    let mut negations = 0;
    let mut operand = None;
    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::negate => negations += 1,
            Rule::postfix => operand = Some(build_ast_from_postfix(inner_pair)?),
            _ => return Err(get_unexpected_error(3, &inner_pair)),
        }
    }
    let mut expr = operand.unwrap();
    for _ in 0..negations {
        expr = match expr {
            Expr::Integer(i) if i != i64::MIN => Expr::Integer(-i),
            Expr::Float(f) => Expr::Float(-f),
            other => Expr::Negate(Box::new(other)),
        };
    }
    Ok(expr)
}

fn build_ast_from_postfix(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    let mut pair_iter = pair.into_inner();
    let mut expr = build_ast_from_primary(pair_iter.next().unwrap())?;
    for suffix in pair_iter {
        expr = match suffix.as_rule() {
            Rule::call_suffix => Expr::Call {
                callee: Box::new(expr),
                args: get_arguments(suffix)?,
            },
            Rule::member_suffix => {
                let mut member_iter = suffix.into_inner();
                let name = member_iter.next().unwrap().as_str().to_string();
                match member_iter.next() {
                    Some(call) => Expr::Invoke {
                        object: Box::new(expr),
                        name,
                        args: get_arguments(call)?,
                    },
                    None => Expr::Member {
                        object: Box::new(expr),
                        name,
                    },
                }
            }
            Rule::index_suffix => {
                let index = suffix.into_inner().next().unwrap();
                Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(build_ast_from_expression(index)?),
                }
            }
            _ => return Err(get_unexpected_error(4, &suffix)),
        };
    }
    Ok(expr)
}

fn get_arguments(pair: Pair<Rule>) -> Result<Vec<Expr>, Error<Rule>> {
    pair.into_inner().map(build_ast_from_expression).collect()
}

fn build_ast_from_primary(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    Ok(match pair.as_rule() {
        Rule::integer => match pair.as_str().parse::<i64>() {
            Ok(i) => Expr::Integer(i),
            Err(_) => match pair.as_str().parse::<BigInt>() {
                Ok(b) => Expr::BigInteger(b),
                Err(_) => return Err(get_unexpected_error(5, &pair)),
            },
        },
        Rule::float => match pair.as_str().parse::<f64>() {
            Ok(f) => Expr::Float(f),
            Err(_) => return Err(get_unexpected_error(6, &pair)),
        },
        Rule::string => Expr::Str(unescape(pair.into_inner().next().unwrap().as_str())),
        Rule::boolean => Expr::Boolean(pair.as_str() == "true"),
        Rule::null => Expr::Null,
        Rule::identifier => Expr::Identifier(pair.as_str().to_string()),
        Rule::array => Expr::Array(get_arguments(pair)?),
        Rule::object => {
            let mut properties = vec![];
            for property in pair.into_inner() {
                let mut property_iter = property.into_inner();
                let key_pair = property_iter.next().unwrap();
                let key = match key_pair.as_rule() {
                    Rule::string => unescape(key_pair.into_inner().next().unwrap().as_str()),
                    _ => key_pair.as_str().to_string(),
                };
                let value = build_ast_from_expression(property_iter.next().unwrap())?;
                properties.push((key, value));
            }
            Expr::Object(properties)
        }
        Rule::expression => build_ast_from_expression(pair)?,
        _ => return Err(get_unexpected_error(7, &pair)),
    })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
