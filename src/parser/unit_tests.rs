use super::api::{parse_to_ast, parse_to_token_tree, GuestParser, Rule};
use super::ast::{BinaryOp, Expr};

use pest::consumes_to;
use pest::parses_to;
use pest::Parser;

fn ident(name: &str) -> Box<Expr> {
    Box::new(Expr::Identifier(name.to_string()))
}

#[test]
fn test_integer_literal() {
    parses_to! {
        parser: GuestParser,
        input: "10",
        rule: Rule::integer,
        tokens: [
            integer(0, 2)
        ]
    };
}

#[test]
fn test_float_literal() {
    parses_to! {
        parser: GuestParser,
        input: "10.25",
        rule: Rule::float,
        tokens: [
            float(0, 5)
        ]
    };
}

#[test]
fn test_member_invocation_tokens() {
    parses_to! {
        parser: GuestParser,
        input: "a.b(1)",
        rule: Rule::postfix,
        tokens: [
            postfix(0, 6, [
                identifier(0, 1),
                member_suffix(1, 6, [
                    identifier(2, 3),
                    call_suffix(3, 6, [
                        expression(4, 5, [
                            comparison(4, 5, [
                                sum(4, 5, [
                                    product(4, 5, [
                                        unary(4, 5, [
                                            postfix(4, 5, [
                                                integer(4, 5)
                                            ])
                                        ])
                                    ])
                                ])
                            ])
                        ])
                    ])
                ])
            ])
        ]
    };
}

#[test]
fn test_keyword_is_not_identifier() {
    assert!(GuestParser::parse(Rule::identifier, "null").is_err());
    parses_to! {
        parser: GuestParser,
        input: "nullable",
        rule: Rule::identifier,
        tokens: [
            identifier(0, 8)
        ]
    };
}

#[test]
fn test_precedence() {
    let ast = parse_to_ast("x + 2 * y").unwrap();
    assert_eq!(
        ast,
        Expr::Binary {
            op: BinaryOp::Add,
            left: ident("x"),
            right: Box::new(Expr::Binary {
                op: BinaryOp::Mul,
                left: Box::new(Expr::Integer(2)),
                right: ident("y"),
            }),
        }
    );
}

#[test]
fn test_left_associative_subtraction() {
    let ast = parse_to_ast("10 - 3 - 2").unwrap();
    match ast {
        Expr::Binary {
            op: BinaryOp::Sub,
            left,
            right,
        } => {
            assert_eq!(*right, Expr::Integer(2));
            assert!(matches!(*left, Expr::Binary { op: BinaryOp::Sub, .. }));
        }
        other => panic!("Unexpected ast {:?}", other),
    }
}

#[test]
fn test_negative_literal_folds() {
    assert_eq!(parse_to_ast("-5").unwrap(), Expr::Integer(-5));
    assert_eq!(
        parse_to_ast("-x").unwrap(),
        Expr::Negate(ident("x"))
    );
}

#[test]
fn test_postfix_chain() {
    let ast = parse_to_ast("p.items[0].name").unwrap();
    assert_eq!(
        ast,
        Expr::Member {
            object: Box::new(Expr::Index {
                object: Box::new(Expr::Member {
                    object: ident("p"),
                    name: "items".to_string(),
                }),
                index: Box::new(Expr::Integer(0)),
            }),
            name: "name".to_string(),
        }
    );
}

#[test]
fn test_call_and_invoke() {
    assert_eq!(
        parse_to_ast("f(1, 2)").unwrap(),
        Expr::Call {
            callee: ident("f"),
            args: vec![Expr::Integer(1), Expr::Integer(2)],
        }
    );
    assert_eq!(
        parse_to_ast("o.m()").unwrap(),
        Expr::Invoke {
            object: ident("o"),
            name: "m".to_string(),
            args: vec![],
        }
    );
}

#[test]
fn test_object_and_array_literals() {
    let ast = parse_to_ast(r#"{a: [1, 2.5], "b c": "x\"y", d: null}"#).unwrap();
    assert_eq!(
        ast,
        Expr::Object(vec![
            (
                "a".to_string(),
                Expr::Array(vec![Expr::Integer(1), Expr::Float(2.5)])
            ),
            ("b c".to_string(), Expr::Str("x\"y".to_string())),
            ("d".to_string(), Expr::Null),
        ])
    );
}

#[test]
fn test_big_integer_literal() {
    let ast = parse_to_ast("123456789012345678901234567890").unwrap();
    assert!(matches!(ast, Expr::BigInteger(_)));
}

#[test]
fn test_comparison_is_not_chainable() {
    assert!(parse_to_ast("1 < 2 < 3").is_err());
}

#[test]
fn test_incomplete_input() {
    assert!(parse_to_ast("1 +").is_err());
    assert!(parse_to_ast("").is_err());
}

#[test]
fn test_identifiers_in_order() {
    let ast = parse_to_ast("a + b.m(c, a)").unwrap();
    assert_eq!(ast.identifiers(), vec!["a", "b", "c", "a"]);
}

#[test]
fn test_token_tree_rendering() {
    let tree = parse_to_token_tree("1").unwrap();
    assert!(tree.starts_with("program => (0,1)"));
    assert!(tree.contains("integer => (0,1)"));
}
