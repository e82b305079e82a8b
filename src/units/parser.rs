//! # 单位表达式解析器
//!
//! 递归下降解析器，把 `4 π ħ**2 ε_0 / (m_e e**2)`、`41 Å`、`cm²` 这类表达式
//! 求值为 `Quantity`。单位名称的解析交给调用方（注册表）。
//!
//! ## 语法
//! ```text
//! expr   := term (('*' | '·' | '/' | <并列>) term)*
//! term   := factor (('**' | '^') exponent | superscript)?
//! factor := '-' factor | number | identifier | '(' expr ')'
//! ```
//! 并列（空格分隔）等同于乘法，`*` 与 `/` 同优先级，左结合。
//!
//! ## 依赖关系
//! - 被 `units/registry.rs` 使用
//! - 使用 `units/quantity.rs`, `units/unit.rs`

use crate::error::{CslibError, Result};
use crate::units::quantity::Quantity;
use crate::units::unit::Unit;

/// 单位项允许的最大幂次（绝对值）
const MAX_POWER: i32 = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Mul,
    Div,
    Pow,
    Minus,
    Plus,
    LParen,
    RParen,
    Super(i32),
}

fn is_superscript(c: char) -> bool {
    matches!(
        c,
        '⁻' | '⁰' | '¹' | '²' | '³' | '⁴' | '⁵' | '⁶' | '⁷' | '⁸' | '⁹'
    )
}

fn superscript_digit(c: char) -> Option<char> {
    let d = match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        '⁻' => '-',
        _ => return None,
    };
    Some(d)
}

fn is_ident_start(c: char) -> bool {
    (c.is_alphabetic() || c == '_' || c == '°') && !is_superscript(c)
}

fn is_ident_continue(c: char) -> bool {
    (c.is_alphanumeric() || c == '_') && !is_superscript(c)
}

fn syntax_error(expr: &str, reason: impl Into<String>) -> CslibError {
    CslibError::UnitSyntax {
        expr: expr.to_string(),
        reason: reason.into(),
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // 数字：123, 1.5, .5, 2.5e-3
        let starts_number =
            c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()));
        if starts_number {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| syntax_error(expr, format!("invalid number '{}'", text)))?;
            tokens.push(Token::Number(value));
            continue;
        }

        if is_superscript(c) {
            let mut text = String::new();
            while i < chars.len() {
                match superscript_digit(chars[i]) {
                    Some(d) => text.push(d),
                    None => break,
                }
                i += 1;
            }
            let power = text
                .parse::<i32>()
                .map_err(|_| syntax_error(expr, format!("invalid superscript '{}'", text)))?;
            tokens.push(Token::Super(power));
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            i += 1;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let token = match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Pow
            }
            '*' | '·' | '×' => Token::Mul,
            '/' => Token::Div,
            '^' => Token::Pow,
            '-' => Token::Minus,
            '+' => Token::Plus,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => {
                return Err(syntax_error(
                    expr,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    resolve: &'a dyn Fn(&str) -> Result<Unit>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Quantity> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = self.bounded(&acc * &rhs)?;
                }
                Some(Token::Div) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = self.bounded(&acc / &rhs)?;
                }
                // 并列即乘法
                Some(Token::Number(_)) | Some(Token::Ident(_)) | Some(Token::LParen) => {
                    let rhs = self.term()?;
                    acc = self.bounded(&acc * &rhs)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<Quantity> {
        let base = self.factor()?;
        match self.peek() {
            Some(Token::Pow) => {
                self.pos += 1;
                let n = self.exponent()?;
                self.bounded(base.powi(n))
            }
            Some(Token::Super(n)) => {
                let n = *n;
                self.pos += 1;
                self.bounded(base.powi(n))
            }
            _ => Ok(base),
        }
    }

    /// 任一单位项的幂超过 `MAX_POWER` 即报错
    fn bounded(&self, q: Quantity) -> Result<Quantity> {
        match q.units().terms().iter().find(|(_, p)| p.abs() > MAX_POWER) {
            Some((t, p)) => Err(syntax_error(
                self.expr,
                format!("power {} of '{}' exceeds the limit of {}", p, t.name, MAX_POWER),
            )),
            None => Ok(q),
        }
    }

    fn exponent(&mut self) -> Result<i32> {
        match self.next() {
            Some(Token::Minus) => Ok(-self.exponent()?),
            Some(Token::Plus) => self.exponent(),
            Some(Token::Number(n)) => integer_power(self.expr, n),
            Some(Token::LParen) => {
                let n = self.exponent()?;
                match self.next() {
                    Some(Token::RParen) => Ok(n),
                    _ => Err(syntax_error(self.expr, "expected ')' after exponent")),
                }
            }
            _ => Err(syntax_error(self.expr, "expected exponent")),
        }
    }

    fn factor(&mut self) -> Result<Quantity> {
        match self.next() {
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::Number(n)) => Ok(Quantity::dimensionless(n)),
            Some(Token::Ident(name)) => Ok(Quantity::new(1.0, (self.resolve)(&name)?)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(syntax_error(self.expr, "unbalanced parentheses")),
                }
            }
            Some(t) => Err(syntax_error(self.expr, format!("unexpected token {:?}", t))),
            None => Err(syntax_error(self.expr, "unexpected end of expression")),
        }
    }
}

fn integer_power(expr: &str, n: f64) -> Result<i32> {
    if n.fract() != 0.0 {
        return Err(syntax_error(
            expr,
            format!("only integer powers are supported, got {}", n),
        ));
    }
    if n.abs() > MAX_POWER as f64 {
        return Err(syntax_error(
            expr,
            format!("power {} exceeds the limit of {}", n, MAX_POWER),
        ));
    }
    Ok(n as i32)
}

/// 求值单位表达式；空表达式为无量纲 1
pub(crate) fn evaluate(expr: &str, resolve: &dyn Fn(&str) -> Result<Unit>) -> Result<Quantity> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Ok(Quantity::dimensionless(1.0));
    }

    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
        resolve,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(syntax_error(
            expr,
            format!("unexpected token {:?}", parser.tokens[parser.pos]),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::dimension::{BaseDimension, Dimensionality};
    use crate::units::unit::UnitTerm;

    fn resolve(name: &str) -> Result<Unit> {
        let (factor, dim) = match name {
            "m" => (1.0, BaseDimension::Length),
            "cm" => (0.01, BaseDimension::Length),
            "s" => (1.0, BaseDimension::Time),
            _ => {
                return Err(CslibError::UndefinedUnit {
                    name: name.to_string(),
                })
            }
        };
        Ok(Unit::from_term(UnitTerm {
            name: name.to_string(),
            symbol: name.to_string(),
            factor,
            dimensionality: Dimensionality::base(dim),
        }))
    }

    #[test]
    fn test_tokenize_superscript() {
        let tokens = tokenize("cm²").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Ident("cm".to_string()), Token::Super(2)]
        );
        let tokens = tokenize("s⁻¹").unwrap();
        assert_eq!(tokens[1], Token::Super(-1));
    }

    #[test]
    fn test_number_exponent_not_confused_with_ident() {
        let tokens = tokenize("2.5e-3 m").unwrap();
        assert_eq!(tokens[0], Token::Number(2.5e-3));
        let tokens = tokenize("2 e").unwrap();
        assert_eq!(tokens[1], Token::Ident("e".to_string()));
    }

    #[test]
    fn test_juxtaposition_and_division() {
        let q = evaluate("3 m / 2 s", &resolve).unwrap();
        // (3 m / 2) s 左结合
        assert!((q.magnitude() - 1.5).abs() < 1e-12);
        assert_eq!(
            q.dimensionality(),
            Dimensionality::base(BaseDimension::Length) * Dimensionality::base(BaseDimension::Time)
        );

        let q = evaluate("3 m / (2 s)", &resolve).unwrap();
        assert_eq!(q.units().abbreviated(), "m / s");
    }

    #[test]
    fn test_powers() {
        let q = evaluate("2 cm**2", &resolve).unwrap();
        let length = Dimensionality::base(BaseDimension::Length);
        assert_eq!(q.dimensionality(), length.powi(2));
        let q = evaluate("m^-1", &resolve).unwrap();
        assert_eq!(q.dimensionality(), length.powi(-1));
        assert!(evaluate("m**0.5", &resolve).is_err());
    }

    #[test]
    fn test_huge_powers_rejected() {
        for expr in ["(m**2000000000)**2", "m**65", "((m**8)**8)**8", "(m**40) (m**40)"] {
            assert!(
                matches!(evaluate(expr, &resolve), Err(CslibError::UnitSyntax { .. })),
                "{}",
                expr
            );
        }
        let q = evaluate("(m**8)**8 / s**64", &resolve).unwrap();
        assert_eq!(q.units().abbreviated(), "m ** 64 / s ** 64");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            evaluate("3 parsec", &resolve),
            Err(CslibError::UndefinedUnit { .. })
        ));
        assert!(matches!(
            evaluate("(m", &resolve),
            Err(CslibError::UnitSyntax { .. })
        ));
        assert!(matches!(
            evaluate("m $", &resolve),
            Err(CslibError::UnitSyntax { .. })
        ));
    }

    #[test]
    fn test_empty_is_one() {
        let q = evaluate("  ", &resolve).unwrap();
        assert_eq!(q.magnitude(), 1.0);
        assert!(q.units().is_unitless());
    }
}
