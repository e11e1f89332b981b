use crate::SurfError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Identifier(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }
}

/// Token plus the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn lex(input: &str) -> Result<Vec<Spanned>, SurfError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;
        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                pos += 1;
                continue;
            }
            b'+' => Token::Operator(Operator::Add),
            b'-' => Token::Operator(Operator::Sub),
            b'*' => Token::Operator(Operator::Mul),
            b'/' => Token::Operator(Operator::Div),
            b'^' => Token::Operator(Operator::Pow),
            b'(' => Token::LeftParen,
            b')' => Token::RightParen,
            b',' => Token::Comma,
            b'0'..=b'9' | b'.' => {
                pos = scan_number(bytes, pos);
                let text = &input[start..pos];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| SurfError::parse(format!("invalid number '{text}'"), start))?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    position: start,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                tokens.push(Spanned {
                    token: Token::Identifier(input[start..pos].to_string()),
                    position: start,
                });
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(SurfError::parse(format!("unexpected character '{ch}'"), start));
            }
        };
        tokens.push(Spanned {
            token,
            position: start,
        });
        pos += 1;
    }

    Ok(tokens)
}

/// Digits, optional fraction, optional exponent
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut look = pos + 1;
        if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
            look += 1;
        }
        if look < bytes.len() && bytes[look].is_ascii_digit() {
            pos = look;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(kinds("0.5"), vec![Token::Number(0.5)]);
        assert_eq!(kinds("1e-3"), vec![Token::Number(1e-3)]);
        // `e` without digits is an identifier, not an exponent
        assert_eq!(
            kinds("2e"),
            vec![Token::Number(2.0), Token::Identifier("e".to_string())]
        );
    }

    #[test]
    fn test_lex_expression() {
        assert_eq!(
            kinds("a*x^2 - atan2(b,1)"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Operator(Operator::Mul),
                Token::Identifier("x".to_string()),
                Token::Operator(Operator::Pow),
                Token::Number(2.0),
                Token::Operator(Operator::Sub),
                Token::Identifier("atan2".to_string()),
                Token::LeftParen,
                Token::Identifier("b".to_string()),
                Token::Comma,
                Token::Number(1.0),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_lex_rejects_unknown_character() {
        let err = lex("x # y").unwrap_err();
        assert_eq!(err, SurfError::parse("unexpected character '#'", 2));
    }
}
