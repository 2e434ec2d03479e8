//! Recursive-descent parser for Whirl.
//!
//! The parser pulls tokens from the [`Lexer`] on demand and yields one
//! top-level [`Instruction`] per call. There is no error recovery: the
//! first unmet expectation is returned and the iterator stops.
//!
//! Expressions are not turned into a precedence tree. An expression is a
//! captured run of operands and operator tokens that the C compiler
//! re-parses with its own precedence rules.

use crate::ast::{
    Argument, Expr, FieldInit, Instruction, Path, Procedure, ProcedureCall, StructInit, Type,
};
use crate::error::CoreError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Where an instruction is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    TopLevel,
    Block,
}

/// Whether an expression sits directly inside a call's argument list,
/// where an unmatched `)` closes the list instead of being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Statement,
    Argument,
}

pub struct Parser<'src> {
    tokens: Lexer<'src>,
    failed: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            tokens: Lexer::new(source),
            failed: false,
        }
    }

    /// Parse the next top-level instruction, or `None` once only `Eof`
    /// remains.
    pub fn next_instruction(&mut self) -> Result<Option<Instruction>, CoreError> {
        if self.peek_kind()? == TokenKind::Eof {
            return Ok(None);
        }
        self.parse_instruction(Level::TopLevel).map(Some)
    }

    fn parse_instruction(&mut self, level: Level) -> Result<Instruction, CoreError> {
        match self.peek_kind()? {
            TokenKind::Proc if level == Level::TopLevel => self.parse_procedure(),
            TokenKind::Import if level == Level::TopLevel => self.parse_import(),
            TokenKind::Let => self.parse_assignment(),
            TokenKind::If => self.parse_if(),
            TokenKind::Until => self.parse_until(),
            TokenKind::Iter => self.parse_iter(),
            TokenKind::Break => {
                self.expect(TokenKind::Break)?;
                self.expect(TokenKind::Semi)?;
                Ok(Instruction::Break)
            }
            TokenKind::Continue => {
                self.expect(TokenKind::Continue)?;
                self.expect(TokenKind::Semi)?;
                Ok(Instruction::Continue)
            }
            TokenKind::Escape => {
                self.expect(TokenKind::Escape)?;
                let expr = self.parse_expr(Nesting::Statement)?;
                self.expect(TokenKind::Semi)?;
                Ok(Instruction::Escape(expr))
            }
            TokenKind::Struct => self.parse_struct(),
            TokenKind::Ident => self.parse_ident_statement(),
            _ => Err(self.unexpected_here(match level {
                Level::TopLevel => "instruction",
                Level::Block => "statement",
            })),
        }
    }

    fn parse_procedure(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Proc)?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let args = self.parse_list(TokenKind::RParen, Self::parse_argument)?;
        self.expect(TokenKind::DoubleColon)?;
        let return_type = self.parse_type()?;
        let body = self.parse_body()?;

        Ok(Instruction::Procedure(Procedure {
            ident,
            args,
            return_type,
            body,
        }))
    }

    fn parse_argument(&mut self) -> Result<Argument, CoreError> {
        let ident = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Argument { ident, ty })
    }

    fn parse_body(&mut self) -> Result<Vec<Instruction>, CoreError> {
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.eat(TokenKind::RBrace)? {
            body.push(self.parse_instruction(Level::Block)?);
        }
        Ok(body)
    }

    fn parse_assignment(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Let)?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Equal)?;

        let expr = match &ty {
            Type::Ident(name) => {
                let position = self.tokens.peek()?.position;
                let init = self.parse_struct_init()?;
                if init.ident != *name {
                    return Err(CoreError::StructMismatch {
                        expected: name.clone(),
                        found: init.ident,
                        position,
                    });
                }
                Expr::StructInit(init)
            }
            _ => self.parse_expr(Nesting::Statement)?,
        };
        self.expect(TokenKind::Semi)?;

        Ok(Instruction::Assignment { ident, ty, expr })
    }

    fn parse_if(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expr(Nesting::Statement)?;
        let body = self.parse_body()?;

        let else_body = if !self.eat(TokenKind::Else)? {
            Vec::new()
        } else if self.peek_kind()? == TokenKind::If {
            vec![self.parse_if()?]
        } else {
            self.parse_body()?
        };

        Ok(Instruction::If {
            condition,
            body,
            else_body,
        })
    }

    fn parse_until(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Until)?;
        let condition = self.parse_expr(Nesting::Statement)?;
        let body = self.parse_body()?;
        Ok(Instruction::Until { condition, body })
    }

    fn parse_iter(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Iter)?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::In)?;
        let lower = self.parse_expr(Nesting::Statement)?;
        self.expect(TokenKind::Colon)?;
        let upper = self.parse_expr(Nesting::Statement)?;
        let body = self.parse_body()?;

        Ok(Instruction::Iter {
            ident,
            lower,
            upper,
            body,
        })
    }

    /// `struct <path> { <ident> : <type> , ... }`; every field, the last
    /// one included, is followed by a comma.
    fn parse_struct(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Struct)?;
        let path = self.parse_path()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.eat(TokenKind::RBrace)? {
            fields.push(self.parse_argument()?);
            self.expect(TokenKind::Comma)?;
        }

        Ok(Instruction::Struct { path, fields })
    }

    fn parse_struct_init(&mut self) -> Result<StructInit, CoreError> {
        self.expect(TokenKind::Struct)?;
        let ident = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.eat(TokenKind::RBrace)? {
            let field = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            let expr = self.parse_expr(Nesting::Statement)?;
            self.expect(TokenKind::Comma)?;
            fields.push(FieldInit { ident: field, expr });
        }

        Ok(StructInit { ident, fields })
    }

    fn parse_import(&mut self) -> Result<Instruction, CoreError> {
        self.expect(TokenKind::Import)?;
        let path = self.expect(TokenKind::StringLiteral)?;
        let alias = if self.eat(TokenKind::As)? {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        Ok(Instruction::Import {
            path: unquote(&path.value).to_string(),
            alias,
        })
    }

    /// A statement led by a path: either a call or a reassignment.
    fn parse_ident_statement(&mut self) -> Result<Instruction, CoreError> {
        let path = self.parse_path()?;

        let instruction = match self.peek_kind()? {
            TokenKind::LParen => Instruction::Call(self.parse_call(path)?),
            TokenKind::LBracket | TokenKind::Equal => {
                let mut indices = Vec::new();
                while self.eat(TokenKind::LBracket)? {
                    indices.push(self.parse_expr(Nesting::Statement)?);
                    self.expect(TokenKind::RBracket)?;
                }
                self.expect(TokenKind::Equal)?;
                let expr = self.parse_expr(Nesting::Statement)?;
                Instruction::Reassign {
                    target: path,
                    indices,
                    expr,
                }
            }
            _ => return Err(self.unexpected_here("'(' or '='")),
        };
        self.expect(TokenKind::Semi)?;

        Ok(instruction)
    }

    fn parse_call(&mut self, path: Path) -> Result<ProcedureCall, CoreError> {
        self.expect(TokenKind::LParen)?;
        let args = self.parse_list(TokenKind::RParen, |parser| {
            parser.parse_expr(Nesting::Argument)
        })?;
        Ok(ProcedureCall { path, args })
    }

    fn parse_path(&mut self) -> Result<Path, CoreError> {
        let mut path = Path::new(self.expect_ident()?);
        while self.eat(TokenKind::DoubleColon)? {
            path.push(self.expect_ident()?);
        }
        Ok(path)
    }

    fn parse_type(&mut self) -> Result<Type, CoreError> {
        let token = self.tokens.next_token()?;
        let mut ty = match token.kind {
            TokenKind::Int => Type::Int,
            TokenKind::String => Type::String,
            TokenKind::Bool => Type::Bool,
            TokenKind::Char => Type::Char,
            TokenKind::Void => Type::Void,
            TokenKind::Ident => Type::Ident(token.value),
            _ => return Err(unexpected("type", &token)),
        };
        while self.eat(TokenKind::LBracket)? {
            self.expect(TokenKind::RBracket)?;
            ty = Type::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_expr(&mut self, nesting: Nesting) -> Result<Expr, CoreError> {
        match self.peek_kind()? {
            TokenKind::LBracket => {
                self.expect(TokenKind::LBracket)?;
                let items = self.parse_list(TokenKind::RBracket, |parser| {
                    parser.parse_expr(Nesting::Statement)
                })?;
                return Ok(Expr::Array(items));
            }
            TokenKind::Struct => return Ok(Expr::StructInit(self.parse_struct_init()?)),
            _ => {}
        }

        let mut parts = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.tokens.peek()?.clone();
            match token.kind {
                TokenKind::Comma if depth > 0 => parts.push(Expr::Token(self.tokens.next_token()?)),
                TokenKind::Semi
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::Eof => {
                    if depth > 0 {
                        return Err(unexpected(TokenKind::RParen.to_string(), &token));
                    }
                    break;
                }
                TokenKind::LParen => {
                    depth += 1;
                    parts.push(Expr::Token(self.tokens.next_token()?));
                }
                TokenKind::RParen => {
                    if depth == 0 {
                        if nesting == Nesting::Argument {
                            break;
                        }
                        return Err(unexpected("balanced parentheses", &token));
                    }
                    depth -= 1;
                    parts.push(Expr::Token(self.tokens.next_token()?));
                    self.parse_index_suffixes(&mut parts)?;
                }
                TokenKind::Ident => {
                    let path = self.parse_path()?;
                    if self.peek_kind()? == TokenKind::LParen {
                        parts.push(Expr::Call(self.parse_call(path)?));
                    } else {
                        parts.push(Expr::Path(path));
                    }
                    self.parse_index_suffixes(&mut parts)?;
                }
                TokenKind::Dot => {
                    parts.push(Expr::Token(self.tokens.next_token()?));
                    parts.push(Expr::Token(self.expect(TokenKind::Ident)?));
                    self.parse_index_suffixes(&mut parts)?;
                }
                TokenKind::IntLiteral => {
                    self.tokens.next_token()?;
                    let value = token.value.parse::<i64>().map_err(|_| CoreError::InvalidLiteral {
                        literal: token.value.clone(),
                        position: token.position,
                    })?;
                    parts.push(Expr::Int(value));
                }
                TokenKind::StringLiteral => {
                    self.tokens.next_token()?;
                    parts.push(Expr::Str(unquote(&token.value).to_string()));
                }
                TokenKind::CharLiteral => {
                    self.tokens.next_token()?;
                    // The token text may be lossy; read the byte from source.
                    let value = self
                        .tokens
                        .source()
                        .get(token.position.offset + 1)
                        .copied()
                        .unwrap_or_default();
                    parts.push(Expr::Char(value));
                }
                TokenKind::BoolLiteral => {
                    self.tokens.next_token()?;
                    parts.push(Expr::Bool(token.value == "true"));
                }
                TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
                | TokenKind::BangEqual
                | TokenKind::AndAnd
                | TokenKind::OrOr
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::Bang
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent => parts.push(Expr::Token(self.tokens.next_token()?)),
                _ => return Err(unexpected("expression", &token)),
            }
        }

        match parts.len() {
            0 => Err(self.unexpected_here("expression")),
            1 if !matches!(parts[0], Expr::Token(_)) => Ok(parts.remove(0)),
            _ => Ok(Expr::Math(parts)),
        }
    }

    /// Splice `[ <expr> ]` suffixes directly into the captured run.
    fn parse_index_suffixes(&mut self, parts: &mut Vec<Expr>) -> Result<(), CoreError> {
        while self.peek_kind()? == TokenKind::LBracket {
            parts.push(Expr::Token(self.tokens.next_token()?));
            parts.push(self.parse_expr(Nesting::Statement)?);
            parts.push(Expr::Token(self.expect(TokenKind::RBracket)?));
        }
        Ok(())
    }

    /// Comma-separated items up to and including `close`. The opening
    /// delimiter must already be consumed.
    fn parse_list<T>(
        &mut self,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> Result<T, CoreError>,
    ) -> Result<Vec<T>, CoreError> {
        let mut items = Vec::new();
        if self.eat(close)? {
            return Ok(items);
        }
        loop {
            items.push(item(self)?);
            if self.eat(close)? {
                return Ok(items);
            }
            if !self.eat(TokenKind::Comma)? {
                return Err(self.unexpected_here(&format!("',' or {close}")));
            }
        }
    }

    fn peek_kind(&mut self) -> Result<TokenKind, CoreError> {
        Ok(self.tokens.peek()?.kind)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, CoreError> {
        if self.peek_kind()? == kind {
            self.tokens.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CoreError> {
        let token = self.tokens.peek()?;
        if token.kind != kind {
            return Err(unexpected(kind.to_string(), token));
        }
        self.tokens.next_token()
    }

    fn expect_ident(&mut self) -> Result<String, CoreError> {
        Ok(self.expect(TokenKind::Ident)?.value)
    }

    fn unexpected_here(&mut self, expected: &str) -> CoreError {
        match self.tokens.peek() {
            Ok(token) => unexpected(expected, token),
            Err(err) => err,
        }
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Instruction, CoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_instruction() {
            Ok(instruction) => instruction.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Parse a whole buffer into its top-level instructions.
pub fn parse(source: &[u8]) -> Result<Vec<Instruction>, CoreError> {
    Parser::new(source).collect()
}

fn unexpected(expected: impl Into<String>, found: &Token) -> CoreError {
    CoreError::Syntax {
        expected: expected.into(),
        found: found.to_string(),
        position: found.position,
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Vec<Instruction> {
        parse(source.as_bytes()).expect("parse")
    }

    fn single_procedure(source: &str) -> Procedure {
        match parse_ok(source).pop() {
            Some(Instruction::Procedure(procedure)) => procedure,
            other => panic!("expected procedure, got {other:?}"),
        }
    }

    fn syntax_error(source: &str) -> (String, String) {
        match parse(source.as_bytes()).unwrap_err() {
            CoreError::Syntax {
                expected, found, ..
            } => (expected, found),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn parses_sample_programs() {
        for source in [
            "proc main() :: int { escape 0; }",
            "proc main() :: int { let a: int = 5; escape 0; }",
            "proc main() :: int { let a: int[] = [1, 2, 3, 4, 5]; escape 0; }",
            "proc main() :: int { if 5 == 5 { escape 0; } escape 0; }",
        ] {
            assert_eq!(parse_ok(source).len(), 1, "{source}");
        }
    }

    #[test]
    fn yields_top_level_instructions_in_source_order() {
        let instructions = parse_ok(
            r#"
            import "lib.wh";
            struct Point { x: int, y: int, }
            let origin: int = 0;
            proc main() :: int { escape 0; }
            "#,
        );
        assert_eq!(instructions.len(), 4);
        assert!(matches!(instructions[0], Instruction::Import { .. }));
        assert!(matches!(instructions[1], Instruction::Struct { .. }));
        assert!(matches!(instructions[2], Instruction::Assignment { .. }));
        assert!(matches!(instructions[3], Instruction::Procedure(_)));
    }

    #[test]
    fn parses_procedure_signature() {
        let procedure = single_procedure("proc add(a: int, b: int[]) :: bool { escape a; }");
        assert_eq!(procedure.ident, "add");
        assert_eq!(
            procedure.args,
            vec![
                Argument {
                    ident: "a".into(),
                    ty: Type::Int
                },
                Argument {
                    ident: "b".into(),
                    ty: Type::Array(Box::new(Type::Int))
                },
            ]
        );
        assert_eq!(procedure.return_type, Type::Bool);
        assert_eq!(procedure.body.len(), 1);
    }

    #[test]
    fn condition_is_captured_without_precedence_tree() {
        let procedure = single_procedure("proc main() :: int { if 5 == 5 { escape 1; } escape 0; }");
        let Instruction::If {
            condition,
            else_body,
            ..
        } = &procedure.body[0]
        else {
            panic!("expected if");
        };
        let Expr::Math(parts) = condition else {
            panic!("expected captured run");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Expr::Int(5));
        assert!(matches!(&parts[1], Expr::Token(token) if token.kind == TokenKind::EqualEqual));
        assert!(else_body.is_empty());
    }

    #[test]
    fn else_if_nests_into_else_body() {
        let procedure = single_procedure(
            "proc main() :: int { if a { escape 1; } else if b { escape 2; } else { escape 3; } }",
        );
        let Instruction::If { else_body, .. } = &procedure.body[0] else {
            panic!("expected if");
        };
        assert!(matches!(
            else_body.as_slice(),
            [Instruction::If { else_body: inner, .. }] if inner.len() == 1
        ));
    }

    #[test]
    fn parses_iter_range() {
        let procedure = single_procedure("proc main() :: void { iter i in 0 : n + 1 { continue; } }");
        let Instruction::Iter {
            ident,
            lower,
            upper,
            body,
        } = &procedure.body[0]
        else {
            panic!("expected iter");
        };
        assert_eq!(ident, "i");
        assert_eq!(*lower, Expr::Int(0));
        assert!(matches!(upper, Expr::Math(parts) if parts.len() == 3));
        assert_eq!(body, &vec![Instruction::Continue]);
    }

    #[test]
    fn balanced_call_arguments() {
        let procedure = single_procedure("proc main() :: void { f(a, (b+c), d); }");
        let Instruction::Call(call) = &procedure.body[0] else {
            panic!("expected call");
        };
        assert_eq!(call.path, Path::new("f"));
        assert_eq!(call.args.len(), 3);
        assert!(matches!(&call.args[1], Expr::Math(parts) if parts.len() == 5));
    }

    #[test]
    fn unbalanced_call_reports_unmatched_token() {
        let (expected, found) = syntax_error("proc main() :: void { f(a, (b+c); }");
        assert_eq!(expected, "',' or ')'");
        assert_eq!(found, "';'");
    }

    #[test]
    fn unclosed_group_reports_missing_paren() {
        let (expected, found) = syntax_error("proc main() :: void { f(a, (b+c; }");
        assert_eq!(expected, "')'");
        assert_eq!(found, "';'");
    }

    #[test]
    fn stray_close_paren_is_rejected() {
        let (expected, found) = syntax_error("proc main() :: int { escape a); }");
        assert_eq!(expected, "balanced parentheses");
        assert_eq!(found, "')'");
    }

    #[test]
    fn nested_calls_and_paths_in_expressions() {
        let procedure = single_procedure("proc main() :: int { escape math::max(g(1), x) + 2; }");
        let Instruction::Escape(Expr::Math(parts)) = &procedure.body[0] else {
            panic!("expected escape of run");
        };
        let Expr::Call(call) = &parts[0] else {
            panic!("expected call");
        };
        assert_eq!(call.path.segments(), ["math".to_string(), "max".to_string()]);
        assert!(matches!(&call.args[0], Expr::Call(inner) if inner.args == vec![Expr::Int(1)]));
        assert_eq!(call.args[1], Expr::Path(Path::new("x")));
    }

    #[test]
    fn index_suffix_is_spliced_into_run() {
        let procedure = single_procedure("proc main() :: int { escape a[2]; }");
        let Instruction::Escape(Expr::Math(parts)) = &procedure.body[0] else {
            panic!("expected escape of run");
        };
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], Expr::Path(Path::new("a")));
        assert_eq!(parts[2], Expr::Int(2));
    }

    #[test]
    fn member_access_keeps_raw_member_token() {
        let procedure = single_procedure("proc main() :: int { escape p.x; }");
        let Instruction::Escape(Expr::Math(parts)) = &procedure.body[0] else {
            panic!("expected escape of run");
        };
        assert!(matches!(&parts[2], Expr::Token(token) if token.kind == TokenKind::Ident && token.value == "x"));
    }

    #[test]
    fn array_literal_and_array_type() {
        let procedure =
            single_procedure("proc main() :: int { let a: int[] = [1, 2, 3, 4, 5]; escape 0; }");
        let Instruction::Assignment { ty, expr, .. } = &procedure.body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(*ty, Type::Array(Box::new(Type::Int)));
        assert!(matches!(expr, Expr::Array(items) if items.len() == 5));
    }

    #[test]
    fn literal_kinds() {
        let procedure = single_procedure(
            r#"proc main() :: void { let s: string = "hi"; let c: char = 'z'; let b: bool = false; }"#,
        );
        let exprs: Vec<&Expr> = procedure
            .body
            .iter()
            .map(|instruction| match instruction {
                Instruction::Assignment { expr, .. } => expr,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            exprs,
            vec![&Expr::Str("hi".into()), &Expr::Char(b'z'), &Expr::Bool(false)]
        );
    }

    #[test]
    fn struct_declaration_requires_trailing_comma() {
        let instructions = parse_ok("struct geo::Point { x: int, y: int, }");
        let Instruction::Struct { path, fields } = &instructions[0] else {
            panic!("expected struct");
        };
        assert_eq!(path.name(), "Point");
        assert_eq!(fields.len(), 2);

        let (expected, found) = syntax_error("struct Point { x: int, y: int }");
        assert_eq!(expected, "','");
        assert_eq!(found, "'}'");
    }

    #[test]
    fn struct_assignment_checks_type_name() {
        let procedure = single_procedure(
            "proc main() :: int { let p: Point = struct Point { x: 1, y: 2 + 3, }; escape 0; }",
        );
        let Instruction::Assignment { expr, .. } = &procedure.body[0] else {
            panic!("expected assignment");
        };
        let Expr::StructInit(init) = expr else {
            panic!("expected struct init");
        };
        assert_eq!(init.ident, "Point");
        assert_eq!(init.fields.len(), 2);

        let err = parse(b"proc main() :: int { let p: Point = struct Other { x: 1, }; }").unwrap_err();
        assert!(matches!(
            err,
            CoreError::StructMismatch { ref expected, ref found, .. } if expected == "Point" && found == "Other"
        ));
    }

    #[test]
    fn named_type_requires_struct_initializer() {
        let (expected, found) = syntax_error("let p: Point = 5;");
        assert_eq!(expected, "'struct'");
        assert_eq!(found, "integer literal `5`");
    }

    #[test]
    fn import_path_is_unquoted() {
        let instructions = parse_ok(r#"import "lib/math.wh" as math; import "A";"#);
        assert_eq!(
            instructions,
            vec![
                Instruction::Import {
                    path: "lib/math.wh".into(),
                    alias: Some("math".into())
                },
                Instruction::Import {
                    path: "A".into(),
                    alias: None
                },
            ]
        );
    }

    #[test]
    fn reassignment_with_indices() {
        let procedure = single_procedure("proc main() :: void { a[i][0] = 3; b = a[1]; }");
        assert!(matches!(
            &procedure.body[0],
            Instruction::Reassign { indices, expr: Expr::Int(3), .. } if indices.len() == 2
        ));
        assert!(matches!(
            &procedure.body[1],
            Instruction::Reassign { indices, .. } if indices.is_empty()
        ));
    }

    #[test]
    fn identifier_statement_needs_call_or_assignment() {
        let (expected, found) = syntax_error("proc main() :: void { a + 1; }");
        assert_eq!(expected, "'(' or '='");
        assert_eq!(found, "'+'");
    }

    #[test]
    fn declarations_only_at_top_level() {
        let (expected, found) = syntax_error("proc main() :: void { proc inner() :: void {} }");
        assert_eq!(expected, "statement");
        assert_eq!(found, "'proc'");

        let (_, found) = syntax_error(r#"proc main() :: void { import "x"; }"#);
        assert_eq!(found, "'import'");
    }

    #[test]
    fn empty_expression_is_rejected() {
        let (expected, found) = syntax_error("proc main() :: int { escape ; }");
        assert_eq!(expected, "expression");
        assert_eq!(found, "';'");
    }

    #[test]
    fn integer_overflow_is_invalid_literal() {
        let err = parse(b"let a: int = 99999999999999999999;").unwrap_err();
        assert!(matches!(err, CoreError::InvalidLiteral { .. }));
    }

    #[test]
    fn iterator_stops_after_first_error() {
        let mut parser = Parser::new(b"break; proc main() :: int { escape 0; }");
        assert!(matches!(parser.next(), Some(Ok(Instruction::Break))));
        let mut parser = Parser::new(b"proc 1 proc main() :: int { escape 0; }");
        assert!(matches!(parser.next(), Some(Err(CoreError::Syntax { .. }))));
        assert!(parser.next().is_none());
    }

    #[test]
    fn errors_carry_position() {
        let err = parse(b"proc main() :: int {\n  escape 0\n}").unwrap_err();
        match err {
            CoreError::Syntax {
                expected,
                position,
                ..
            } => {
                assert_eq!(expected, "';'");
                assert_eq!(position.line, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
