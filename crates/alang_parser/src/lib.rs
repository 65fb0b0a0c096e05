use alang_ast::*;
use alang_lexer::{LexError, Lexer, Span, SpannedToken, Token};
use thiserror::Error;

pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError { message: e.message, span: e.span }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(source: &str) -> ParseResult<Self> {
        let tokens = Lexer::tokenize(source)?;
        Ok(Self { tokens, pos: 0 })
    }

    pub fn parse(source: &str) -> ParseResult<SourceFile> {
        let mut parser = Parser::new(source)?;
        parser.parse_source_file()
    }

    // === Token Access ===

    fn current(&self) -> &SpannedToken {
        // tokenize always ends the stream with Eof, so the vector is never empty
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_span(&self) -> Span {
        self.current().span
    }

    /// Token after the current one, Eof when past the end
    fn peek_next(&self) -> &Token {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn advance(&mut self) -> SpannedToken {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&self, expected: &str) -> ParseError {
        ParseError {
            message: format!("expected {}, found '{}'", expected, self.peek()),
            span: self.peek_span(),
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("'{}'", expected)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        match self.peek().clone() {
            Token::Ident(name) => {
                let span = self.peek_span();
                self.advance();
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_here("identifier")),
        }
    }

    // === Declarations ===

    fn parse_source_file(&mut self) -> ParseResult<SourceFile> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.parse_declaration()?);
        }

        Ok(SourceFile { items })
    }

    fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        match self.peek() {
            Token::Func => self.parse_fn_decl().map(Stmt::Function),
            Token::Var => self.parse_var_decl().map(Stmt::Var),
            _ => self.parse_stmt(),
        }
    }

    fn parse_fn_decl(&mut self) -> ParseResult<FnDecl> {
        let start = self.expect(Token::Func)?.span;
        let name = self.expect_ident()?;

        self.expect(Token::LParen)?;
        let params = self.parse_param_list()?;
        self.expect(Token::RParen)?;

        let return_type = if self.eat(&Token::Colon) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        let body = self.parse_stmt()?;
        let span = start.to(body.span());

        Ok(FnDecl { name, params, return_type, body: Box::new(body), span })
    }

    fn parse_param_list(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        if self.check(&Token::RParen) {
            return Ok(params);
        }

        loop {
            params.push(self.parse_param()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let name = self.expect_ident()?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let span = ty.as_ref().map(|t| name.span.to(t.span)).unwrap_or(name.span);
        Ok(Param { name, ty, span })
    }

    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let start = self.expect(Token::Var)?.span;
        let name = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let ty = self.expect_ident()?;
        self.expect(Token::Eq)?;
        let init = self.parse_expr()?;
        let end = self.expect(Token::Semi)?.span;

        Ok(VarDecl { name, ty, init, span: start.to(end) })
    }

    // === Statements ===

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek() {
            Token::Return => self.parse_return_stmt().map(Stmt::Return),
            Token::If => self.parse_if_stmt().map(Stmt::If),
            Token::LBrace => self.parse_block().map(Stmt::Block),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_return_stmt(&mut self) -> ParseResult<ReturnStmt> {
        let start = self.expect(Token::Return)?.span;
        let value = if self.check(&Token::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(Token::Semi)?.span;

        Ok(ReturnStmt { value, span: start.to(end) })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<IfStmt> {
        let start = self.expect(Token::If)?.span;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;

        let then_branch = self.parse_stmt()?;
        let mut span = start.to(then_branch.span());

        // else binds to the nearest if
        let else_branch = if self.eat(&Token::Else) {
            let stmt = self.parse_stmt()?;
            span = span.to(stmt.span());
            Some(Box::new(stmt))
        } else {
            None
        };

        Ok(IfStmt { cond, then_branch: Box::new(then_branch), else_branch, span })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect(Token::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&Token::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_declaration()?);
        }

        let end = self.expect(Token::RBrace)?.span;
        Ok(Block { stmts, span: start.to(end) })
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expr()?;
        let end = self.expect(Token::Semi)?.span;
        let span = expr.span.to(end);
        Ok(Stmt::Expr(ExprStmt { expr, span }))
    }

    // === Expressions ===

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        if let (Token::Ident(_), Token::Eq) = (self.peek(), self.peek_next()) {
            let target = self.expect_ident()?;
            self.advance(); // '='
            let value = self.parse_assignment()?;
            let span = target.span.to(value.span);
            return Ok(Expr { kind: ExprKind::Assign(target, Box::new(value)), span });
        }

        let expr = self.parse_equality()?;
        if self.check(&Token::Eq) {
            return Err(ParseError {
                message: "invalid assignment target".to_string(),
                span: expr.span,
            });
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek() {
                Token::EqEq => BinOp::Eq,
                Token::NotEq => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_postfix()?;

        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_postfix()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        while self.check(&Token::LParen) {
            self.advance();
            let args = self.parse_arg_list()?;
            let end = self.expect(Token::RParen)?.span;
            let span = expr.span.to(end);
            expr = Expr { kind: ExprKind::Call(Box::new(expr), args), span };
        }

        Ok(expr)
    }

    fn parse_arg_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();

        if self.check(&Token::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.peek_span();

        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(Expr { kind: ExprKind::Ident(Ident::new(name, span)), span })
            }
            Token::NumericLiteral(text) => {
                self.advance();
                Ok(Expr { kind: ExprKind::NumericLiteral(text), span })
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.expect(Token::RParen)?.span;
                Ok(Expr { kind: inner.kind, span: span.to(end) })
            }
            _ => Err(self.error_here("expression")),
        }
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    Expr { kind: ExprKind::Binary(Box::new(left), op, Box::new(right)), span }
}
