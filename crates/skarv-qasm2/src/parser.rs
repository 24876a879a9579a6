//! Parser for `OpenQASM` 2.

use std::path::Path;

use rustc_hash::FxHashMap;

use skarv_ir::{Circuit, ClassicalCondition, ClbitId, Gate, Instruction, QubitId, StandardGate};

use crate::ast::{
    ArgRef, BinOp, Expression, GateBodyItem, GateCall, GateDef, Program, QuantumOp, Statement,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a QASM2 source string into a Circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    lower_to_circuit(&program)
}

/// Load and parse a QASM2 file into a Circuit.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Circuit> {
    let source = std::fs::read_to_string(path)?;
    parse(&source)
}

/// Parse a QASM2 source string into an AST Program.
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Parser state.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    /// Byte offsets of newline characters, for error line numbers.
    newlines: Vec<usize>,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let newlines: Vec<usize> = source
            .char_indices()
            .filter_map(|(i, c)| (c == '\n').then_some(i))
            .collect();

        let token_results = tokenize(source);
        let mut tokens = Vec::new();

        for result in token_results {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, msg)) => {
                    let line = newlines.partition_point(|&n| n < span.start) + 1;
                    return Err(ParseError::LexerError { line, message: msg });
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            newlines,
        })
    }

    /// Check if we've reached the end.
    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line number of the current token.
    fn line(&self) -> usize {
        let offset = self
            .tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |t| t.span.start);
        self.newlines.partition_point(|&n| n < offset) + 1
    }

    /// Peek at the current token.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Advance and return the current token.
    fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token.
    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Check if the current token matches.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume the current token if it matches.
    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(&Token::OpenQasm)?;
        let version = self.parse_version()?;
        self.expect(&Token::Semicolon)?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse and validate the version number.
    fn parse_version(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) if (v - 2.0).abs() < f64::EPSILON => Ok("2.0".into()),
            Some(other) => Err(ParseError::InvalidVersion(other.to_string())),
            None => Err(ParseError::UnexpectedEof("version number".into())),
        }
    }

    /// Parse a top-level statement.
    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::Qreg => self.parse_qreg_decl(),
            Token::Creg => self.parse_creg_decl(),
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque_decl(),
            Token::If => self.parse_if(),
            Token::Measure | Token::Reset | Token::Barrier => {
                Ok(Statement::Quantum(self.parse_quantum_op()?))
            }
            Token::Identifier(_) | Token::GateU | Token::GateCX => {
                Ok(Statement::Quantum(self.parse_quantum_op()?))
            }
            _ => Err(ParseError::UnexpectedToken {
                line: self.line(),
                expected: "statement".into(),
                found: token.to_string(),
            }),
        }
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::Include)?;
        let line = self.line();
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "string literal".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(&Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `qreg q[n];`.
    fn parse_qreg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::Qreg)?;
        let (name, size) = self.parse_sized_decl()?;
        Ok(Statement::QregDecl { name, size })
    }

    /// Parse `creg c[n];`.
    fn parse_creg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::Creg)?;
        let (name, size) = self.parse_sized_decl()?;
        Ok(Statement::CregDecl { name, size })
    }

    /// Parse `name[n];` for register declarations.
    fn parse_sized_decl(&mut self) -> ParseResult<(String, u32)> {
        let name = self.parse_identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.parse_int_literal()? as u32;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;
        Ok((name, size))
    }

    /// Parse a gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::Gate)?;
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            if self.consume(&Token::RParen) {
                vec![]
            } else {
                let p = self.parse_identifier_list()?;
                self.expect(&Token::RParen)?;
                p
            }
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;

        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            body.push(self.parse_gate_body_item()?);
        }
        self.expect(&Token::RBrace)?;

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// Parse one item inside a gate body.
    fn parse_gate_body_item(&mut self) -> ParseResult<GateBodyItem> {
        if self.consume(&Token::Barrier) {
            let qubits = self.parse_identifier_list()?;
            self.expect(&Token::Semicolon)?;
            return Ok(GateBodyItem::Barrier(qubits));
        }
        Ok(GateBodyItem::Call(self.parse_gate_call()?))
    }

    /// Parse `opaque name(params) qubits;`.
    fn parse_opaque_decl(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::Opaque)?;
        let name = self.parse_identifier()?;
        if self.consume(&Token::LParen) {
            if !self.consume(&Token::RParen) {
                self.parse_identifier_list()?;
                self.expect(&Token::RParen)?;
            }
        }
        self.parse_identifier_list()?;
        self.expect(&Token::Semicolon)?;
        Ok(Statement::OpaqueDecl { name })
    }

    /// Parse `if (c == n) <quantum op>`.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(&Token::EqEq)?;
        let value = self.parse_int_literal()?;
        self.expect(&Token::RParen)?;
        let body = self.parse_quantum_op()?;

        Ok(Statement::If {
            register,
            value,
            body,
        })
    }

    /// Parse a quantum operation statement.
    fn parse_quantum_op(&mut self) -> ParseResult<QuantumOp> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("quantum operation".into()))?;

        match token {
            Token::Measure => {
                self.advance();
                let qubit = self.parse_arg_ref()?;
                self.expect(&Token::Arrow)?;
                let bit = self.parse_arg_ref()?;
                self.expect(&Token::Semicolon)?;
                Ok(QuantumOp::Measure { qubit, bit })
            }
            Token::Reset => {
                self.advance();
                let qubit = self.parse_arg_ref()?;
                self.expect(&Token::Semicolon)?;
                Ok(QuantumOp::Reset { qubit })
            }
            Token::Barrier => {
                self.advance();
                let qubits = self.parse_arg_ref_list()?;
                self.expect(&Token::Semicolon)?;
                Ok(QuantumOp::Barrier { qubits })
            }
            _ => Ok(QuantumOp::Gate(self.parse_gate_call()?)),
        }
    }

    /// Parse a gate application up to and including the semicolon.
    fn parse_gate_call(&mut self) -> ParseResult<GateCall> {
        let line = self.line();
        let name = match self.advance() {
            Some(Token::Identifier(s)) => s,
            Some(Token::GateU) => "U".to_string(),
            Some(Token::GateCX) => "CX".to_string(),
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "gate name".into(),
                    found: other.to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("gate name".into())),
        };

        let params = if self.consume(&Token::LParen) {
            if self.consume(&Token::RParen) {
                vec![]
            } else {
                let p = self.parse_expression_list()?;
                self.expect(&Token::RParen)?;
                p
            }
        } else {
            vec![]
        };

        let qubits = self.parse_arg_ref_list()?;
        self.expect(&Token::Semicolon)?;

        Ok(GateCall {
            name,
            params,
            qubits,
        })
    }

    /// Parse a comma-separated list of register/element references.
    fn parse_arg_ref_list(&mut self) -> ParseResult<Vec<ArgRef>> {
        let mut refs = vec![self.parse_arg_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_arg_ref()?);
        }
        Ok(refs)
    }

    /// Parse a register reference, optionally indexed.
    fn parse_arg_ref(&mut self) -> ParseResult<ArgRef> {
        let register = self.parse_identifier()?;

        if self.consume(&Token::LBracket) {
            let index = self.parse_int_literal()? as u32;
            self.expect(&Token::RBracket)?;
            Ok(ArgRef::Indexed(register, index))
        } else {
            Ok(ArgRef::Register(register))
        }
    }

    /// Parse an expression.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance(); // consume operator

            // ^ is right-associative; the rest associate left.
            let next_min = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary_expr(next_min)?;
            left = Expression::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(Expression::Neg(Box::new(expr)));
        }
        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        let line = self.line();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;

        match token {
            Token::IntLiteral(v) => {
                self.advance();
                Ok(Expression::Int(v))
            }
            Token::FloatLiteral(v) => {
                self.advance();
                Ok(Expression::Float(v))
            }
            Token::Pi => {
                self.advance();
                Ok(Expression::Pi)
            }
            Token::Identifier(name) => {
                self.advance();
                if self.consume(&Token::LParen) {
                    let args = self.parse_expression_list()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expression::FnCall { name, args })
                } else {
                    Ok(Expression::Identifier(name))
                }
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            _ => Err(ParseError::UnexpectedToken {
                line,
                expected: "expression".into(),
                found: token.to_string(),
            }),
        }
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }

    /// Parse expression list.
    fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Parse identifier list.
    fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    fn parse_identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    /// Parse an integer literal.
    fn parse_int_literal(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}

/// Lower an AST Program to a Circuit.
fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::new();
    lowerer.lower(program)
}

/// One operand slot of a broadcast gate application.
enum Operand {
    /// A single element, fixed across the broadcast.
    Fixed(QubitId),
    /// A whole register, stepped across the broadcast.
    Stepped { start: u32, size: u32 },
}

/// Lowers AST to Circuit, inlining user gate definitions.
struct Lowerer {
    /// Qubit registers: name -> (start id, size).
    qregs: FxHashMap<String, (u32, u32)>,
    /// Classical registers: name -> (start id, size).
    cregs: FxHashMap<String, (u32, u32)>,
    /// User gate definitions: name -> (declaration index, definition).
    macros: FxHashMap<String, (usize, GateDef)>,
    /// Next qubit ID.
    next_qubit: u32,
    /// Next clbit ID.
    next_clbit: u32,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            macros: FxHashMap::default(),
            next_qubit: 0,
            next_clbit: 0,
        }
    }

    fn lower(&mut self, program: &Program) -> ParseResult<Circuit> {
        // First pass: collect declarations.
        for stmt in &program.statements {
            match stmt {
                Statement::Include(path) => {
                    if path != "qelib1.inc" {
                        return Err(ParseError::UnknownInclude(path.clone()));
                    }
                }
                Statement::QregDecl { name, size } => {
                    if self.qregs.contains_key(name) || self.cregs.contains_key(name) {
                        return Err(ParseError::DuplicateDeclaration(name.clone()));
                    }
                    self.qregs.insert(name.clone(), (self.next_qubit, *size));
                    self.next_qubit += size;
                }
                Statement::CregDecl { name, size } => {
                    if self.qregs.contains_key(name) || self.cregs.contains_key(name) {
                        return Err(ParseError::DuplicateDeclaration(name.clone()));
                    }
                    self.cregs.insert(name.clone(), (self.next_clbit, *size));
                    self.next_clbit += size;
                }
                Statement::GateDef(def) => {
                    if self.macros.contains_key(&def.name) {
                        return Err(ParseError::DuplicateDeclaration(def.name.clone()));
                    }
                    let index = self.macros.len();
                    self.macros.insert(def.name.clone(), (index, def.clone()));
                }
                _ => {}
            }
        }

        let mut circuit = Circuit::with_size("qasm2", self.next_qubit, self.next_clbit);

        // Second pass: lower operations.
        for stmt in &program.statements {
            self.lower_statement(&mut circuit, stmt)?;
        }

        Ok(circuit)
    }

    fn lower_statement(&self, circuit: &mut Circuit, stmt: &Statement) -> ParseResult<()> {
        match stmt {
            Statement::Include(_)
            | Statement::QregDecl { .. }
            | Statement::CregDecl { .. }
            | Statement::GateDef(_) => Ok(()),

            Statement::OpaqueDecl { name } => Err(ParseError::Unsupported(format!(
                "opaque gate declaration '{name}' (no body to inline)"
            ))),

            Statement::Quantum(op) => self.lower_quantum(circuit, op, None),

            Statement::If {
                register,
                value,
                body,
            } => {
                if !self.cregs.contains_key(register) {
                    return Err(ParseError::UndefinedRegister(register.clone()));
                }
                let condition = ClassicalCondition::new(register.clone(), *value);
                match body {
                    QuantumOp::Gate(call) => {
                        self.lower_gate_call(circuit, call, Some(&condition))
                    }
                    _ => Err(ParseError::Unsupported(
                        "conditioned measure/reset/barrier".into(),
                    )),
                }
            }
        }
    }

    fn lower_quantum(
        &self,
        circuit: &mut Circuit,
        op: &QuantumOp,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        match op {
            QuantumOp::Gate(call) => self.lower_gate_call(circuit, call, condition),

            QuantumOp::Measure { qubit, bit } => self.lower_measure(circuit, qubit, bit),

            QuantumOp::Reset { qubit } => {
                for q in self.resolve_qubits(qubit)? {
                    circuit.reset(q)?;
                }
                Ok(())
            }

            QuantumOp::Barrier { qubits } => {
                let mut all = Vec::new();
                for arg in qubits {
                    all.extend(self.resolve_qubits(arg)?);
                }
                circuit.barrier(all)?;
                Ok(())
            }
        }
    }

    fn lower_measure(
        &self,
        circuit: &mut Circuit,
        qubit: &ArgRef,
        bit: &ArgRef,
    ) -> ParseResult<()> {
        match (qubit, bit) {
            (ArgRef::Indexed(..), ArgRef::Indexed(..)) => {
                let q = self.resolve_qubit(qubit)?;
                let c = self.resolve_clbit(bit)?;
                circuit.measure(q, c)?;
                Ok(())
            }
            (ArgRef::Register(qname), ArgRef::Register(cname)) => {
                let &(qstart, qsize) = self
                    .qregs
                    .get(qname)
                    .ok_or_else(|| ParseError::UndefinedRegister(qname.clone()))?;
                let &(cstart, csize) = self
                    .cregs
                    .get(cname)
                    .ok_or_else(|| ParseError::UndefinedRegister(cname.clone()))?;
                if qsize != csize {
                    return Err(ParseError::BroadcastMismatch(format!(
                        "measure {qname} -> {cname}: register sizes {qsize} and {csize} differ"
                    )));
                }
                for i in 0..qsize {
                    circuit.measure(QubitId(qstart + i), ClbitId(cstart + i))?;
                }
                Ok(())
            }
            _ => Err(ParseError::BroadcastMismatch(
                "measure operands must both be registers or both be single bits".into(),
            )),
        }
    }

    /// Lower a gate call, broadcasting whole-register operands.
    fn lower_gate_call(
        &self,
        circuit: &mut Circuit,
        call: &GateCall,
        condition: Option<&ClassicalCondition>,
    ) -> ParseResult<()> {
        let env = FxHashMap::default();
        let params: Vec<f64> = call
            .params
            .iter()
            .map(|e| eval_expr(e, &env))
            .collect::<ParseResult<_>>()?;

        // Resolve operands; whole registers broadcast in lockstep.
        let mut operands = Vec::with_capacity(call.qubits.len());
        let mut broadcast: Option<u32> = None;
        for arg in &call.qubits {
            match arg {
                ArgRef::Indexed(..) => operands.push(Operand::Fixed(self.resolve_qubit(arg)?)),
                ArgRef::Register(name) => {
                    let &(start, size) = self
                        .qregs
                        .get(name)
                        .ok_or_else(|| ParseError::UndefinedRegister(name.clone()))?;
                    match broadcast {
                        None => broadcast = Some(size),
                        Some(n) if n == size => {}
                        Some(n) => {
                            return Err(ParseError::BroadcastMismatch(format!(
                                "gate '{}': register sizes {n} and {size} differ",
                                call.name
                            )));
                        }
                    }
                    operands.push(Operand::Stepped { start, size });
                }
            }
        }

        let repeats = broadcast.unwrap_or(1);
        for i in 0..repeats {
            let qubits: Vec<QubitId> = operands
                .iter()
                .map(|op| match op {
                    Operand::Fixed(q) => *q,
                    Operand::Stepped { start, .. } => QubitId(start + i),
                })
                .collect();
            self.apply_gate(
                circuit,
                &call.name,
                &params,
                &qubits,
                condition,
                self.macros.len(),
            )?;
        }

        Ok(())
    }

    /// Apply a single concrete gate, inlining user definitions.
    ///
    /// `macro_ceiling` bounds which user gates may be called: a gate body may
    /// only reference definitions that appeared before its own, which rules
    /// out recursion.
    fn apply_gate(
        &self,
        circuit: &mut Circuit,
        name: &str,
        params: &[f64],
        qubits: &[QubitId],
        condition: Option<&ClassicalCondition>,
        macro_ceiling: usize,
    ) -> ParseResult<()> {
        if let Some(gate) = standard_gate(name, params)? {
            let expected = gate.num_qubits() as usize;
            if qubits.len() != expected {
                return Err(ParseError::WrongQubitCount {
                    gate: name.to_string(),
                    expected,
                    got: qubits.len(),
                });
            }
            let mut g = Gate::new(gate);
            if let Some(cond) = condition {
                g = g.with_condition(cond.clone());
            }
            circuit.apply(Instruction::gate(g, qubits.iter().copied()))?;
            return Ok(());
        }

        let Some((index, def)) = self.macros.get(name) else {
            return Err(ParseError::UnknownGate(name.to_string()));
        };
        if *index >= macro_ceiling {
            return Err(ParseError::UnknownGate(name.to_string()));
        }

        if params.len() != def.params.len() {
            return Err(ParseError::WrongParameterCount {
                gate: name.to_string(),
                expected: def.params.len(),
                got: params.len(),
            });
        }
        if qubits.len() != def.qubits.len() {
            return Err(ParseError::WrongQubitCount {
                gate: name.to_string(),
                expected: def.qubits.len(),
                got: qubits.len(),
            });
        }

        let env: FxHashMap<&str, f64> = def
            .params
            .iter()
            .map(String::as_str)
            .zip(params.iter().copied())
            .collect();
        let formals: FxHashMap<&str, QubitId> = def
            .qubits
            .iter()
            .map(String::as_str)
            .zip(qubits.iter().copied())
            .collect();

        for item in &def.body {
            let GateBodyItem::Call(call) = item else {
                // Barriers inside gate bodies only fence optimization; there
                // is nothing to keep once the body is inlined.
                continue;
            };

            let call_params: Vec<f64> = call
                .params
                .iter()
                .map(|e| eval_expr(e, &env))
                .collect::<ParseResult<_>>()?;
            let call_qubits: Vec<QubitId> = call
                .qubits
                .iter()
                .map(|arg| match arg {
                    ArgRef::Register(n) => formals
                        .get(n.as_str())
                        .copied()
                        .ok_or_else(|| ParseError::UndefinedIdentifier(n.clone())),
                    ArgRef::Indexed(n, _) => Err(ParseError::Unsupported(format!(
                        "indexing '{n}' inside a gate body"
                    ))),
                })
                .collect::<ParseResult<_>>()?;

            self.apply_gate(circuit, &call.name, &call_params, &call_qubits, condition, *index)?;
        }

        Ok(())
    }

    /// Resolve a qubit reference that may be a whole register.
    fn resolve_qubits(&self, arg: &ArgRef) -> ParseResult<Vec<QubitId>> {
        let &(start, size) = self
            .qregs
            .get(arg.register())
            .ok_or_else(|| ParseError::UndefinedRegister(arg.register().to_string()))?;

        match arg {
            ArgRef::Register(_) => Ok((start..start + size).map(QubitId).collect()),
            ArgRef::Indexed(name, index) => {
                if *index >= size {
                    return Err(ParseError::IndexOutOfBounds {
                        register: name.clone(),
                        index: *index,
                        size,
                    });
                }
                Ok(vec![QubitId(start + index)])
            }
        }
    }

    /// Resolve a single indexed qubit reference.
    fn resolve_qubit(&self, arg: &ArgRef) -> ParseResult<QubitId> {
        match arg {
            ArgRef::Indexed(name, index) => {
                let &(start, size) = self
                    .qregs
                    .get(name)
                    .ok_or_else(|| ParseError::UndefinedRegister(name.clone()))?;
                if *index >= size {
                    return Err(ParseError::IndexOutOfBounds {
                        register: name.clone(),
                        index: *index,
                        size,
                    });
                }
                Ok(QubitId(start + index))
            }
            ArgRef::Register(name) => Err(ParseError::BroadcastMismatch(format!(
                "expected a single qubit, got register '{name}'"
            ))),
        }
    }

    /// Resolve a single indexed classical bit reference.
    fn resolve_clbit(&self, arg: &ArgRef) -> ParseResult<ClbitId> {
        match arg {
            ArgRef::Indexed(name, index) => {
                let &(start, size) = self
                    .cregs
                    .get(name)
                    .ok_or_else(|| ParseError::UndefinedRegister(name.clone()))?;
                if *index >= size {
                    return Err(ParseError::IndexOutOfBounds {
                        register: name.clone(),
                        index: *index,
                        size,
                    });
                }
                Ok(ClbitId(start + index))
            }
            ArgRef::Register(name) => Err(ParseError::BroadcastMismatch(format!(
                "expected a single bit, got register '{name}'"
            ))),
        }
    }
}

/// Look up a built-in gate by name, checking its parameter count.
///
/// Returns `Ok(None)` when the name is not a built-in (it may be a user
/// definition).
fn standard_gate(name: &str, params: &[f64]) -> ParseResult<Option<StandardGate>> {
    let expected = match name {
        "id" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "cx" | "CX" | "cy" | "cz"
        | "ch" | "swap" | "ccx" | "cswap" => 0,
        "rx" | "ry" | "rz" | "u1" | "crz" | "cu1" => 1,
        "u2" => 2,
        "u3" | "U" | "cu3" => 3,
        _ => return Ok(None),
    };
    if params.len() != expected {
        return Err(ParseError::WrongParameterCount {
            gate: name.to_string(),
            expected,
            got: params.len(),
        });
    }

    let gate = match name {
        "id" => StandardGate::I,
        "x" => StandardGate::X,
        "y" => StandardGate::Y,
        "z" => StandardGate::Z,
        "h" => StandardGate::H,
        "s" => StandardGate::S,
        "sdg" => StandardGate::Sdg,
        "t" => StandardGate::T,
        "tdg" => StandardGate::Tdg,
        "rx" => StandardGate::Rx(params[0]),
        "ry" => StandardGate::Ry(params[0]),
        "rz" => StandardGate::Rz(params[0]),
        "u1" => StandardGate::U1(params[0]),
        "u2" => StandardGate::U2(params[0], params[1]),
        "u3" | "U" => StandardGate::U3(params[0], params[1], params[2]),
        "cx" | "CX" => StandardGate::CX,
        "cy" => StandardGate::CY,
        "cz" => StandardGate::CZ,
        "ch" => StandardGate::CH,
        "swap" => StandardGate::Swap,
        "crz" => StandardGate::CRz(params[0]),
        "cu1" => StandardGate::CU1(params[0]),
        "cu3" => StandardGate::CU3(params[0], params[1], params[2]),
        "ccx" => StandardGate::CCX,
        "cswap" => StandardGate::CSwap,
        _ => unreachable!("arity table and constructor table disagree on '{name}'"),
    };
    Ok(Some(gate))
}

/// Evaluate a constant parameter expression.
fn eval_expr(expr: &Expression, env: &FxHashMap<&str, f64>) -> ParseResult<f64> {
    match expr {
        Expression::Int(v) => Ok(*v as f64),
        Expression::Float(v) => Ok(*v),
        Expression::Pi => Ok(std::f64::consts::PI),
        Expression::Identifier(name) => env
            .get(name.as_str())
            .copied()
            .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone())),
        Expression::Neg(inner) => Ok(-eval_expr(inner, env)?),
        Expression::BinOp { left, op, right } => {
            let l = eval_expr(left, env)?;
            let r = eval_expr(right, env)?;
            Ok(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                BinOp::Pow => l.powf(r),
            })
        }
        Expression::FnCall { name, args } => {
            if args.len() != 1 {
                return Err(ParseError::Unsupported(format!(
                    "function '{name}' expects 1 argument, got {}",
                    args.len()
                )));
            }
            let x = eval_expr(&args[0], env)?;
            match name.as_str() {
                "sin" => Ok(x.sin()),
                "cos" => Ok(x.cos()),
                "tan" => Ok(x.tan()),
                "exp" => Ok(x.exp()),
                "ln" => Ok(x.ln()),
                "sqrt" => Ok(x.sqrt()),
                _ => Err(ParseError::UndefinedIdentifier(name.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_parse_bell() {
        let qasm = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;
        let circuit = parse(qasm).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);

        let counts = circuit.count_ops();
        assert_eq!(counts.get("h"), 1);
        assert_eq!(counts.get("cx"), 1);
        assert_eq!(counts.get("measure"), 2);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse("qreg q[1];"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_wrong_version() {
        assert!(matches!(
            parse("OPENQASM 3.0; qreg q[1];"),
            Err(ParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_unknown_include() {
        let qasm = r#"OPENQASM 2.0; include "mylib.inc";"#;
        assert!(matches!(parse(qasm), Err(ParseError::UnknownInclude(_))));
    }

    #[test]
    fn test_parameter_expressions() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            rx(pi/2) q[0];
            rz(-pi/4) q[0];
            u3(2*pi, 0.5, cos(0)) q[0];
        ";
        let circuit = parse(qasm).unwrap();
        let gates: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|i| i.as_gate().unwrap().gate.clone())
            .collect();

        assert_eq!(gates[0], StandardGate::Rx(PI / 2.0));
        assert_eq!(gates[1], StandardGate::Rz(-PI / 4.0));
        assert_eq!(gates[2], StandardGate::U3(2.0 * PI, 0.5, 1.0));
    }

    #[test]
    fn test_builtin_u_and_cx() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            U(0, 0, pi) q[0];
            CX q[0], q[1];
        ";
        let circuit = parse(qasm).unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("u3"), 1);
        assert_eq!(counts.get("cx"), 1);
    }

    #[test]
    fn test_register_broadcast() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[3];
            qreg r[3];
            h q;
            cx q, r;
        ";
        let circuit = parse(qasm).unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("h"), 3);
        assert_eq!(counts.get("cx"), 3);
    }

    #[test]
    fn test_broadcast_mismatch() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[3];
            qreg r[2];
            cx q, r;
        ";
        assert!(matches!(
            parse(qasm),
            Err(ParseError::BroadcastMismatch(_))
        ));
    }

    #[test]
    fn test_mixed_broadcast() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            qreg r[3];
            cx q[0], r;
        ";
        let circuit = parse(qasm).unwrap();
        assert_eq!(circuit.count_ops().get("cx"), 3);
    }

    #[test]
    fn test_measure_single() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            creg c[2];
            measure q[1] -> c[0];
        ";
        let circuit = parse(qasm).unwrap();
        let inst = &circuit.instructions()[0];
        assert!(inst.is_measure());
        assert_eq!(inst.qubits, vec![QubitId(1)]);
        assert_eq!(inst.clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_measure_size_mismatch() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[3];
            creg c[2];
            measure q -> c;
        ";
        assert!(matches!(
            parse(qasm),
            Err(ParseError::BroadcastMismatch(_))
        ));
    }

    #[test]
    fn test_barrier_and_reset() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            barrier q;
            reset q[0];
        ";
        let circuit = parse(qasm).unwrap();
        assert!(circuit.instructions()[0].is_barrier());
        assert_eq!(circuit.instructions()[0].qubits.len(), 2);
        assert!(circuit.instructions()[1].is_reset());
    }

    #[test]
    fn test_conditioned_gate() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            creg c[1];
            if (c == 1) x q[0];
        ";
        let circuit = parse(qasm).unwrap();
        let gate = circuit.instructions()[0].as_gate().unwrap();
        let cond = gate.condition.as_ref().unwrap();
        assert_eq!(cond.register, "c");
        assert_eq!(cond.value, 1);
    }

    #[test]
    fn test_gate_def_inlined() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            gate entangle a, b {
                h a;
                cx a, b;
            }
            entangle q[0], q[1];
        ";
        let circuit = parse(qasm).unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("h"), 1);
        assert_eq!(counts.get("cx"), 1);
        assert!(!counts.contains("entangle"));
    }

    #[test]
    fn test_gate_def_with_params() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            gate tilt(theta) a {
                rx(theta/2) a;
                rz(-theta) a;
            }
            tilt(pi) q[0];
        ";
        let circuit = parse(qasm).unwrap();
        let gates: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|i| i.as_gate().unwrap().gate.clone())
            .collect();
        assert_eq!(gates[0], StandardGate::Rx(PI / 2.0));
        assert_eq!(gates[1], StandardGate::Rz(-PI));
    }

    #[test]
    fn test_nested_gate_defs() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            gate inner a { h a; }
            gate outer a, b {
                inner a;
                cx a, b;
            }
            outer q[0], q[1];
        ";
        let circuit = parse(qasm).unwrap();
        assert_eq!(circuit.count_ops().get("h"), 1);
        assert_eq!(circuit.count_ops().get("cx"), 1);
    }

    #[test]
    fn test_unknown_gate() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            foo q[0];
        ";
        assert!(matches!(parse(qasm), Err(ParseError::UnknownGate(_))));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[2];
            h q[5];
        ";
        assert!(matches!(
            parse(qasm),
            Err(ParseError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_wrong_parameter_count() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            rx q[0];
        ";
        assert!(matches!(
            parse(qasm),
            Err(ParseError::WrongParameterCount { .. })
        ));
    }

    #[test]
    fn test_duplicate_register() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            creg q[1];
        ";
        assert!(matches!(
            parse(qasm),
            Err(ParseError::DuplicateDeclaration(_))
        ));
    }

    #[test]
    fn test_opaque_rejected() {
        let qasm = r"
            OPENQASM 2.0;
            qreg q[1];
            opaque mystery a;
            mystery q[0];
        ";
        assert!(matches!(parse(qasm), Err(ParseError::Unsupported(_))));
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file("/this/path/does/not/exist.qasm");
        assert!(matches!(result, Err(ParseError::Io(_))));
    }

    #[test]
    fn test_parse_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.qasm");
        std::fs::write(
            &path,
            "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n",
        )
        .unwrap();

        let circuit = parse_file(&path).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.count_ops().total(), 4);
    }
}
