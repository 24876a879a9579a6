//! Abstract syntax tree for `OpenQASM` 2.

/// A complete QASM2 program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Declared version (always "2.0" for accepted programs).
    pub version: String,
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `include "qelib1.inc";`
    Include(String),
    /// `qreg q[n];`
    QregDecl { name: String, size: u32 },
    /// `creg c[n];`
    CregDecl { name: String, size: u32 },
    /// `gate name(params) qubits { body }`
    GateDef(GateDef),
    /// `opaque name(params) qubits;`
    OpaqueDecl { name: String },
    /// A quantum operation, optionally conditioned.
    Quantum(QuantumOp),
    /// `if (c == n) <quantum op>;`
    If {
        register: String,
        value: u64,
        body: QuantumOp,
    },
}

/// A quantum operation statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumOp {
    /// A gate application.
    Gate(GateCall),
    /// `measure q -> c;`
    Measure { qubit: ArgRef, bit: ArgRef },
    /// `reset q;`
    Reset { qubit: ArgRef },
    /// `barrier q, r[0];`
    Barrier { qubits: Vec<ArgRef> },
}

/// A user gate definition.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDef {
    /// Gate name.
    pub name: String,
    /// Formal parameter names.
    pub params: Vec<String>,
    /// Formal qubit argument names.
    pub qubits: Vec<String>,
    /// Body items, applied in order when the gate is inlined.
    pub body: Vec<GateBodyItem>,
}

/// An item inside a gate body.
#[derive(Debug, Clone, PartialEq)]
pub enum GateBodyItem {
    /// A gate application over formal qubit arguments.
    Call(GateCall),
    /// A barrier over formal qubit arguments (dropped when inlining).
    Barrier(Vec<String>),
}

/// A gate application.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Parameter expressions.
    pub params: Vec<Expression>,
    /// Qubit arguments.
    pub qubits: Vec<ArgRef>,
}

/// A reference to a register or a single element of one.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgRef {
    /// Whole register, e.g. `q`.
    Register(String),
    /// Single element, e.g. `q[2]`.
    Indexed(String, u32),
}

impl ArgRef {
    /// The register name being referenced.
    pub fn register(&self) -> &str {
        match self {
            ArgRef::Register(name) | ArgRef::Indexed(name, _) => name,
        }
    }
}

/// A constant parameter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Integer literal.
    Int(u64),
    /// Float literal.
    Float(f64),
    /// The constant pi.
    Pi,
    /// A formal gate parameter (only valid inside gate bodies).
    Identifier(String),
    /// Unary negation.
    Neg(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Built-in function call: sin, cos, tan, exp, ln, sqrt.
    FnCall { name: String, args: Vec<Expression> },
}

/// Binary operators in parameter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
