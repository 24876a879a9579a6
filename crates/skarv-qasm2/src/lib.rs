//! `OpenQASM` 2 Loader for Skarv
//!
//! Parses `OpenQASM` 2.0 circuit descriptions into [`skarv_ir::Circuit`]
//! values. The `qelib1.inc` standard gate vocabulary is built in, so the
//! conventional `include "qelib1.inc";` line is accepted and ignored.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version declaration | `OPENQASM 2.0;` |
//! | Register declarations | `qreg q[5];`, `creg c[5];` |
//! | Standard gates | `h q[0];`, `cx q[0], q[1];` |
//! | Parameterized gates | `rx(pi/4) q[0];` |
//! | Register broadcast | `h q;`, `cx q, r;` |
//! | Measurements | `measure q -> c;` |
//! | Barriers, reset | `barrier q;`, `reset q[0];` |
//! | Conditioned gates | `if (c==1) x q[0];` |
//! | Gate definitions | `gate foo(a) p, q { ... }` (inlined at load) |
//!
//! # Example
//!
//! ```rust
//! use skarv_qasm2::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.count_ops().get("measure"), 2);
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_ast, parse_file};

// Re-export AST types for advanced users
pub mod syntax {
    pub use crate::ast::*;
}
