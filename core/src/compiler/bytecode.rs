//! Bytecode compiler implementation.

use tracing::{debug, trace};

use crate::{
    ast::{BinaryOp, Expr, ExprKind, Ident, Literal, Location, Program, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostics, SemanticError},
    symbols::SymbolTable,
    types::Type,
    vm::{Code, Instruction, TypeTag, Value},
};

/// Which operands of a binary operator need an `itof` before the operator.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Promotion {
    left: bool,
    right: bool,
}

impl Promotion {
    /// Widens whichever side is int when the other is float.
    fn numeric(left: Type, right: Type) -> Self {
        Self {
            left: left == Type::Int && right == Type::Float,
            right: left == Type::Float && right == Type::Int,
        }
    }
}

/// Bytecode compiler that type-checks statements and lowers them to VM
/// bytecode in a single pass.
///
/// Every expression is assigned a static [`Type`]. Semantic errors are
/// reported to the borrowed [`Diagnostics`] and the offending expression
/// gets [`Type::Error`], which silences every check that consumes it.
/// Instructions emitted before an error are kept; callers discard the
/// resulting [`Code`] when any diagnostic was reported.
pub struct BytecodeCompiler<'d> {
    /// Bytecode instructions. Appended to, except for left-operand
    /// coercions which are inserted at a remembered offset.
    instructions: Vec<Instruction>,

    /// Next label number. Labels are never reused.
    next_label: u32,

    /// Declared variables and their types.
    symbols: SymbolTable,

    diagnostics: &'d mut Diagnostics,
}

impl<'d> BytecodeCompiler<'d> {
    /// Create a new bytecode compiler reporting to `diagnostics`.
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            instructions: Vec::new(),
            next_label: 0,
            symbols: SymbolTable::new(),
            diagnostics,
        }
    }

    /// Convenience method to compile a whole program in one call.
    pub fn compile(program: &Program<'_>, diagnostics: &mut Diagnostics) -> Code {
        let mut compiler = BytecodeCompiler::new(diagnostics);
        for stmt in program.statements {
            compiler.compile_statement(stmt);
        }
        compiler.finalize()
    }

    /// Finalize compilation and return the bytecode.
    pub fn finalize(self) -> Code {
        debug!(
            instructions = self.instructions.len(),
            labels = self.next_label,
            symbols = self.symbols.len(),
            diagnostics = self.diagnostics.len(),
            "Compilation finished"
        );
        Code::new(self.instructions)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) {
        trace!(offset = self.instructions.len(), %instruction, "emit");
        self.instructions.push(instruction);
    }

    /// Insert an instruction at an earlier position in the stream.
    fn insert(&mut self, offset: usize, instruction: Instruction) {
        trace!(offset, %instruction, "insert");
        self.instructions.insert(offset, instruction);
    }

    fn new_label(&mut self) -> u32 {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    fn report(&mut self, location: &Location, error: SemanticError) {
        self.diagnostics.report(location, error);
    }

    // === Statements ===

    pub fn compile_statement(&mut self, stmt: &Stmt<'_>) {
        match &stmt.kind {
            StmtKind::Empty => {}

            StmtKind::Declaration { ty, names } => {
                for ident in names.iter() {
                    self.declare(*ty, ident);
                }
            }

            StmtKind::Expression(expr) => {
                self.compile_expr(expr);
                self.emit(Instruction::Pop);
            }

            StmtKind::Read(idents) => {
                for ident in idents.iter() {
                    match self.symbols.lookup(ident.name).and_then(Type::tag) {
                        Some(tag) => {
                            self.emit(Instruction::Read(tag));
                            self.emit(Instruction::Save(ident.name.to_string()));
                        }
                        None => self.report(
                            &ident.loc,
                            SemanticError::UndeclaredVariable {
                                name: ident.name.to_string(),
                            },
                        ),
                    }
                }
            }

            StmtKind::Write(exprs) => {
                for expr in exprs.iter() {
                    self.compile_expr(expr);
                }
                self.emit(Instruction::Print(exprs.len()));
            }

            StmtKind::Block(statements) => {
                for stmt in statements.iter() {
                    self.compile_statement(stmt);
                }
            }

            // === Control Flow ===
            StmtKind::If {
                cond,
                then_branch,
                else_branch: None,
            } => {
                let end = self.new_label();
                self.compile_condition(cond);
                self.emit(Instruction::FalseJmp(end));
                self.compile_statement(then_branch);
                self.emit(Instruction::Label(end));
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch: Some(else_branch),
            } => {
                let otherwise = self.new_label();
                let end = self.new_label();
                self.compile_condition(cond);
                self.emit(Instruction::FalseJmp(otherwise));
                self.compile_statement(then_branch);
                self.emit(Instruction::Jmp(end));
                self.emit(Instruction::Label(otherwise));
                self.compile_statement(else_branch);
                self.emit(Instruction::Label(end));
            }

            StmtKind::While { cond, body } => {
                let start = self.new_label();
                let end = self.new_label();
                self.emit(Instruction::Label(start));
                self.compile_condition(cond);
                self.emit(Instruction::FalseJmp(end));
                self.compile_statement(body);
                self.emit(Instruction::Jmp(start));
                self.emit(Instruction::Label(end));
            }

            StmtKind::DoWhile { body, cond } => {
                let start = self.new_label();
                let end = self.new_label();
                self.emit(Instruction::Label(start));
                self.compile_statement(body);
                self.compile_condition(cond);
                self.emit(Instruction::FalseJmp(end));
                self.emit(Instruction::Jmp(start));
                self.emit(Instruction::Label(end));
            }
        }
    }

    /// Bind a variable and store its zero value.
    fn declare(&mut self, ty: Type, ident: &Ident<'_>) {
        if self.symbols.declare(ident.name, ty).is_err() {
            self.report(
                &ident.loc,
                SemanticError::RedeclaredVariable {
                    name: ident.name.to_string(),
                },
            );
            return;
        }
        if let Some(zero) = ty.zero_value() {
            self.emit(Instruction::Push(zero));
            self.emit(Instruction::Save(ident.name.to_string()));
        }
    }

    /// Compile a branch or loop condition. Non-bool conditions are reported
    /// but the surrounding statement is still lowered.
    fn compile_condition(&mut self, cond: &Expr<'_>) -> Type {
        let ty = self.compile_expr(cond);
        if ty != Type::Boolean && !ty.is_error() {
            self.report(&cond.loc, SemanticError::NonBooleanCondition { found: ty });
        }
        ty
    }

    // === Expressions ===

    /// Compile an expression, leaving exactly one value on the stack when it
    /// is well typed, and return its static type.
    pub fn compile_expr(&mut self, expr: &Expr<'_>) -> Type {
        match &expr.kind {
            // === Constants ===
            ExprKind::Literal(literal) => {
                let (value, ty) = match literal {
                    Literal::Int(i) => (Value::Int(*i), Type::Int),
                    Literal::Float(x) => (Value::Float(*x), Type::Float),
                    Literal::Bool(b) => (Value::Boolean(*b), Type::Boolean),
                    Literal::Str(s) => (Value::String(s.to_string()), Type::String),
                };
                self.emit(Instruction::Push(value));
                ty
            }

            // === Variable Access ===
            ExprKind::Ident(name) => match self.symbols.lookup(name) {
                Some(ty) => {
                    self.emit(Instruction::Load(name.to_string()));
                    ty
                }
                None => {
                    self.report(
                        &expr.loc,
                        SemanticError::UndeclaredVariable {
                            name: name.to_string(),
                        },
                    );
                    Type::Error
                }
            },

            ExprKind::Grouping(inner) => self.compile_expr(inner),

            // === Unary Operations ===
            ExprKind::Unary { op, expr: operand } => {
                let ty = self.compile_expr(operand);
                if ty.is_error() {
                    return Type::Error;
                }
                match (op, ty) {
                    (UnaryOp::Neg, Type::Int | Type::Float) => {
                        self.emit(Instruction::Uminus);
                        ty
                    }
                    (UnaryOp::Not, Type::Boolean) => {
                        self.emit(Instruction::Not);
                        Type::Boolean
                    }
                    _ => {
                        self.report(
                            &expr.loc,
                            SemanticError::UnsupportedOperand {
                                op: op.symbol(),
                                ty,
                            },
                        );
                        Type::Error
                    }
                }
            }

            // === Binary Operations ===
            ExprKind::Binary { .. } => {
                // `a + b + c + ...` nests to the left. Walk down that spine
                // instead of recursing so long chains compile in constant stack.
                let mut spine = Vec::new();
                let mut leftmost: &Expr<'_> = expr;
                while let ExprKind::Binary { op, left, right } = &leftmost.kind {
                    spine.push((*op, *right, &leftmost.loc));
                    leftmost = *left;
                }

                let mut ty = self.compile_expr(leftmost);
                for (op, right, loc) in spine.into_iter().rev() {
                    ty = self.compile_binary(op, ty, right, loc);
                }
                ty
            }

            // === Assignment ===
            ExprKind::Assign { target, value } => {
                let value_ty = self.compile_expr(value);

                let Some(target_ty) = self.symbols.lookup(target.name) else {
                    self.report(
                        &target.loc,
                        SemanticError::UndeclaredVariable {
                            name: target.name.to_string(),
                        },
                    );
                    return Type::Error;
                };
                if value_ty.is_error() {
                    return Type::Error;
                }

                match (target_ty, value_ty) {
                    (t, v) if t == v => {}
                    (Type::Float, Type::Int) => self.emit(Instruction::ItoF),
                    _ => {
                        self.report(
                            &target.loc,
                            SemanticError::AssignmentMismatch {
                                name: target.name.to_string(),
                                target: target_ty,
                                value: value_ty,
                            },
                        );
                        return Type::Error;
                    }
                }
                self.emit(Instruction::Save(target.name.to_string()));
                self.emit(Instruction::Load(target.name.to_string()));
                target_ty
            }

            // === Ternary ===
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                let otherwise = self.new_label();
                let end = self.new_label();

                let cond_ty = self.compile_condition(cond);
                self.emit(Instruction::FalseJmp(otherwise));
                let then_ty = self.compile_expr(then_branch);
                self.emit(Instruction::Jmp(end));
                self.emit(Instruction::Label(otherwise));
                let else_ty = self.compile_expr(else_branch);
                self.emit(Instruction::Label(end));

                if cond_ty != Type::Boolean || then_ty.is_error() || else_ty.is_error() {
                    return Type::Error;
                }
                match (then_ty, else_ty) {
                    (a, b) if a == b => a,
                    // The int branch is widened by the VM when it is combined
                    (Type::Int, Type::Float) | (Type::Float, Type::Int) => Type::Float,
                    _ => {
                        self.report(
                            &expr.loc,
                            SemanticError::TernaryBranchMismatch { then_ty, else_ty },
                        );
                        Type::Error
                    }
                }
            }
        }
    }

    /// Compile `right` and apply `op` to it and the left operand already
    /// lowered, reporting a type error at `loc`.
    fn compile_binary(
        &mut self,
        op: BinaryOp,
        left_ty: Type,
        right: &Expr<'_>,
        loc: &Location,
    ) -> Type {
        // Where a left-operand coercion goes if one is needed
        let left_end = self.instructions.len();
        let right_ty = self.compile_expr(right);

        if left_ty.is_error() || right_ty.is_error() {
            return Type::Error;
        }

        match check_binary(op, left_ty, right_ty) {
            Ok((result, promotion)) => {
                if promotion.left {
                    self.insert(left_end, Instruction::ItoF);
                }
                if promotion.right {
                    self.emit(Instruction::ItoF);
                }
                self.emit_binary(op, result);
                result
            }
            Err(error) => {
                self.report(loc, error);
                Type::Error
            }
        }
    }

    fn emit_binary(&mut self, op: BinaryOp, result: Type) {
        let tag = if result == Type::Float {
            TypeTag::Float
        } else {
            TypeTag::Int
        };
        let instruction = match op {
            BinaryOp::Add => Instruction::Add(tag),
            BinaryOp::Sub => Instruction::Sub(tag),
            BinaryOp::Mul => Instruction::Mul(tag),
            BinaryOp::Div => Instruction::Div(tag),
            BinaryOp::Mod => Instruction::Mod,
            BinaryOp::Concat => Instruction::Concat,
            BinaryOp::Lt => Instruction::Lt,
            BinaryOp::Gt => Instruction::Gt,
            BinaryOp::Eq => Instruction::Eq,
            BinaryOp::NotEq => {
                self.emit(Instruction::Eq);
                Instruction::Not
            }
            BinaryOp::And => Instruction::And,
            BinaryOp::Or => Instruction::Or,
        };
        self.emit(instruction);
    }
}

/// Type rule for a binary operator over two non-error operand types.
///
/// Returns the result type and the operands that must be widened to float.
fn check_binary(
    op: BinaryOp,
    left: Type,
    right: Type,
) -> Result<(Type, Promotion), SemanticError> {
    let unsupported = |ty: Type| SemanticError::UnsupportedOperand {
        op: op.symbol(),
        ty,
    };
    // First operand outside the accepted set, left before right
    let first_outside = |accepts: fn(Type) -> bool| {
        [left, right].into_iter().find(|ty| !accepts(*ty))
    };

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            if let Some(ty) = first_outside(Type::is_numeric) {
                return Err(unsupported(ty));
            }
            let result = if left == Type::Int && right == Type::Int {
                Type::Int
            } else {
                Type::Float
            };
            Ok((result, Promotion::numeric(left, right)))
        }
        BinaryOp::Mod => match first_outside(|ty| ty == Type::Int) {
            Some(ty) => Err(unsupported(ty)),
            None => Ok((Type::Int, Promotion::default())),
        },
        BinaryOp::Concat => match first_outside(|ty| ty == Type::String) {
            Some(ty) => Err(unsupported(ty)),
            None => Ok((Type::String, Promotion::default())),
        },
        BinaryOp::Lt | BinaryOp::Gt => match first_outside(Type::is_numeric) {
            Some(ty) => Err(unsupported(ty)),
            None => Ok((Type::Boolean, Promotion::numeric(left, right))),
        },
        BinaryOp::Eq | BinaryOp::NotEq => {
            if left.is_numeric() && right.is_numeric() {
                Ok((Type::Boolean, Promotion::numeric(left, right)))
            } else if left == right {
                Ok((Type::Boolean, Promotion::default()))
            } else {
                Err(SemanticError::IncompatibleOperands {
                    op: op.symbol(),
                    left,
                    right,
                })
            }
        }
        BinaryOp::And | BinaryOp::Or => match first_outside(|ty| ty == Type::Boolean) {
            Some(ty) => Err(unsupported(ty)),
            None => Ok((Type::Boolean, Promotion::default())),
        },
    }
}
