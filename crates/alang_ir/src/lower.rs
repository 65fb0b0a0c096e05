//! Lower the AST to IR with by-name calls

use crate::error::{IrError, IrResult};
use crate::function::{IrFunction, IrParam, Program};
use crate::instr::{Instr, Reg, UnresolvedCallee};
use crate::scope::ScopeTracker;
use crate::types::IrType;
use alang_ast::*;
use alang_lexer::Span;
use log::{debug, trace};
use num_bigint::BigInt;

/// Lower every top-level function declaration, in source order
pub fn lower_program(file: &SourceFile) -> IrResult<Program<UnresolvedCallee>> {
    let mut program = Program::default();

    for item in &file.items {
        match item {
            Stmt::Function(decl) => {
                let func = FunctionLowerer::new(decl)?.lower(decl)?;
                program.functions.push(func);
            }
            other => {
                return Err(IrError::unsupported(
                    format!("top-level {}", other.kind_name()),
                    other.span(),
                ));
            }
        }
    }

    Ok(program)
}

/// Map a source type name to an IR type. No name means the function
/// returns nothing.
pub fn map_type_name(name: Option<&Ident>) -> IrResult<IrType> {
    match name {
        None => Ok(IrType::Nothing),
        Some(ident) if ident.name == "u16" => Ok(IrType::int(false, 16)),
        Some(ident) => Err(IrError::UnknownType { name: ident.name.clone(), span: ident.span }),
    }
}

struct FunctionLowerer {
    func: IrFunction<UnresolvedCallee>,
    scopes: ScopeTracker,
}

/// Per-name phi inputs collected from the two arms of an `if`
struct PhiEntry {
    name: String,
    then_reg: Option<Reg>,
    else_reg: Option<Reg>,
}

impl FunctionLowerer {
    fn new(decl: &FnDecl) -> IrResult<Self> {
        let return_type = map_type_name(decl.return_type.as_ref())?;
        let params = decl
            .params
            .iter()
            .map(|p| {
                map_type_name(p.ty.as_ref()).map(|ty| IrParam { name: p.name.name.clone(), ty })
            })
            .collect::<IrResult<Vec<_>>>()?;

        Ok(Self {
            func: IrFunction::new(decl.name.name.clone(), return_type, params),
            scopes: ScopeTracker::new(),
        })
    }

    fn lower(mut self, decl: &FnDecl) -> IrResult<IrFunction<UnresolvedCallee>> {
        debug!("[lower] function '{}' ({} params)", decl.name.name, decl.params.len());

        self.scopes.enter_scope();

        // Argument registers come first, in parameter order
        for (index, param) in decl.params.iter().enumerate() {
            let ty = self.func.params[index].ty;
            let dest = self.func.new_reg(ty);
            self.emit(Instr::StoreArg { index, dest });
            self.scopes.declare(&param.name.name, dest, param.name.span)?;
        }

        self.lower_stmt(&decl.body)?;
        self.scopes.leave_scope();

        debug!(
            "[lower] function '{}' done: {} instrs, {} regs",
            self.func.name,
            self.func.instrs.len(),
            self.func.reg_types.len()
        );
        Ok(self.func)
    }

    fn emit(&mut self, instr: Instr<UnresolvedCallee>) {
        trace!("[lower] {} 0x{:04x}  {}", self.func.name, self.func.instrs.len(), instr);
        self.func.push(instr);
    }

    // === Statements ===

    fn lower_stmt(&mut self, stmt: &Stmt) -> IrResult<()> {
        match stmt {
            Stmt::Function(f) => Err(IrError::unsupported("nested function declaration", f.span)),
            Stmt::Var(var) => {
                let reg = self.lower_expr(&var.init)?;
                let ty = map_type_name(Some(&var.ty))?;
                self.func.set_reg_type(reg, ty);
                self.scopes.declare(&var.name.name, reg, var.name.span)
            }
            Stmt::Block(block) => {
                self.scopes.enter_scope();
                for stmt in &block.stmts {
                    self.lower_stmt(stmt)?;
                }
                self.scopes.leave_scope();
                Ok(())
            }
            Stmt::If(if_stmt) => self.lower_if(if_stmt),
            Stmt::Return(ret) => {
                let value = match &ret.value {
                    Some(expr) => self.lower_expr(expr)?,
                    None => self.func.new_reg(IrType::Nothing),
                };
                self.emit(Instr::Return { value: Some(value) });
                Ok(())
            }
            Stmt::Expr(stmt) => {
                self.lower_expr(&stmt.expr)?;
                Ok(())
            }
        }
    }

    fn lower_if(&mut self, if_stmt: &IfStmt) -> IrResult<()> {
        let cond = self.lower_expr(&if_stmt.cond)?;

        let then_branch = self.func.new_branch();
        let else_branch = self.func.new_branch();
        let merge = self.func.new_branch();
        self.emit(Instr::CondBranch { cond, then_branch, else_branch });

        self.func.mark_branch(then_branch);
        self.scopes.begin_branch();
        self.lower_stmt(&if_stmt.then_branch)?;
        let then_log = self.scopes.end_branch();
        self.emit(Instr::Branch { target: merge });

        self.func.mark_branch(else_branch);
        self.scopes.begin_branch();
        if let Some(else_stmt) = &if_stmt.else_branch {
            self.lower_stmt(else_stmt)?;
        }
        let else_log = self.scopes.end_branch();
        self.emit(Instr::Branch { target: merge });

        self.func.mark_branch(merge);

        let mut entries: Vec<PhiEntry> = Vec::new();
        for (name, reg) in then_log {
            match entries.iter_mut().find(|e| e.name == name) {
                Some(entry) => entry.then_reg = Some(reg),
                None => entries.push(PhiEntry { name, then_reg: Some(reg), else_reg: None }),
            }
        }
        for (name, reg) in else_log {
            match entries.iter_mut().find(|e| e.name == name) {
                Some(entry) => entry.else_reg = Some(reg),
                None => entries.push(PhiEntry { name, then_reg: None, else_reg: Some(reg) }),
            }
        }

        for entry in entries {
            let before = self.scopes.resolve(&entry.name, if_stmt.span)?;
            let dest = self.func.new_reg(self.func.reg_type(before));
            let first = (then_branch, entry.then_reg.unwrap_or(before));
            let second = (else_branch, entry.else_reg.unwrap_or(before));

            debug!(
                "[lower] phi for '{}' in {}: [{}: {}], [{}: {}] -> {}",
                entry.name, self.func.name, first.0, first.1, second.0, second.1, dest
            );
            self.emit(Instr::Phi { first, second, dest });
            self.scopes.reassign(&entry.name, dest, if_stmt.span)?;
        }

        Ok(())
    }

    // === Expressions ===

    fn lower_expr(&mut self, expr: &Expr) -> IrResult<Reg> {
        match &expr.kind {
            ExprKind::NumericLiteral(text) => {
                let value: BigInt = text.parse().map_err(|_| IrError::LiteralParseError {
                    text: text.clone(),
                    span: expr.span,
                })?;
                let dest = self.func.new_reg(IrType::default_int());
                self.emit(Instr::StoreConst { value, dest });
                Ok(dest)
            }
            ExprKind::Ident(ident) => self.scopes.resolve(&ident.name, ident.span),
            ExprKind::Assign(target, value) => {
                let reg = self.lower_expr(value)?;
                self.scopes.reassign(&target.name, reg, target.span)?;
                Ok(reg)
            }
            ExprKind::Binary(lhs, op, rhs) => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                self.lower_binary(*op, lhs, rhs, expr.span)
            }
            ExprKind::Call(callee, args) => {
                let ExprKind::Ident(name) = &callee.kind else {
                    return Err(IrError::unsupported(
                        format!("calling a {}", callee.kind.kind_name()),
                        callee.span,
                    ));
                };

                let args = args
                    .iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect::<IrResult<Vec<_>>>()?;
                let dest = self.func.new_reg(IrType::Unknown);
                let callee = UnresolvedCallee { name: name.name.clone(), span: expr.span };
                self.emit(Instr::Call { callee, args, dest });
                Ok(dest)
            }
        }
    }

    fn lower_binary(&mut self, op: BinOp, lhs: Reg, rhs: Reg, span: Span) -> IrResult<Reg> {
        let dest = match op {
            BinOp::Add | BinOp::Sub => self.func.new_reg(IrType::Unknown),
            BinOp::Eq => self.func.new_reg(IrType::Bool),
            BinOp::NotEq => return Err(IrError::unsupported("'!=' comparison", span)),
        };

        let instr = match op {
            BinOp::Add => Instr::Add { lhs, rhs, dest },
            BinOp::Sub => Instr::Sub { lhs, rhs, dest },
            _ => Instr::CmpEq { lhs, rhs, dest },
        };
        self.emit(instr);
        Ok(dest)
    }
}
