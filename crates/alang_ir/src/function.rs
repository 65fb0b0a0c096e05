//! Function records and programs

use crate::instr::{BranchId, Instr, Reg};
use crate::types::IrType;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrParam {
    pub name: String,
    pub ty: IrType,
}

/// A lowered function: registers, instructions and branch labels.
///
/// The first `params.len()` registers hold the arguments. Every register has
/// exactly one entry in `reg_types`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFunction<C> {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<IrParam>,
    pub reg_types: Vec<IrType>,
    pub instrs: Vec<Instr<C>>,
    /// Instruction offset each branch label points at, in recording order
    pub branch_markers: Vec<(BranchId, usize)>,
    next_branch: usize,
}

impl<C> IrFunction<C> {
    pub fn new(name: impl Into<String>, return_type: IrType, params: Vec<IrParam>) -> Self {
        Self {
            name: name.into(),
            return_type,
            params,
            reg_types: Vec::new(),
            instrs: Vec::new(),
            branch_markers: Vec::new(),
            next_branch: 0,
        }
    }

    pub fn new_reg(&mut self, ty: IrType) -> Reg {
        let reg = Reg(self.reg_types.len());
        self.reg_types.push(ty);
        reg
    }

    pub fn reg_type(&self, reg: Reg) -> IrType {
        self.reg_types.get(reg.0).copied().unwrap_or_default()
    }

    pub fn set_reg_type(&mut self, reg: Reg, ty: IrType) {
        if let Some(slot) = self.reg_types.get_mut(reg.0) {
            *slot = ty;
        }
    }

    pub fn new_branch(&mut self) -> BranchId {
        let id = BranchId(self.next_branch);
        self.next_branch += 1;
        id
    }

    /// Point `branch` at the next instruction to be emitted
    pub fn mark_branch(&mut self, branch: BranchId) {
        self.branch_markers.push((branch, self.instrs.len()));
    }

    pub fn push(&mut self, instr: Instr<C>) {
        self.instrs.push(instr);
    }

    /// Replace the callee representation of every call, keeping everything else
    pub fn try_map_calls<D, E>(
        self,
        mut f: impl FnMut(C) -> Result<D, E>,
    ) -> Result<IrFunction<D>, E> {
        let instrs = self
            .instrs
            .into_iter()
            .map(|instr| instr.try_map_callee(&mut f))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(IrFunction {
            name: self.name,
            return_type: self.return_type,
            params: self.params,
            reg_types: self.reg_types,
            instrs,
            branch_markers: self.branch_markers,
            next_branch: self.next_branch,
        })
    }
}

impl<C: fmt::Display> IrFunction<C> {
    /// Text form of this function, headed by its index in the program
    pub fn disassemble(&self, index: usize) -> String {
        let mut out = String::new();

        let params = self.params.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>().join(", ");
        out.push_str(&format!("{}: {} {}({})\n", index, self.return_type, self.name, params));

        let regs = self
            .reg_types
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{}:{}", i, ty))
            .collect::<Vec<_>>();
        if regs.is_empty() {
            out.push_str(".regs\n");
        } else {
            out.push_str(&format!(".regs {}\n", regs.join(", ")));
        }

        for (offset, instr) in self.instrs.iter().enumerate() {
            self.write_labels(&mut out, offset);
            out.push_str(&format!("  0x{:04x}  {}\n", offset, instr));
        }
        self.write_labels(&mut out, self.instrs.len());

        out
    }

    fn write_labels(&self, out: &mut String, offset: usize) {
        for (branch, _) in self.branch_markers.iter().filter(|(_, at)| *at == offset) {
            out.push_str(&format!("{}:\n", branch));
        }
    }
}

/// The ordered function list of one compilation unit.
///
/// `Program<UnresolvedCallee>` comes out of lowering, `Program<CallTarget>`
/// out of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<C> {
    pub functions: Vec<IrFunction<C>>,
}

impl<C> Default for Program<C> {
    fn default() -> Self {
        Self { functions: Vec::new() }
    }
}

impl<C> Program<C> {
    /// Fails on the first register whose type is still unknown
    pub fn ensure_fully_typed(&self) -> Result<(), UntypedRegister> {
        for func in &self.functions {
            if let Some(reg) = func.reg_types.iter().position(IrType::is_unknown) {
                return Err(UntypedRegister { function: func.name.clone(), reg: Reg(reg) });
            }
        }
        Ok(())
    }
}

impl<C: fmt::Display> fmt::Display for Program<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, func) in self.functions.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", func.disassemble(index))?;
        }
        Ok(())
    }
}

/// A register whose type inference could not determine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("register {reg} in function '{function}' has no inferred type")]
pub struct UntypedRegister {
    pub function: String,
    pub reg: Reg,
}
