//! IR instructions

use alang_lexer::Span;
use num_bigint::BigInt;
use std::fmt;

/// A virtual register, local to its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub usize);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg{}", self.0)
    }
}

/// A branch label, local to its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "br{}", self.0)
    }
}

/// Callee of a call that has not been through resolution yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedCallee {
    pub name: String,
    /// Span of the whole call expression
    pub span: Span,
}

impl fmt::Display for UnresolvedCallee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Built-in operations callable like functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Print,
}

/// Names checked before user functions during resolution
pub const INTRINSICS: &[(&str, Intrinsic)] = &[("print", Intrinsic::Print)];

impl Intrinsic {
    pub fn lookup(name: &str) -> Option<Intrinsic> {
        INTRINSICS.iter().find(|(n, _)| *n == name).map(|(_, i)| *i)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intrinsic::Print => "print",
        }
    }

    /// Reserved call index; user functions are numbered from 0
    pub fn index(&self) -> isize {
        match self {
            Intrinsic::Print => -1,
        }
    }
}

/// Callee of a resolved call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Index into the program's function list
    Function { index: usize, name: String },
    Intrinsic(Intrinsic),
}

impl CallTarget {
    pub fn index(&self) -> isize {
        match self {
            CallTarget::Function { index, .. } => *index as isize,
            CallTarget::Intrinsic(intrinsic) => intrinsic.index(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CallTarget::Function { name, .. } => name,
            CallTarget::Intrinsic(intrinsic) => intrinsic.name(),
        }
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index(), self.name())
    }
}

/// One IR operation. `C` is the callee representation of `Call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr<C> {
    StoreConst { value: BigInt, dest: Reg },
    StoreArg { index: usize, dest: Reg },
    Add { lhs: Reg, rhs: Reg, dest: Reg },
    Sub { lhs: Reg, rhs: Reg, dest: Reg },
    CmpEq { lhs: Reg, rhs: Reg, dest: Reg },
    Call { callee: C, args: Vec<Reg>, dest: Reg },
    CondBranch { cond: Reg, then_branch: BranchId, else_branch: BranchId },
    /// Jump to a merge point
    Branch { target: BranchId },
    /// Merge of two values, one per incoming branch
    Phi { first: (BranchId, Reg), second: (BranchId, Reg), dest: Reg },
    Return { value: Option<Reg> },
}

impl<C> Instr<C> {
    /// Register written by this instruction, if any
    pub fn dest(&self) -> Option<Reg> {
        match self {
            Instr::StoreConst { dest, .. }
            | Instr::StoreArg { dest, .. }
            | Instr::Add { dest, .. }
            | Instr::Sub { dest, .. }
            | Instr::CmpEq { dest, .. }
            | Instr::Call { dest, .. }
            | Instr::Phi { dest, .. } => Some(*dest),
            Instr::CondBranch { .. } | Instr::Branch { .. } | Instr::Return { .. } => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::StoreConst { .. } => "const",
            Instr::StoreArg { .. } => "arg",
            Instr::Add { .. } => "add",
            Instr::Sub { .. } => "sub",
            Instr::CmpEq { .. } => "cmpeq",
            Instr::Call { .. } => "call",
            Instr::CondBranch { .. } => "condbr",
            Instr::Branch { .. } => "br",
            Instr::Phi { .. } => "phi",
            Instr::Return { .. } => "ret",
        }
    }

    /// Rebuild the instruction with a different callee representation.
    /// Fails with the first error returned by `f`.
    pub fn try_map_callee<D, E>(self, f: impl FnOnce(C) -> Result<D, E>) -> Result<Instr<D>, E> {
        Ok(match self {
            Instr::StoreConst { value, dest } => Instr::StoreConst { value, dest },
            Instr::StoreArg { index, dest } => Instr::StoreArg { index, dest },
            Instr::Add { lhs, rhs, dest } => Instr::Add { lhs, rhs, dest },
            Instr::Sub { lhs, rhs, dest } => Instr::Sub { lhs, rhs, dest },
            Instr::CmpEq { lhs, rhs, dest } => Instr::CmpEq { lhs, rhs, dest },
            Instr::Call { callee, args, dest } => Instr::Call { callee: f(callee)?, args, dest },
            Instr::CondBranch { cond, then_branch, else_branch } => {
                Instr::CondBranch { cond, then_branch, else_branch }
            }
            Instr::Branch { target } => Instr::Branch { target },
            Instr::Phi { first, second, dest } => Instr::Phi { first, second, dest },
            Instr::Return { value } => Instr::Return { value },
        })
    }
}

impl<C: fmt::Display> fmt::Display for Instr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dest) = self.dest() {
            write!(f, "{} <- ", dest)?;
        }
        write!(f, "{}", self.mnemonic())?;

        match self {
            Instr::StoreConst { value, .. } => write!(f, " {}", value),
            Instr::StoreArg { index, .. } => write!(f, " {}", index),
            Instr::Add { lhs, rhs, .. } | Instr::Sub { lhs, rhs, .. } | Instr::CmpEq { lhs, rhs, .. } => {
                write!(f, " {}, {}", lhs, rhs)
            }
            Instr::Call { callee, args, .. } => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, " {}({})", callee, args)
            }
            Instr::CondBranch { cond, then_branch, else_branch } => {
                write!(f, " {}, {}, {}", cond, then_branch, else_branch)
            }
            Instr::Branch { target } => write!(f, " {}", target),
            Instr::Phi { first, second, .. } => {
                write!(f, " [{}: {}], [{}: {}]", first.0, first.1, second.0, second.1)
            }
            Instr::Return { value: Some(value) } => write!(f, " {}", value),
            Instr::Return { value: None } => Ok(()),
        }
    }
}
