//! Fixpoint type inference over resolved programs

use crate::function::{IrFunction, Program};
use crate::instr::{CallTarget, Instr, Reg};
use crate::types::IrType;
use log::debug;

/// Summary of one inference run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceReport {
    /// Full sweeps made, including the final one that changed nothing
    pub sweeps: usize,
    /// Registers that went from unknown to a concrete type
    pub inferred: usize,
}

/// Propagate types through calls and arithmetic until a sweep over every
/// function makes no change. Registers only ever move from `Unknown` to a
/// concrete type, which bounds the number of sweeps.
pub fn infer_types(program: &mut Program<CallTarget>) -> InferenceReport {
    let return_types: Vec<IrType> = program.functions.iter().map(|f| f.return_type).collect();
    let mut report = InferenceReport { sweeps: 0, inferred: 0 };

    loop {
        report.sweeps += 1;
        let changed: usize = program
            .functions
            .iter_mut()
            .map(|func| sweep_function(func, &return_types))
            .sum();

        debug!("[infer] sweep {}: {} registers typed", report.sweeps, changed);
        report.inferred += changed;

        if changed == 0 {
            break;
        }
    }

    report
}

fn sweep_function(func: &mut IrFunction<CallTarget>, return_types: &[IrType]) -> usize {
    let mut changed = 0;

    for i in 0..func.instrs.len() {
        let update = infer_instr(func, &func.instrs[i], return_types);
        if let Some((reg, ty)) = update {
            func.set_reg_type(reg, ty);
            changed += 1;
        }
    }

    changed
}

/// New type for the destination of `instr`, if one can be derived now
fn infer_instr(
    func: &IrFunction<CallTarget>,
    instr: &Instr<CallTarget>,
    return_types: &[IrType],
) -> Option<(Reg, IrType)> {
    match instr {
        Instr::Call { callee, dest, .. } => {
            if !func.reg_type(*dest).is_unknown() {
                return None;
            }
            let ty = match callee {
                CallTarget::Function { index, .. } => return_types.get(*index).copied()?,
                CallTarget::Intrinsic(_) => IrType::Nothing,
            };
            (!ty.is_unknown()).then_some((*dest, ty))
        }
        Instr::Add { lhs, rhs, dest } | Instr::Sub { lhs, rhs, dest } => {
            if !func.reg_type(*dest).is_unknown() {
                return None;
            }
            let lhs = func.reg_type(*lhs).sized_int()?;
            let rhs = func.reg_type(*rhs).sized_int()?;
            Some((*dest, IrType::promote(lhs, rhs)))
        }
        // typed when lowered
        Instr::CmpEq { .. } | Instr::StoreConst { .. } | Instr::StoreArg { .. } | Instr::Phi { .. } => None,
        Instr::CondBranch { .. } | Instr::Branch { .. } | Instr::Return { .. } => None,
    }
}
