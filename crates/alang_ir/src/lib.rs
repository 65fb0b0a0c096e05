//! Register-based IR for ALang
//!
//! Generation runs in three stages over a parsed source file:
//! - lowering walks the AST and emits per-function instruction lists, with
//!   phi instructions at every `if` merge point and calls still by name
//! - resolution turns by-name calls into function indices or intrinsics
//! - inference propagates integer types to a fixpoint
//!
//! Lowered and resolved programs differ in their callee type, so a resolved
//! program cannot hold a by-name call.

mod error;
mod function;
mod infer;
mod instr;
mod lower;
mod resolve;
mod scope;
mod types;

pub use error::{IrError, IrResult};
pub use function::{IrFunction, IrParam, Program, UntypedRegister};
pub use infer::{infer_types, InferenceReport};
pub use instr::{BranchId, CallTarget, Instr, Intrinsic, Reg, UnresolvedCallee, INTRINSICS};
pub use lower::{lower_program, map_type_name};
pub use resolve::resolve_program;
pub use scope::ScopeTracker;
pub use types::{IrType, DEFAULT_INT_BITS};

use alang_ast::SourceFile;
use log::debug;

/// Lower, resolve and infer types for a whole source file.
///
/// Registers inference cannot type stay `Unknown`; see
/// [`Program::ensure_fully_typed`].
pub fn generate(file: &SourceFile) -> IrResult<Program<CallTarget>> {
    let lowered = lower_program(file)?;
    let mut program = resolve_program(lowered)?;
    let report = infer_types(&mut program);
    debug!(
        "[ir] generated {} functions, inference took {} sweeps",
        program.functions.len(),
        report.sweeps
    );
    Ok(program)
}
