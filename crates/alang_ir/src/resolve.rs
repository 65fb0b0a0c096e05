//! Turn by-name calls into indexed calls
//!
//! Runs once every function has been lowered, so a call may name a function
//! declared further down the file.

use crate::error::{IrError, IrResult};
use crate::function::Program;
use crate::instr::{CallTarget, Intrinsic, UnresolvedCallee};
use log::debug;

pub fn resolve_program(program: Program<UnresolvedCallee>) -> IrResult<Program<CallTarget>> {
    let names: Vec<String> = program.functions.iter().map(|f| f.name.clone()).collect();

    let functions = program
        .functions
        .into_iter()
        .map(|func| {
            let caller = func.name.clone();
            func.try_map_calls(|callee| -> IrResult<CallTarget> {
                let target = resolve_callee(&names, callee)?;
                debug!("[resolve] {}: call resolved to {}", caller, target);
                Ok(target)
            })
        })
        .collect::<IrResult<Vec<_>>>()?;

    Ok(Program { functions })
}

/// Intrinsics win over user functions; among functions the first
/// declaration with the exact name wins.
fn resolve_callee(names: &[String], callee: UnresolvedCallee) -> IrResult<CallTarget> {
    if let Some(intrinsic) = Intrinsic::lookup(&callee.name) {
        return Ok(CallTarget::Intrinsic(intrinsic));
    }

    match names.iter().position(|n| *n == callee.name) {
        Some(index) => Ok(CallTarget::Function { index, name: callee.name }),
        None => Err(IrError::UnresolvedFunction { name: callee.name, span: callee.span }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alang_lexer::Span;

    fn callee(name: &str) -> UnresolvedCallee {
        UnresolvedCallee { name: name.into(), span: Span::new(4, 9) }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_intrinsic_shadows_user_function() {
        let target = resolve_callee(&names(&["print"]), callee("print")).unwrap();
        assert_eq!(target, CallTarget::Intrinsic(Intrinsic::Print));
        assert_eq!(target.index(), -1);
    }

    #[test]
    fn test_first_declaration_wins() {
        let target = resolve_callee(&names(&["f", "g", "g"]), callee("g")).unwrap();
        assert_eq!(target, CallTarget::Function { index: 1, name: "g".into() });
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let err = resolve_callee(&names(&["Foo"]), callee("foo")).unwrap_err();
        assert_eq!(err, IrError::UnresolvedFunction { name: "foo".into(), span: Span::new(4, 9) });
    }
}
