//! Lexical scopes and branch shadows used while lowering one function body

use crate::error::{IrError, IrResult};
use crate::instr::Reg;
use alang_lexer::Span;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Frame {
    vars: HashMap<String, Reg>,
}

/// Reassignments made inside one arm of a conditional.
#[derive(Debug)]
struct Shadow {
    /// Number of frames that existed when the arm was opened
    depth: usize,
    bindings: HashMap<String, Reg>,
    /// Every reassignment in order, duplicates included
    log: Vec<(String, Reg)>,
}

/// Maps variable names to registers.
///
/// Frames are kept in a stack indexed from the outermost scope. A shadow
/// overlays the frames below its `depth`: reassigning a variable declared
/// there while the shadow is open only touches the shadow, so closing it
/// restores the pre-branch bindings.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    frames: Vec<Frame>,
    shadows: Vec<Shadow>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn leave_scope(&mut self) {
        self.frames.pop();
    }

    pub fn declare(&mut self, name: &str, reg: Reg, span: Span) -> IrResult<()> {
        if self.frames.is_empty() {
            self.enter_scope();
        }
        let last = self.frames.len() - 1;
        let frame = &mut self.frames[last];

        if frame.vars.contains_key(name) {
            return Err(IrError::DuplicateDeclaration { name: name.to_string(), span });
        }
        frame.vars.insert(name.to_string(), reg);
        Ok(())
    }

    pub fn resolve(&self, name: &str, span: Span) -> IrResult<Reg> {
        let mut top = self.frames.len();

        for shadow in self.shadows.iter().rev() {
            // frames opened inside this arm hide the shadow
            let inner = &self.frames[shadow.depth.min(top)..top];
            if let Some(reg) = inner.iter().rev().find_map(|f| f.vars.get(name)) {
                return Ok(*reg);
            }
            if let Some(reg) = shadow.bindings.get(name) {
                return Ok(*reg);
            }
            top = top.min(shadow.depth);
        }

        self.frames[..top]
            .iter()
            .rev()
            .find_map(|f| f.vars.get(name))
            .copied()
            .ok_or_else(|| IrError::UndeclaredVariable { name: name.to_string(), span })
    }

    pub fn reassign(&mut self, name: &str, reg: Reg, span: Span) -> IrResult<()> {
        let owner = self
            .frames
            .iter()
            .rposition(|f| f.vars.contains_key(name))
            .ok_or_else(|| IrError::UndeclaredVariable { name: name.to_string(), span })?;

        match self.shadows.last_mut() {
            Some(shadow) if shadow.depth > owner => {
                shadow.bindings.insert(name.to_string(), reg);
                shadow.log.push((name.to_string(), reg));
            }
            _ => {
                self.frames[owner].vars.insert(name.to_string(), reg);
            }
        }
        Ok(())
    }

    pub fn begin_branch(&mut self) {
        self.shadows.push(Shadow {
            depth: self.frames.len(),
            bindings: HashMap::new(),
            log: Vec::new(),
        });
    }

    /// Close the innermost shadow and return its reassignment log
    pub fn end_branch(&mut self) -> Vec<(String, Reg)> {
        self.shadows.pop().map(|s| s.log).unwrap_or_default()
    }
}
