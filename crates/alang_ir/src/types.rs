//! Register type lattice

use std::fmt;

/// Width given to integer literals that carry no suffix
pub const DEFAULT_INT_BITS: u32 = 16;

/// The type of a virtual register while the IR is being generated.
///
/// `Unknown` is the only non-final state: inference may replace it with a
/// concrete type, never the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IrType {
    #[default]
    Unknown,
    /// `bits` is `None` when the width is unspecified
    Integer { signed: bool, bits: Option<u32> },
    Bool,
    Nothing,
}

impl IrType {
    pub fn int(signed: bool, bits: u32) -> Self {
        IrType::Integer { signed, bits: Some(bits) }
    }

    /// Type of an integer literal
    pub fn default_int() -> Self {
        IrType::int(true, DEFAULT_INT_BITS)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, IrType::Unknown)
    }

    /// Signedness and width, when this is an integer of known width
    pub fn sized_int(&self) -> Option<(bool, u32)> {
        match *self {
            IrType::Integer { signed, bits: Some(bits) } => Some((signed, bits)),
            _ => None,
        }
    }

    /// Result type of `+`/`-` on two sized integers.
    ///
    /// The width is the larger operand width and the result is signed if
    /// either side is. When the operands disagree on both signedness and
    /// width the width doubles, so the unsigned side still fits.
    pub fn promote(lhs: (bool, u32), rhs: (bool, u32)) -> IrType {
        let (l_signed, l_bits) = lhs;
        let (r_signed, r_bits) = rhs;

        let mut bits = l_bits.max(r_bits);
        let signed = l_signed || r_signed;
        if l_signed != r_signed && l_bits != r_bits {
            bits *= 2;
        }

        IrType::int(signed, bits)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Unknown => write!(f, "unknown"),
            IrType::Integer { signed, bits } => {
                let prefix = if *signed { 'i' } else { 'u' };
                match bits {
                    Some(bits) => write!(f, "{}{}", prefix, bits),
                    None => write!(f, "{}?", prefix),
                }
            }
            IrType::Bool => write!(f, "bool"),
            IrType::Nothing => write!(f, "nothing"),
        }
    }
}
