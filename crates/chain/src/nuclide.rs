// crate modules
use crate::error::{Error, Result};
use crate::parsers::nuclide_from_str;

// r2s modules
use r2s_utils::f;

/// Nuclide identity as used for chain lookups
///
/// Names follow the depletion chain convention of `<symbol><mass>_m<state>`,
/// with elemental entries written with a mass number of zero (e.g. `C0`).
///
/// Anything the parser understands can be converted, so `co-60`, `Ag110m`
/// and `Ag110_m1` are all valid inputs.
///
/// ```rust
/// # use r2s_chain::Nuclide;
/// # use std::str::FromStr;
/// let nuclide = Nuclide::from_str("ag110m").unwrap();
/// assert_eq!(nuclide.name(), "Ag110_m1");
/// assert_eq!(nuclide.mass, 110);
///
/// let carbon = Nuclide::from_str("C").unwrap();
/// assert_eq!(carbon.name(), "C0");
/// assert!(carbon.is_element());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nuclide {
    /// Element symbol e.g. 'He', 'Co'
    pub symbol: String,
    /// Atomic mass number, zero for natural elements
    pub mass: u16,
    /// Metastable state, zero for the ground state
    pub state: u8,
}

impl Nuclide {
    /// Name in the chain convention
    pub fn name(&self) -> String {
        match self.state {
            0 => f!("{}{}", self.symbol, self.mass),
            s => f!("{}{}_m{}", self.symbol, self.mass, s),
        }
    }

    /// True for elemental entries such as `C0`
    pub fn is_element(&self) -> bool {
        self.mass == 0
    }
}

impl std::str::FromStr for Nuclide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match nuclide_from_str(s.trim()) {
            Ok(("", nuclide)) => Ok(nuclide),
            _ => Err(Error::ParseError(f!("could not interpret \"{s}\" as a nuclide"))),
        }
    }
}

impl std::fmt::Display for Nuclide {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Normalise any nuclide spelling to the chain convention
///
/// Strings that do not parse are passed through untouched so that exotic
/// chain entries can still be looked up by their literal name.
pub fn normalise_name(name: &str) -> String {
    name.parse::<Nuclide>()
        .map(|n| n.name())
        .unwrap_or_else(|_| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_convention() {
        assert_eq!(normalise_name("Fe56"), "Fe56");
        assert_eq!(normalise_name("fe-56"), "Fe56");
        assert_eq!(normalise_name("Ta182n"), "Ta182_m2");
        assert_eq!(normalise_name("Co58_m1"), "Co58_m1");
    }

    #[test]
    fn trailing_junk_is_rejected() {
        assert!("Fe56x".parse::<Nuclide>().is_err());
        assert_eq!(normalise_name("Fe56x"), "Fe56x");
    }
}
