//! Set of useful parser combinators

// internal modules
use crate::nuclide::Nuclide;
use r2s_utils::StringExt;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, char, one_of};
use nom::combinator::{all_consuming, map, opt, value};
use nom::error::{Error, ErrorKind};
use nom::multi::many1;
use nom::sequence::{delimited, pair, preceded};
use nom::{self, Err, IResult};

/// Parse string into a usable Nuclide
///
/// Can be:
///     - Element only C0, C
///     - Isotope Co60, C12, co-60
///     - Metastable Ag110_m1 Ag110m1 (chain convention first)
///     - Fispact Ag110m Ag110n
///
/// Full is <element><separator><mass><separator><metastable>
///
/// The mass number is required before any metastable tag, otherwise
/// things like "Nm" are ambiguous.
pub(crate) fn nuclide_from_str(i: &str) -> IResult<&str, Nuclide> {
    let (i, symbol) = element(i)?;
    let (i, _) = opt(separator)(i)?;
    let (i, mass) = opt(mass_number)(i)?;

    // Only look for a metastable tag if it follows a mass number
    let (i, state) = match mass {
        Some(_) => preceded(opt(separator), metastable)(i)?,
        None => (i, 0),
    };

    Ok((
        i,
        Nuclide {
            symbol: symbol.as_symbol(),
            mass: mass.unwrap_or(0),
            state,
        },
    ))
}

/// Get the element symbol
fn element(i: &str) -> IResult<&str, &str> {
    let (rest, element) = alpha1(i)?;

    if element.len() > 2 {
        Err(Err::Error(Error::new(i, ErrorKind::Fail)))
    } else {
        Ok((rest, element))
    }
}

/// Get an unsigned integer value
fn mass_number(i: &str) -> IResult<&str, u16> {
    nom::character::complete::u16(i)
}

/// List of possible separators people may use
fn separator(i: &str) -> IResult<&str, char> {
    one_of("_-")(i)
}

/// Metastable state from the numbered or FISPACT conventions, ground if none
fn metastable(i: &str) -> IResult<&str, u8> {
    map(opt(alt((numbered_isomer, symbol_isomer))), |s| s.unwrap_or(0))(i)
}

/// Isomers in the m1, m2, etc... format
fn numbered_isomer(i: &str) -> IResult<&str, u8> {
    preceded(one_of("mM"), nom::character::complete::u8)(i)
}

/// Isomers from known FISPACT/common use symbols
fn symbol_isomer(i: &str) -> IResult<&str, u8> {
    alt((
        value(0, char('g')),
        value(1, char('m')),
        value(1, char('*')),
        value(2, char('n')),
    ))(i)
}

/// Light particles that may come out of a reaction or decay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ejectile {
    Gamma,
    Neutron,
    Proton,
    Deuteron,
    Triton,
    Helion,
    Alpha,
}

/// Outgoing channel of a neutron reaction string, e.g. `(n,2na)`
///
/// Returns every ejectile with its multiplicity. Anything that is not of the
/// `(n,...)` form, such as `fission`, is an error.
pub(crate) fn reaction_products(i: &str) -> IResult<&str, Vec<(u8, Ejectile)>> {
    all_consuming(delimited(
        tag("("),
        preceded(pair(char('n'), char(',')), many1(counted_ejectile)),
        tag(")"),
    ))(i)
}

/// Ejectiles of a decay mode string, e.g. `beta-,alpha` or `ec/beta+,p`
///
/// Only the particles are returned, the beta/ec/IT parts carry no nucleons.
pub(crate) fn decay_products(i: &str) -> Vec<(u8, Ejectile)> {
    i.split(',')
        .filter_map(|token| {
            let parsed: IResult<&str, (u8, Ejectile)> =
                all_consuming(alt((decay_ejectile, counted_ejectile)))(token.trim());
            parsed.ok().map(|(_, e)| e)
        })
        .collect()
}

/// Particles named in full in decay modes
fn decay_ejectile(i: &str) -> IResult<&str, (u8, Ejectile)> {
    alt((
        value((1, Ejectile::Alpha), tag("alpha")),
        map(pair(nom::character::complete::u8, tag("alpha")), |(n, _)| {
            (n, Ejectile::Alpha)
        }),
    ))(i)
}

/// Optional multiplicity followed by a particle symbol
fn counted_ejectile(i: &str) -> IResult<&str, (u8, Ejectile)> {
    // helions first so that "3He" is not read as three of something
    alt((
        value((1, Ejectile::Helion), tag("3He")),
        pair(
            map(opt(nom::character::complete::u8), |n| n.unwrap_or(1)),
            ejectile_symbol,
        ),
    ))(i)
}

fn ejectile_symbol(i: &str) -> IResult<&str, Ejectile> {
    alt((
        value(Ejectile::Gamma, tag("gamma")),
        value(Ejectile::Neutron, char('n')),
        value(Ejectile::Proton, char('p')),
        value(Ejectile::Deuteron, char('d')),
        value(Ejectile::Triton, char('t')),
        value(Ejectile::Alpha, char('a')),
    ))(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuc(symbol: &str, mass: u16, state: u8) -> Nuclide {
        Nuclide {
            symbol: symbol.to_string(),
            mass,
            state,
        }
    }

    #[test]
    fn chain_names() {
        assert_eq!(nuclide_from_str("Fe56"), Ok(("", nuc("Fe", 56, 0))));
        assert_eq!(nuclide_from_str("Ag110_m1"), Ok(("", nuc("Ag", 110, 1))));
        assert_eq!(nuclide_from_str("C0"), Ok(("", nuc("C", 0, 0))));
        assert_eq!(nuclide_from_str("H1"), Ok(("", nuc("H", 1, 0))));
    }

    #[test]
    fn other_conventions() {
        assert_eq!(nuclide_from_str("co-60"), Ok(("", nuc("Co", 60, 0))));
        assert_eq!(nuclide_from_str("Ag110m"), Ok(("", nuc("Ag", 110, 1))));
        assert_eq!(nuclide_from_str("Ta182n"), Ok(("", nuc("Ta", 182, 2))));
        assert_eq!(nuclide_from_str("Eu152m2"), Ok(("", nuc("Eu", 152, 2))));
        assert_eq!(nuclide_from_str("W"), Ok(("", nuc("W", 0, 0))));
    }

    #[test]
    fn bad_names() {
        assert!(nuclide_from_str("Abc12").is_err());
        assert!(nuclide_from_str("12").is_err());
    }

    #[test]
    fn reaction_channels() {
        assert_eq!(
            reaction_products("(n,gamma)").unwrap().1,
            vec![(1, Ejectile::Gamma)]
        );
        assert_eq!(
            reaction_products("(n,2n)").unwrap().1,
            vec![(2, Ejectile::Neutron)]
        );
        assert_eq!(
            reaction_products("(n,np)").unwrap().1,
            vec![(1, Ejectile::Neutron), (1, Ejectile::Proton)]
        );
        assert_eq!(
            reaction_products("(n,3He)").unwrap().1,
            vec![(1, Ejectile::Helion)]
        );
        assert_eq!(
            reaction_products("(n,n2a)").unwrap().1,
            vec![(1, Ejectile::Neutron), (2, Ejectile::Alpha)]
        );
        assert!(reaction_products("fission").is_err());
        assert!(reaction_products("(n,x)").is_err());
    }

    #[test]
    fn decay_channels() {
        assert!(decay_products("beta-").is_empty());
        assert_eq!(decay_products("alpha"), vec![(1, Ejectile::Alpha)]);
        assert_eq!(
            decay_products("beta-,n"),
            vec![(1, Ejectile::Neutron)]
        );
        assert_eq!(decay_products("ec/beta+,p"), vec![(1, Ejectile::Proton)]);
        assert_eq!(decay_products("beta-,2alpha"), vec![(2, Ejectile::Alpha)]);
    }
}
