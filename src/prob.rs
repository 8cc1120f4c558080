use crate::error::Error;
use statrs::function::erf::{erf, erfc};
use std::{f64::consts::SQRT_2, fmt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rarity {
    pub sigmas: f64,
    /// Probability mass within `[-sigmas, +sigmas]`.
    pub p_within: f64,
    /// One-tailed exceedance probability, `(1 - p_within) / 2`.
    pub p_tail: f64,
    /// Reciprocal of `p_tail`: the value is a "1 in N" event. Infinite when
    /// `p_tail` underflows.
    pub one_in: f64,
}

/// Estimate how rare a deviation of `sigmas` standard deviations is.
///
/// `p_within` is `Φ(s) − Φ(−s)`, evaluated as `erf(s/√2)`. The tail is
/// evaluated with `erfc` so that it keeps full precision for large `s`.
/// `statrs` evaluates both to about 1e-11, so digits of the 20-decimal
/// `p_within` printout past that point carry no information.
///
/// # Errors
/// Returns [`Error::InvalidSigma`] if `sigmas` is negative or not finite.
pub fn estimate(sigmas: f64) -> Result<Rarity, Error> {
    if !sigmas.is_finite() || sigmas < 0.0 {
        return Err(Error::InvalidSigma(sigmas));
    }

    let z = sigmas / SQRT_2;
    let p_within = erf(z);
    let p_tail = 0.5 * erfc(z);

    Ok(Rarity {
        sigmas,
        p_within,
        p_tail,
        one_in: 1.0 / p_tail,
    })
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sigmas: {}", self.sigmas)?;
        writeln!(f, "p_within: {:.20}", self.p_within)?;
        writeln!(f, "p_tail: {:e}", self.p_tail)?;
        if self.one_in.is_finite() {
            write!(f, "rarity: 1 in {:.0}", self.one_in.round())
        } else {
            write!(f, "rarity: 1 in N, N beyond {:e}", f64::MAX)
        }
    }
}
