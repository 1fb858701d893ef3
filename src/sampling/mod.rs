/////////////////////////////////////////////////////////////////////////////////////
//
// Outbreak model
//
// sampling module
//
// approximate binomial and poisson draws used by the population evolution
// engine.  A draw converts a population count and a per-individual event
// probability into a random outcome count without materializing one
// Bernoulli trial per individual.
//
// All draws take an explicit generator so that each simulation can own its
// own seeded stream and replay deterministically.
//
////////////////////////////////////////////////////////////////////////////////////

use rand::Rng;

use crate::errors::EpiError;

// Outcome probability cutoff for approximating the binomial distribution
// as a Poisson distribution
pub const POISSON_CUTOFF: f64 = 0.1;

// Standard-deviation to mean ratio cutoff for approximating the binomial
// distribution as a Gaussian distribution
pub const GAUSSIAN_CUTOFF: f64 = 0.5;

// Max attempts in the Poisson accept-reject method before we assume the
// uniform generator is broken
pub const POISSON_MAX_STEPS: usize = 1024;

// Draw an approximation of Binomial(n, p).  Always returns a value in
// [0, n].  The Poisson and Gaussian regimes are asymptotic approximations;
// callers must not rely on exact distributional correctness for small n.
pub fn draw_binomial<R: Rng>(rng: &mut R, p: f64, n: u64) -> Result<u64, EpiError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(EpiError::InvalidArgs);
    }

    // Edge case, p == 0 or n == 0
    if p * n as f64 == 0.0 {
        return Ok(0);
    }

    // Work with the smaller probability, mirror the result back at the end
    let mut p = p;
    let mut swap = false;
    if p > 0.5 {
        p = 1.0 - p;
        // Edge case, p == 1 (before the swap)
        // <= instead of == in case of rounding error in the subtraction
        if p * n as f64 <= 0.0 {
            return Ok(n);
        }
        swap = true;
    }

    let result = if p <= POISSON_CUTOFF {
        // p << 1: use Poisson sampling, retry if we end up with k > n
        // (unlikely)
        loop {
            let k = draw_poisson(rng, p * n as f64)?;
            if k <= n {
                break k;
            }
        }
    } else {
        let ev = p * n as f64;
        let std = (ev * (1.0 - p)).sqrt();

        if std <= ev * GAUSSIAN_CUTOFF {
            // standard deviation of k << <k>: use Gaussian sampling, retry
            // if we end up with k < 0 or k > n
            loop {
                let z = ev + std * rand_normal(rng);
                if z < 0.0 {
                    continue;
                }
                let k = z as u64;
                if k <= n {
                    break k;
                }
            }
        } else {
            // If we are here, n is provably small:
            // n < 1/(GAUSSIAN_CUTOFF^2 * POISSON_CUTOFF)
            // Clever algorithms like BTPE could squeeze out some extra
            // performance, but plain Monte Carlo is fine at this scale
            let mut k = 0;
            for _ in 0..n {
                if rng.gen::<f64>() < p {
                    k += 1;
                }
            }
            k
        }
    };

    Ok(if swap { n - result } else { result })
}

// Split n trials between two mutually exclusive events x and y (plus
// "neither").  Returns (n_x, n_y) with n_x + n_y <= n.
pub fn draw_binomial_split<R: Rng>(
    rng: &mut R,
    p_x: f64,
    p_y: f64,
    n: u64,
) -> Result<(u64, u64), EpiError> {
    if p_x < 0.0 || p_y < 0.0 || p_x + p_y > 1.0 {
        return Err(EpiError::InvalidArgs);
    }

    // Probability of either event
    let p_xy = p_x + p_y;

    // Edge case: zero events expected
    if p_xy * n as f64 == 0.0 {
        return Ok((0, 0));
    }

    // Combined event count
    let n_xy = draw_binomial(rng, p_xy, n)?;
    if n_xy == 0 {
        return Ok((0, 0));
    }

    // Edge case: one of the probabilities is zero.  Also avoids the
    // division below.
    if p_x == 0.0 {
        return Ok((0, n_xy));
    }
    if p_y == 0.0 {
        return Ok((n_xy, 0));
    }

    // Probability of x, given that either x or y occurred
    let n_x = draw_binomial(rng, p_x / p_xy, n_xy)?;
    Ok((n_x, n_xy - n_x))
}

// Draw an approximation of Poisson(rate).
//
// Low rates use Knuth's product-of-uniforms algorithm.  High rates use the
// transformed rejection method (Atkinson-style accept-reject on a logistic
// envelope), bounded at POISSON_MAX_STEPS attempts.
pub fn draw_poisson<R: Rng>(rng: &mut R, rate: f64) -> Result<u64, EpiError> {
    if rate < 0.0 || !rate.is_finite() {
        return Err(EpiError::InvalidArgs);
    }
    if rate == 0.0 {
        return Ok(0);
    }

    if rate > 30.0 {
        let c = 0.767 - 3.36 / rate;
        let b = std::f64::consts::PI / (3.0 * rate).sqrt();
        let a = b * rate;
        let z = (c / b).ln() - rate;

        for _ in 0..POISSON_MAX_STEPS {
            let u = rng.gen::<f64>();
            if u == 0.0 {
                continue;
            }
            let v = 1.0 - u;

            let x = (a - (v / u).ln()) / b;

            // Reject negative results
            if x + 0.5 <= 0.0 {
                continue;
            }
            let k = (x + 0.5) as u64;

            // Main rejection step
            let w = rng.gen::<f64>();
            if w == 0.0 {
                continue;
            }
            let y = a - b * x;
            let mut d = 1.0 + y.exp();
            d *= d;
            if y + (w / d).ln() <= z + k as f64 * rate.ln() - ln_factorial(k) {
                return Ok(k);
            }
        }
    }

    // Either the rate is low, or the accept-reject loop above failed
    // (which should be astronomically improbable)
    let threshold = (-rate).exp();

    // Rate is too high for the product of uniforms to ever cross the
    // threshold; with the accept-reject loop already exhausted there is
    // nothing sensible left to do
    if threshold == 0.0 {
        return Err(EpiError::UnexpectedState);
    }

    // Knuth algorithm
    let mut k: u64 = 0;
    let mut product = 1.0;
    loop {
        k += 1;
        product *= rng.gen::<f64>();
        if product <= threshold {
            break;
        }
    }
    Ok(k - 1)
}

// Standard normal variate via Marsaglia's polar rejection method
pub fn rand_normal<R: Rng>(rng: &mut R) -> f64 {
    loop {
        let x = 2.0 * rng.gen::<f64>() - 1.0;
        let y = 2.0 * rng.gen::<f64>() - 1.0;
        let r2 = x * x + y * y;
        if r2 < 1.0 && r2 > 0.0 {
            return x * (-2.0 * r2.ln() / r2).sqrt();
        }
    }
}

// ln(k!), exact log-sum for small k, Stirling series beyond
fn ln_factorial(k: u64) -> f64 {
    if k < 2 {
        return 0.0;
    }
    if k <= 32 {
        return (2..=k).map(|i| (i as f64).ln()).sum();
    }
    let n = k as f64;
    (n + 0.5) * n.ln() - n + 0.5 * (2.0 * std::f64::consts::PI).ln() + 1.0 / (12.0 * n)
        - 1.0 / (360.0 * n * n * n)
}
