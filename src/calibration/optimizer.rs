//! Box-constrained Nelder-Mead simplex minimizer
//!
//! Reference: Nelder and Mead (1965), simplex direct search.
//! Trial points are clamped into the box; the objective may return +inf to
//! reject a point, which simply ranks it worst.

use crate::error::CalibrationError;

/// Lower/upper bounds per coordinate
#[derive(Debug, Clone)]
pub struct BoxConstraints {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl BoxConstraints {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, CalibrationError> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(CalibrationError::InvalidSetup(
                "bounds need equal, non-zero lower/upper dimensions".to_string(),
            ));
        }
        for i in 0..lower.len() {
            if !lower[i].is_finite() || !upper[i].is_finite() || lower[i] > upper[i] {
                return Err(CalibrationError::InvalidSetup(format!(
                    "invalid bound at index {i}: [{}, {}]",
                    lower[i], upper[i]
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, v)| v.clamp(self.lower[i], self.upper[i]))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NelderMeadOptions {
    pub max_iterations: usize,
    /// Initial vertex offset as a fraction of |x0| (absolute if x0 is 0)
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Absolute tolerance on the spread of objective values
    pub f_tolerance: f64,
    /// Absolute tolerance on the distance of vertices from the best vertex
    pub x_tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            initial_step: 0.1,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            f_tolerance: 1e-9,
            x_tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimisationResult {
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

pub fn nelder_mead<F>(
    initial: &[f64],
    bounds: &BoxConstraints,
    options: NelderMeadOptions,
    mut objective_fn: F,
) -> Result<OptimisationResult, CalibrationError>
where
    F: FnMut(&[f64]) -> f64,
{
    let dim = bounds.dimension();
    if initial.len() != dim {
        return Err(CalibrationError::InvalidSetup(
            "initial vector dimension does not match bounds".to_string(),
        ));
    }

    let mut evaluations = 0usize;
    let mut eval = |x: &[f64]| {
        evaluations += 1;
        let value = objective_fn(x);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let x0 = bounds.clamp(initial);
    let mut simplex = Vec::with_capacity(dim + 1);
    let mut values = Vec::with_capacity(dim + 1);
    values.push(eval(&x0));
    simplex.push(x0.clone());

    for d in 0..dim {
        let mut x = x0.clone();
        let step = if x0[d] != 0.0 {
            options.initial_step * x0[d].abs()
        } else {
            options.initial_step
        };
        x[d] = (x0[d] + step).min(bounds.upper[d]);
        if (x[d] - x0[d]).abs() < 1e-14 {
            x[d] = (x0[d] - step).max(bounds.lower[d]);
        }
        values.push(eval(&x));
        simplex.push(x);
    }

    let mut iterations = 0usize;
    let mut converged = false;

    for iter in 0..options.max_iterations {
        iterations = iter + 1;

        let mut order: Vec<usize> = (0..simplex.len()).collect();
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let spread = values[dim] - values[0];
        let max_vertex_dist = simplex[1..]
            .iter()
            .map(|x| {
                x.iter()
                    .zip(simplex[0].iter())
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0_f64, f64::max)
            })
            .fold(0.0_f64, f64::max);

        if values[0].is_finite()
            && spread <= options.f_tolerance
            && max_vertex_dist <= options.x_tolerance
        {
            converged = true;
            break;
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|d| simplex.iter().take(dim).map(|x| x[d]).sum::<f64>() / dim as f64)
            .collect();

        let xr = bounds.clamp(
            &(0..dim)
                .map(|d| centroid[d] + options.reflection * (centroid[d] - simplex[dim][d]))
                .collect::<Vec<_>>(),
        );
        let fr = eval(&xr);

        if fr < values[0] {
            let xe = bounds.clamp(
                &(0..dim)
                    .map(|d| centroid[d] + options.expansion * (xr[d] - centroid[d]))
                    .collect::<Vec<_>>(),
            );
            let fe = eval(&xe);
            if fe < fr {
                simplex[dim] = xe;
                values[dim] = fe;
            } else {
                simplex[dim] = xr;
                values[dim] = fr;
            }
            continue;
        }

        if fr < values[dim - 1] {
            simplex[dim] = xr;
            values[dim] = fr;
            continue;
        }

        let xc = bounds.clamp(
            &(0..dim)
                .map(|d| centroid[d] + options.contraction * (simplex[dim][d] - centroid[d]))
                .collect::<Vec<_>>(),
        );
        let fc = eval(&xc);
        if fc < values[dim] {
            simplex[dim] = xc;
            values[dim] = fc;
            continue;
        }

        for i in 1..=dim {
            let shrunk: Vec<f64> = (0..dim)
                .map(|d| simplex[0][d] + options.shrink * (simplex[i][d] - simplex[0][d]))
                .collect();
            simplex[i] = bounds.clamp(&shrunk);
            values[i] = eval(&simplex[i]);
        }
    }

    let best = (0..values.len())
        .min_by(|&i, &j| values[i].total_cmp(&values[j]))
        .unwrap_or(0);

    Ok(OptimisationResult {
        x: simplex[best].clone(),
        objective: values[best],
        iterations,
        evaluations,
        converged,
    })
}
