//! The kernel registry: name → declared argument list → function.

use crate::{growth, math, mortality, nutrients, photosynthesis, predation, remineralization};

/// Uniform calling convention for registered kernels.
///
/// The slice length always equals the kernel's declared arity; the tracer
/// compiler checks this before any kernel is called.
pub type KernelFn = fn(&[f64]) -> f64;

/// Largest arity any callable (kernel or helper) may declare.
///
/// Evaluators keep call arguments in a stack buffer of this size.
pub const MAX_KERNEL_ARITY: usize = 8;

/// A named kernel with its declared argument list.
#[derive(Debug, Clone, Copy)]
pub struct KernelSpec {
    /// Name used at call sites in tracer expressions.
    pub name: &'static str,
    /// Declared argument names, in call order.
    pub parameters: &'static [&'static str],
    /// Uniform entry point.
    pub function: KernelFn,
}

impl KernelSpec {
    /// Number of arguments the kernel takes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Calls the kernel, or returns `None` when `args.len()` differs from
    /// [`arity`](Self::arity).
    #[must_use]
    pub fn call(&self, args: &[f64]) -> Option<f64> {
        (args.len() == self.arity()).then(|| (self.function)(args))
    }
}

macro_rules! kernel {
    ($name:literal, [$($param:literal),* $(,)?], $function:expr) => {
        KernelSpec {
            name: $name,
            parameters: &[$($param),*],
            function: $function,
        }
    };
}

/// Every kernel callable from a tracer expression.
pub static KERNELS: &[KernelSpec] = &[
    // Nutrients
    kernel!("monod_limitation", ["R", "k"], |a| nutrients::monod_limitation(a[0], a[1])),
    // Photosynthesis
    kernel!("light_limitation_smith", ["PAR", "alpha", "mu0"], |a| {
        photosynthesis::light_limitation_smith(a[0], a[1], a[2])
    }),
    kernel!(
        "light_limitation_geider",
        ["PAR", "maximum_growth_rate", "photosynthetic_slope", "chlorophyll_to_carbon_ratio"],
        |a| photosynthesis::light_limitation_geider(a[0], a[1], a[2], a[3])
    ),
    kernel!(
        "light_limitation_darwin",
        ["I", "k_saturation", "k_inhibition", "light_penalty"],
        |a| photosynthesis::light_limitation_darwin(a[0], a[1], a[2], a[3])
    ),
    kernel!(
        "photosynthetic_growth_single_nutrient",
        ["N", "P", "PAR", "mu0", "kn", "alpha"],
        |a| photosynthesis::photosynthetic_growth_single_nutrient(a[0], a[1], a[2], a[3], a[4], a[5])
    ),
    kernel!(
        "photosynthetic_growth_single_nutrient_geider_light",
        [
            "N",
            "P",
            "PAR",
            "maximum_growth_rate",
            "kn",
            "photosynthetic_slope",
            "chlorophyll_to_carbon_ratio",
        ],
        |a| photosynthesis::photosynthetic_growth_single_nutrient_geider_light(
            a[0], a[1], a[2], a[3], a[4], a[5], a[6]
        )
    ),
    // Growth
    kernel!(
        "carbon_specific_growth",
        [
            "pc_max",
            "nutrient_limitation",
            "light_limitation",
            "temperature_limitation",
            "co2_limitation",
        ],
        |a| growth::carbon_specific_growth(a[0], a[1], a[2], a[3], a[4])
    ),
    // Mortality
    kernel!("linear_loss", ["P", "l"], |a| mortality::linear_loss(a[0], a[1])),
    kernel!("quadratic_loss", ["P", "l"], |a| mortality::quadratic_loss(a[0], a[1])),
    // Predation
    kernel!("holling_type_2", ["R", "k"], |a| predation::holling_type_2(a[0], a[1])),
    kernel!("predation_loss_idealized", ["P", "Z", "g_max", "k_p"], |a| {
        predation::predation_loss_idealized(a[0], a[1], a[2], a[3])
    }),
    kernel!("predation_gain_idealized", ["P", "Z", "beta", "g_max", "k_p"], |a| {
        predation::predation_gain_idealized(a[0], a[1], a[2], a[3], a[4])
    }),
    kernel!(
        "predation_assimilation_loss_idealized",
        ["P", "Z", "beta", "g_max", "k_p"],
        |a| predation::predation_assimilation_loss_idealized(a[0], a[1], a[2], a[3], a[4])
    ),
    kernel!(
        "predation_loss_preferential",
        ["P", "Z", "g_max", "k_p", "palatability"],
        |a| predation::predation_loss_preferential(a[0], a[1], a[2], a[3], a[4])
    ),
    kernel!(
        "predation_gain_preferential",
        ["P", "Z", "beta", "g_max", "k_p", "palatability"],
        |a| predation::predation_gain_preferential(a[0], a[1], a[2], a[3], a[4], a[5])
    ),
    kernel!(
        "predation_assimilation_loss_preferential",
        ["P", "Z", "beta", "g_max", "k_p", "palatability"],
        |a| predation::predation_assimilation_loss_preferential(a[0], a[1], a[2], a[3], a[4], a[5])
    ),
    // Remineralization
    kernel!("remineralization_idealized", ["D", "r"], |a| {
        remineralization::remineralization_idealized(a[0], a[1])
    }),
    // Elementary functions
    kernel!("exp", ["x"], |a| math::exp(a[0])),
    kernel!("log", ["x"], |a| math::log(a[0])),
    kernel!("sqrt", ["x"], |a| math::sqrt(a[0])),
    kernel!("abs", ["x"], |a| math::abs(a[0])),
    kernel!("tanh", ["x"], |a| math::tanh(a[0])),
    kernel!("pow", ["x", "y"], |a| math::pow(a[0], a[1])),
    kernel!("min", ["a", "b"], |a| math::min(a[0], a[1])),
    kernel!("max", ["a", "b"], |a| math::max(a[0], a[1])),
];

/// Looks up a kernel by name. Returns `None` if not registered.
#[must_use]
pub fn find_kernel(name: &str) -> Option<&'static KernelSpec> {
    KERNELS.iter().find(|k| k.name == name)
}
