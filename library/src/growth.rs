//! Carbon-specific growth.

/// Carbon-specific growth rate (MITgcm-DARWIN default formulation).
///
/// `PCᵐᵃˣ · γⁿᵘᵗ · γˡⁱᵍʰᵗ · fᵗᵉᵐᵖ · γᶜᵒ²`
///
/// # Arguments
///
/// - `pc_max`: maximum carbon-specific growth rate
/// - `nutrient_limitation`: γⁿᵘᵗ
/// - `light_limitation`: γˡⁱᵍʰᵗ
/// - `temperature_limitation`: fᵗᵉᵐᵖ
/// - `co2_limitation`: γᶜᵒ²
#[must_use]
pub fn carbon_specific_growth(
    pc_max: f64,
    nutrient_limitation: f64,
    light_limitation: f64,
    temperature_limitation: f64,
    co2_limitation: f64,
) -> f64 {
    pc_max * nutrient_limitation * light_limitation * temperature_limitation * co2_limitation
}
