const CARBON_TRIGGER: &str = "carbon footprint";

/// Wraps questions about a carbon footprint in the estimation template.
/// Anything else, and everything when `carbon_prompt` is off, passes through.
pub fn build_prompt(input: &str, carbon_prompt: bool) -> String {
    if carbon_prompt && mentions_carbon_footprint(input) {
        return format!(
            "Provide a rough average value for the carbon footprint for the following object or activity: {input}, if the carbon content is more than a healthy amount, suggest an alternative. "
        );
    }
    input.to_string()
}

fn mentions_carbon_footprint(input: &str) -> bool {
    input.to_lowercase().contains(CARBON_TRIGGER)
}
