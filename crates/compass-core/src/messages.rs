//! Built-in quote and playful message pools.
//!
//! `{low}` and `{high}` are replaced with the configured pole names when a
//! message is shown.

pub const QUOTES: &[&str] = &[
    "Distance is just a test to see how far love can travel.",
    "Some roads are long only so the arrival feels earned.",
    "Two cities, one heart, and a needle that never quite sits still.",
    "Wherever you go, go with all your heart.",
    "The best journeys answer questions you did not know to ask.",
    "Home is not a place; it is a direction the heart keeps pointing.",
    "Every mile between us is a mile I would walk again.",
];

pub const TOWARD_LOW: &[&str] = &[
    "The needle smells sea breeze today. {low} is winning.",
    "{low} called. It wants you back.",
    "Vada pav energy detected. Heading toward {low}.",
    "Somewhere in {low}, a local train is holding a seat for you.",
];

pub const BALANCED: &[&str] = &[
    "Perfectly torn. The compass is sitting on the fence.",
    "Halfway between {low} and {high}. Diplomatic as ever.",
    "No winner today. Both cities sulk equally.",
];

pub const TOWARD_HIGH: &[&str] = &[
    "Filter coffee is pulling the needle toward {high}.",
    "{high} weather wins again.",
    "The compass is stuck in {high} traffic. Happily.",
    "Today the heart takes the long road to {high}.",
];

/// Replace the pole placeholders in a message template.
pub fn fill_poles(template: &str, low: &str, high: &str) -> String {
    template.replace("{low}", low).replace("{high}", high)
}
