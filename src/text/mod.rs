// Text normalization — tokens, stop words and brand filtering.

pub mod brand;
pub mod normalize;
