use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Postal address embedded by value into the rows that carry one.
///
/// Addresses are never persisted on their own; members and deliveries store
/// the three components as plain columns and rebuild the value on read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(city: impl Into<String>, street: impl Into<String>, zipcode: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            zipcode: zipcode.into(),
        }
    }
}
