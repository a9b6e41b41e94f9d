//! Delivery slice: the catalog of shipping methods and the one chosen.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Action;
use crate::DeliveryOptionId;

/// A shipping method the customer can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub id: DeliveryOptionId,
    pub name: String,
    /// Zero for free delivery.
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Delivery transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DeliveryAction {
    /// A catalog fetch has started. Carries no data.
    FetchRequested,
    /// The catalog fetch resolved; replaces the list.
    OptionsLoaded(Vec<DeliveryOption>),
    /// The customer chose an option.
    Selected(DeliveryOption),
    /// Append one option to the catalog.
    OptionCreated(DeliveryOption),
}

/// The delivery slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryState {
    /// The selected option, if any.
    pub delivery_type: Option<DeliveryOption>,
    /// Everything on offer.
    pub delivery_options: Vec<DeliveryOption>,
}

impl DeliveryState {
    /// Look up an option in the catalog.
    #[must_use]
    pub fn option(&self, id: DeliveryOptionId) -> Option<&DeliveryOption> {
        self.delivery_options.iter().find(|o| o.id == id)
    }
}

/// Apply an action to the delivery slice.
#[must_use]
pub fn reduce(mut state: DeliveryState, action: &Action) -> DeliveryState {
    let Action::Delivery(action) = action else {
        return state;
    };

    match action {
        DeliveryAction::FetchRequested => {}
        DeliveryAction::OptionsLoaded(options) => state.delivery_options.clone_from(options),
        DeliveryAction::Selected(option) => state.delivery_type = Some(option.clone()),
        DeliveryAction::OptionCreated(option) => state.delivery_options.push(option.clone()),
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: i32, price: i64) -> DeliveryOption {
        DeliveryOption {
            id: DeliveryOptionId::new(id),
            name: format!("Option {id}"),
            price: Decimal::from(price),
            description: None,
        }
    }

    #[test]
    fn test_fetch_requested_is_noop() {
        let before = DeliveryState {
            delivery_type: Some(option(1, 3)),
            delivery_options: vec![option(1, 3)],
        };
        let after = reduce(
            before.clone(),
            &Action::Delivery(DeliveryAction::FetchRequested),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_selection_is_independent_of_catalog() {
        let state = reduce(
            DeliveryState::default(),
            &Action::Delivery(DeliveryAction::Selected(option(7, 0))),
        );
        assert_eq!(state.delivery_type, Some(option(7, 0)));
        assert!(state.delivery_options.is_empty());
    }

    #[test]
    fn test_loaded_replaces_and_created_appends() {
        let state = reduce(
            DeliveryState::default(),
            &Action::Delivery(DeliveryAction::OptionsLoaded(vec![option(1, 0), option(2, 5)])),
        );
        let state = reduce(
            state,
            &Action::Delivery(DeliveryAction::OptionCreated(option(3, 12))),
        );
        assert_eq!(state.delivery_options.len(), 3);

        let state = reduce(
            state,
            &Action::Delivery(DeliveryAction::OptionsLoaded(vec![option(9, 1)])),
        );
        assert_eq!(state.delivery_options, vec![option(9, 1)]);
        assert_eq!(state.option(DeliveryOptionId::new(9)), Some(&option(9, 1)));
    }
}
