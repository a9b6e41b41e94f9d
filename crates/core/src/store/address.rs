//! Address slice: the single shipping address used for checkout.

use serde::{Deserialize, Serialize};

use super::{Action, SessionAction};

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

impl ShippingAddress {
    /// Format as a single line for receipts and logs.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.extend([
            self.city.as_str(),
            self.state.as_str(),
            self.postal_code.as_str(),
            self.country.as_str(),
        ]);
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }
}

/// Address transitions. Create and update both replace the whole address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AddressAction {
    Created(ShippingAddress),
    Updated(ShippingAddress),
    Deleted,
}

/// The address slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressState {
    pub address: Option<ShippingAddress>,
}

/// Apply an action to the address slice.
///
/// Signing out drops the address along with the user it belonged to.
#[must_use]
pub fn reduce(mut state: AddressState, action: &Action) -> AddressState {
    match action {
        Action::Address(AddressAction::Created(address) | AddressAction::Updated(address)) => {
            state.address = Some(address.clone());
        }
        Action::Address(AddressAction::Deleted) | Action::Session(SessionAction::SignedOut) => {
            state.address = None;
        }
        _ => {}
    }
    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(city: &str) -> ShippingAddress {
        ShippingAddress {
            line1: "221B Baker Street".to_string(),
            line2: Some("Flat B".to_string()),
            city: city.to_string(),
            postal_code: "NW1 6XE".to_string(),
            state: String::new(),
            country: "GB".to_string(),
        }
    }

    #[test]
    fn test_update_overwrites_wholesale() {
        let state = reduce(
            AddressState::default(),
            &Action::Address(AddressAction::Created(address("London"))),
        );

        let mut replacement = address("Bristol");
        replacement.line2 = None;
        let state = reduce(
            state,
            &Action::Address(AddressAction::Updated(replacement.clone())),
        );

        assert_eq!(state.address, Some(replacement));
    }

    #[test]
    fn test_delete_clears() {
        let state = reduce(
            AddressState::default(),
            &Action::Address(AddressAction::Created(address("London"))),
        );
        let state = reduce(state, &Action::Address(AddressAction::Deleted));
        assert!(state.address.is_none());
    }

    #[test]
    fn test_sign_out_forgets_address() {
        let state = reduce(
            AddressState::default(),
            &Action::Address(AddressAction::Created(address("London"))),
        );
        let state = reduce(state, &Action::Session(SessionAction::SignedOut));
        assert!(state.address.is_none());
    }

    #[test]
    fn test_sign_in_keeps_guest_address() {
        let state = reduce(
            AddressState::default(),
            &Action::Address(AddressAction::Created(address("London"))),
        );
        let state = reduce(state, &Action::Session(SessionAction::Loading(true)));
        assert_eq!(state.address, Some(address("London")));
    }

    #[test]
    fn test_one_line_skips_empty_parts() {
        assert_eq!(
            address("London").one_line(),
            "221B Baker Street, Flat B, London, NW1 6XE, GB"
        );
    }
}
