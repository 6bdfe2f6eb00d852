//! Input validation for create and update requests.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::ticket::{Responsible, State, TicketType};

use super::types::TicketError;

static CASE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Case-\d{3}$").expect("case id pattern is valid"));

/// Returns true if `id` is of the form `Case-NNN`.
pub fn is_valid_id(id: &str) -> bool {
    CASE_ID.is_match(id)
}

/// Returns true if `name` is a non-empty run of word characters.
///
/// Word characters are Unicode letters and digits plus `_`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Validate the fields of a create request, in order: id, details, name, type.
///
/// Returns the parsed ticket type. Id uniqueness is checked by the engine
/// against the store afterwards.
pub fn validate_create(
    id: &str,
    name: &str,
    details: &str,
    ticket_type: &str,
) -> Result<TicketType, TicketError> {
    if !is_valid_id(id) {
        return Err(TicketError::InvalidId(id.to_string()));
    }
    if details.is_empty() {
        return Err(TicketError::InvalidDetails);
    }
    if !is_valid_name(name) {
        return Err(TicketError::InvalidName(name.to_string()));
    }
    TicketType::from_value(ticket_type)
        .ok_or_else(|| TicketError::InvalidType(ticket_type.to_string()))
}

/// Validate the target state and assignee of an update request.
///
/// Only the intermediate states are accepted: `new` is reached by creation
/// and `closed` by close.
pub fn validate_update(state: &str, responsible: &str) -> Result<(State, Responsible), TicketError> {
    let state = State::from_value(state)
        .filter(State::is_update_target)
        .ok_or_else(|| TicketError::InvalidState(state.to_string()))?;
    let responsible = Responsible::from_value(responsible)
        .ok_or_else(|| TicketError::InvalidResponsible(responsible.to_string()))?;
    Ok((state, responsible))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("Case-001"));
        assert!(is_valid_id("Case-999"));
    }

    #[test]
    fn test_invalid_ids() {
        for id in [
            "", "Case-", "Case-1", "Case-01", "Case-0001", "case-001", "Case001", "Case-00a",
            " Case-001", "Case-001 ", "Case-001\n", "Case-١٢٣",
        ] {
            assert!(!is_valid_id(id), "{:?} should be rejected", id);
        }
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("Alice"));
        assert!(is_valid_name("IUT"));
        assert!(is_valid_name("bob_42"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Alice Smith"));
        assert!(!is_valid_name("o'brien"));
    }

    #[test]
    fn test_names_accept_unicode_letters() {
        assert!(is_valid_name("José"));
        assert!(is_valid_name("Zoë"));
        assert!(is_valid_name("Łukasz_2"));
        assert!(!is_valid_name("Jo sé"));
        assert!(!is_valid_name("José!"));
        assert_eq!(
            validate_create("Case-001", "José", "printer jam", "PR"),
            Ok(TicketType::ProblemReport)
        );
    }

    #[test]
    fn test_create_checks_run_in_order() {
        // Everything wrong: the id is reported first
        assert_eq!(
            validate_create("bad", "", "", "XX"),
            Err(TicketError::InvalidId("bad".to_string()))
        );
        // Details before name
        assert_eq!(
            validate_create("Case-001", "bad name", "", "XX"),
            Err(TicketError::InvalidDetails)
        );
        // Name before type
        assert_eq!(
            validate_create("Case-001", "bad name", "details", "XX"),
            Err(TicketError::InvalidName("bad name".to_string()))
        );
        assert_eq!(
            validate_create("Case-001", "Bob", "details", "XX"),
            Err(TicketError::InvalidType("XX".to_string()))
        );
        assert_eq!(
            validate_create("Case-001", "Bob", "details", "IR"),
            Ok(TicketType::InformationRequest)
        );
    }

    #[test]
    fn test_update_rejects_new_and_closed() {
        assert_eq!(
            validate_update("new", "L1"),
            Err(TicketError::InvalidState("new".to_string()))
        );
        assert_eq!(
            validate_update("closed", "L1"),
            Err(TicketError::InvalidState("closed".to_string()))
        );
        assert_eq!(
            validate_update("ANALYSIS", "L1"),
            Err(TicketError::InvalidState("ANALYSIS".to_string()))
        );
    }

    #[test]
    fn test_update_checks_state_before_responsible() {
        assert_eq!(
            validate_update("bogus", "L9"),
            Err(TicketError::InvalidState("bogus".to_string()))
        );
        assert_eq!(
            validate_update("solved", "L9"),
            Err(TicketError::InvalidResponsible("L9".to_string()))
        );
        assert_eq!(
            validate_update("in_delivery", "L3"),
            Ok((State::InDelivery, Responsible::L3))
        );
    }
}
