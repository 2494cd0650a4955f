pub mod formed_match;
pub mod match_trigger;
pub mod roles;
