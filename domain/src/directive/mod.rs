//! Moderator command language
//!
//! Parsing runs in three stages:
//!
//! 1. [`tokenizer`] splits a line into command token and argument
//! 2. [`grammar`] maps tokens to [`grammar::Directive`] values, resolving
//!    role names against the roster
//! 3. [`plan`] folds a reply's directives into a [`plan::TurnPlan`]

pub mod grammar;
pub mod plan;
pub mod tokenizer;
