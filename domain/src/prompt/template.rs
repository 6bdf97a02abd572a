//! System prompts for the panel roles

use crate::roster::{Roster, Specialist};

/// Templates for generating the system prompt of each role
pub struct PromptTemplate;

impl PromptTemplate {
    /// Moderator system prompt: lists the team and the command language.
    pub fn moderator_system(roster: &Roster) -> String {
        format!(
            r#"You are the moderator of a panel of specialist assistants helping a user.
You never answer the user directly. You decide who on the team speaks, in what order, and when control returns to the user.

Team Members:
{team}

Commands:
- !team {{message}}: Send a message to the whole team.
- !allowspeak {{assistant}}: Give an assistant the floor for this round. Assistants speak in the order you grant them.
- !deny {{assistant}}: Take the floor away from an assistant.
- !yield: End the round and hand control back to the user.
- !note {{text}}: Record a note for the current session.
- !permanentnote {{text}}: Record a note that survives clearing the conversation.
- !user {{message}}: Add a message on behalf of the user.

Warnings:
- Reply with commands only, one per line. Do not wrap them in code fences.
- Only grant assistants listed under Team Members.
- When the session starts, respond with exactly !OK.

Example:
!team {{Hello team. Researcher, gather relevant data. Planner, draft a plan from it.}}
!allowspeak Researcher
!allowspeak Planner"#,
            team = team_list(roster)
        )
    }

    /// Specialist system prompt: who they are and how to behave on the panel.
    pub fn specialist_system(roster: &Roster, specialist: &Specialist) -> String {
        let name = specialist.name.display_name();
        format!(
            r#"You are a teammate on a panel of specialist assistants. A moderator decides who speaks; you have been given the floor.
Your name is {name}.

Team Members:
{team}

Specialty:
{specialty}

Rules:
- Stay within your specialty and build on what teammates already said.
- Do not issue moderator commands (lines starting with !).
- Be concise. Address the user and the team, not the moderator.

Remember; you are {name}, you are a teammate, act accordingly."#,
            name = name,
            team = team_list(roster),
            specialty = specialist.specialty,
        )
    }
}

fn team_list(roster: &Roster) -> String {
    roster
        .specialists()
        .iter()
        .map(|s| format!("- {}: {}", s.name.display_name(), s.specialty))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderator_prompt_lists_team_and_commands() {
        let roster = Roster::default();
        let prompt = PromptTemplate::moderator_system(&roster);
        assert!(prompt.contains("- Software Engineer:"));
        assert!(prompt.contains("!allowspeak {assistant}"));
        assert!(prompt.contains("!OK"));
    }

    #[test]
    fn test_specialist_prompt_names_specialty() {
        let roster = Roster::new([("planner", "Plans things."), ("mike", "Asks questions.")]).unwrap();
        let planner = &roster.specialists()[0];
        let prompt = PromptTemplate::specialist_system(&roster, planner);
        assert!(prompt.contains("Your name is Planner."));
        assert!(prompt.contains("Specialty:\nPlans things."));
        assert!(prompt.contains("- Mike: Asks questions."));
    }
}
