//! User-facing texts sent to operators in their private chat.

use crate::selection::ChoiceError;

pub fn no_candidates(command: &str) -> String {
    format!(
        "I don't know any other groups yet.\n\
Add me to more groups, post at least one message there, then come back and send /{command} again."
    )
}

pub fn invalid_choice(err: ChoiceError) -> String {
    match err {
        ChoiceError::NotANumber => {
            "Send just one number from the list (for example: 1 or 2).".to_string()
        }
        ChoiceError::OutOfRange { max } => {
            format!("That number is not on the list. Pick a number between 1 and {max}.")
        }
    }
}

pub fn no_active_session(command: &str) -> String {
    format!(
        "There is no selection in progress. \
Send /{command} in the group you want to edit, then reply here with a number."
    )
}

pub fn toggled(source_title: &str, target_title: &str, active: bool) -> String {
    if active {
        format!("'{source_title}' was added as a source for '{target_title}'.")
    } else {
        format!("'{source_title}' was removed from the sources of '{target_title}'.")
    }
}

/// The store did not confirm the toggle; the write may or may not have landed.
pub fn toggle_failed(source_title: &str) -> String {
    format!(
        "Could not confirm the change to '{source_title}': \
the subscription store did not answer, so it may or may not have been applied. \
Check the current list before sending that number again."
    )
}

pub fn menu_unavailable(command: &str) -> String {
    format!(
        "I could not reload the list of groups. \
Send /{command} in the group again to get a fresh list."
    )
}

pub fn unauthorized() -> String {
    "You are not allowed to edit forwarding sources.".to_string()
}

pub fn help(command: &str) -> String {
    format!(
        "I copy messages from source groups into target groups.\n\n\
1. Add me to the groups and channels involved.\n\
2. In a target group, send /{command}.\n\
3. I will message you a numbered list here; reply with a number to turn that source on or off."
    )
}
