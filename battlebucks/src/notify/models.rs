//! Confirmation message drafting.

use crate::registration::Registration;
use crate::tournament::Tournament;
use serde::{Deserialize, Serialize};

/// A drafted confirmation email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationMessage {
    /// Email address the draft is addressed to
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl ConfirmationMessage {
    /// Draft the confirmation for a registration whose payment was just
    /// confirmed.
    ///
    /// The greeting uses the team name, or the registrant's email when the
    /// team name is blank.
    pub fn draft(registration: &Registration, tournament: &Tournament) -> Self {
        let display_name = match registration.team_name.trim() {
            "" => registration.user_email.as_str(),
            name => name,
        };

        let subject = format!("Registration confirmed: {}", tournament.title);

        let body = format!(
            "Hi {display_name},\n\n\
             Your payment for {title} has been verified and your slot is confirmed.\n\n\
             Match date: {date}\n\
             Match time: {time}\n\
             Entry fee: \u{20b9}{fee}\n\
             Prize pool: \u{20b9}{prize}\n\n\
             Room ID and password will be shared before the match starts. \
             Good luck!\n\n\
             BattleBucks",
            title = tournament.title,
            date = tournament.date.format("%d %b %Y"),
            time = tournament.time.format("%H:%M"),
            fee = tournament.entry_fee,
            prize = tournament.prize_pool,
        );

        Self {
            recipient: registration.user_email.clone(),
            subject,
            body,
        }
    }
}
