//! Event routing: commands first, then the handler for the session's current state.

pub(crate) mod shorten;
pub(crate) mod utm;
pub(crate) mod video;
pub(crate) mod vinyl;

use crate::dialog::event::{Command, Event, MenuChoice};
use crate::dialog::machine::Collaborators;
use crate::dialog::reply::{Keyboard, Reply};
use crate::dialog::session::{ScratchUpdate, Session, Transition};
use crate::dialog::state::{DialogState, Flow};

pub(crate) const STOPPED_TEXT: &str = "Session stopped. Use /start to begin again.";

/// Compute the transition for `event` arriving in `session`.
pub(crate) async fn route(deps: &Collaborators, session: &Session, event: Event) -> Transition {
    let state = session.state;
    if let Event::Command(cmd) = &event {
        match cmd {
            Command::Start => return start(),
            _ if state == DialogState::Stopped => return reprompt(session),
            Command::Stop => return stop(),
            Command::Menu => return status_snapshot(state),
            Command::Cancel => return cancel(state),
            Command::Unknown(_) => return reprompt(session),
        }
    }

    match state {
        DialogState::Stopped => reprompt(session),
        DialogState::Choosing => choose(session, &event),
        DialogState::AwaitingUrl => shorten::on_url(deps, session, &event).await,
        DialogState::AwaitingVideo => video::on_video(deps, session, &event).await,
        DialogState::AwaitingVinylImage => vinyl::on_image(deps, session, &event).await,
        DialogState::AwaitingVinylAudio => vinyl::on_audio(deps, session, &event).await,
        DialogState::AwaitingUtmUrl => utm::on_url(session, &event),
        DialogState::AwaitingUtmSourceChoice => utm::on_source_choice(session, &event),
        DialogState::AwaitingUtmSource => utm::on_source(session, &event),
        DialogState::AwaitingUtmCampaignChoice => {
            utm::on_campaign_choice(deps, session, &event).await
        }
        DialogState::AwaitingUtmCampaign => utm::on_campaign(deps, session, &event).await,
    }
}

/// The single reply sent when input does not fit `state`; the state is kept.
pub(crate) fn reprompt(session: &Session) -> Transition {
    let state = session.state;
    let reply = match state {
        DialogState::Choosing => {
            Reply::text("Choose a valid option.").with_keyboard(Keyboard::Main)
        }
        DialogState::AwaitingUrl => Reply::text("Send the URL to shorten:"),
        DialogState::AwaitingVideo => Reply::text("Please send a valid video file."),
        DialogState::AwaitingVinylImage => {
            Reply::text("Please send a valid image file (JPEG, PNG, etc.)")
        }
        DialogState::AwaitingVinylAudio => {
            Reply::text("Please send a valid audio file (MP3, WAV, etc.)")
        }
        DialogState::AwaitingUtmUrl => {
            Reply::text("Please send a valid URL starting with http:// or https://")
        }
        DialogState::AwaitingUtmSourceChoice => {
            Reply::text("Please select from the options below:").with_keyboard(Keyboard::Sources)
        }
        DialogState::AwaitingUtmSource => Reply::text(
            "Please provide a campaign source (e.g., google, facebook, newsletter)",
        ),
        DialogState::AwaitingUtmCampaignChoice => {
            let reply = Reply::text("Please select from the options below:");
            match session.scratch.suggested_campaign.clone() {
                Some(suggested) => reply.with_keyboard(Keyboard::Campaign(suggested)),
                None => reply,
            }
        }
        DialogState::AwaitingUtmCampaign => {
            Reply::text("Please provide a campaign name (e.g., spring_sale, product_launch)")
        }
        DialogState::Stopped => Reply::text(STOPPED_TEXT),
    };
    Transition::to(state).reply(reply)
}

/// Close a flow: show the main keyboard again and go back to the menu.
pub(crate) fn what_next(transition: Transition) -> Transition {
    transition.reply(Reply::text("What next?").with_keyboard(Keyboard::Main))
}

fn start() -> Transition {
    Transition::to(DialogState::Choosing)
        .reply(Reply::text("Welcome! Choose an option:").with_keyboard(Keyboard::Main))
}

fn stop() -> Transition {
    Transition::to(DialogState::Stopped)
        .reply(Reply::text(STOPPED_TEXT).with_keyboard(Keyboard::Remove))
}

fn cancel(state: DialogState) -> Transition {
    let transition = Transition::to(DialogState::Choosing);
    let transition = match state.flow() {
        Some(flow) => transition.update(ScratchUpdate::ClearFlow(flow)),
        None => transition,
    };
    transition.reply(Reply::text("Operation cancelled. What next?").with_keyboard(Keyboard::Main))
}

fn status_snapshot(state: DialogState) -> Transition {
    let text = format!(
        "📋 Current State: {}\n\n\
         Available Commands:\n\
         /start - Start the bot\n\
         /stop - Stop the session\n\
         /menu - Show this menu\n\
         /cancel - Cancel current operation",
        state.label()
    );
    Transition::to(state).reply(Reply::text(text))
}

fn choose(session: &Session, event: &Event) -> Transition {
    let Event::Text(text) = event else {
        return reprompt(session);
    };
    let Some(choice) = MenuChoice::from_text(text) else {
        return reprompt(session);
    };

    match choice {
        MenuChoice::Shorten => Transition::to(DialogState::AwaitingUrl)
            .update(ScratchUpdate::ClearFlow(Flow::Shorten))
            .reply(Reply::text("Send the URL to shorten:").with_keyboard(Keyboard::Remove)),
        MenuChoice::Utm => Transition::to(DialogState::AwaitingUtmUrl)
            .update(ScratchUpdate::ClearFlow(Flow::Utm))
            .reply(
                Reply::text("Creating UTM tracking URL!\n\nFirst, send the URL you want to track:")
                    .with_keyboard(Keyboard::Remove),
            ),
        MenuChoice::VideoNote => Transition::to(DialogState::AwaitingVideo)
            .update(ScratchUpdate::ClearFlow(Flow::VideoNote))
            .reply(
                Reply::text("Send a video (max 50MB, square, up to 1 minute):")
                    .with_keyboard(Keyboard::Remove),
            ),
        MenuChoice::Vinyl => Transition::to(DialogState::AwaitingVinylImage)
            .update(ScratchUpdate::ClearFlow(Flow::Vinyl))
            .reply(
                Reply::text("Creating a vinyl record!\n\nFirst, send an image for the vinyl cover:")
                    .with_keyboard(Keyboard::Remove),
            ),
        MenuChoice::Stop => stop(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dialog/handlers.rs"]
mod tests;
