use tracing::{info, warn};

use crate::dialog::event::{CampaignChoice, Event, SourceChoice};
use crate::dialog::handlers::{reprompt, what_next};
use crate::dialog::machine::Collaborators;
use crate::dialog::reply::{Keyboard, Reply};
use crate::dialog::session::{ScratchUpdate, Session, Transition};
use crate::dialog::state::{DialogState, Flow};
use crate::foundation::error::{BotError, BotResult};
use crate::links::utm::{build_utm_url, has_supported_scheme, suggest_campaign};

fn text_of(event: &Event) -> Option<&str> {
    match event {
        Event::Text(text) => Some(text.trim()).filter(|t| !t.is_empty()),
        _ => None,
    }
}

pub(crate) fn on_url(session: &Session, event: &Event) -> Transition {
    let Some(url) = text_of(event).filter(|t| has_supported_scheme(t)) else {
        return reprompt(session);
    };
    Transition::to(DialogState::AwaitingUtmSourceChoice)
        .update(ScratchUpdate::UtmUrl(url.to_string()))
        .reply(
            Reply::text("✅ URL received!\n\nSelect campaign source or choose to enter custom value:")
                .with_keyboard(Keyboard::Sources),
        )
}

pub(crate) fn on_source_choice(session: &Session, event: &Event) -> Transition {
    let Some(choice) = text_of(event).and_then(SourceChoice::from_text) else {
        return reprompt(session);
    };
    match choice.value() {
        Some(source) => to_campaign(session, source),
        None => Transition::to(DialogState::AwaitingUtmSource).reply(
            Reply::text("Enter your custom campaign source:").with_keyboard(Keyboard::Remove),
        ),
    }
}

pub(crate) fn on_source(session: &Session, event: &Event) -> Transition {
    match text_of(event) {
        Some(source) => to_campaign(session, source.to_lowercase()),
        None => reprompt(session),
    }
}

/// Store the source, then offer the URL's last path segment as campaign when there is one.
fn to_campaign(session: &Session, source: String) -> Transition {
    let suggested = session.scratch.utm_url.as_deref().and_then(suggest_campaign);
    let transition = Transition::to(DialogState::AwaitingUtmCampaign)
        .update(ScratchUpdate::UtmSource(source))
        .update(ScratchUpdate::SuggestedCampaign(suggested.clone()));
    match suggested {
        Some(name) => Transition {
            next: DialogState::AwaitingUtmCampaignChoice,
            ..transition
        }
        .reply(
            Reply::text(format!(
                "✅ Campaign source received!\n\n\
                 I found '{name}' from your URL path.\n\
                 Would you like to use it as campaign name or enter your own?"
            ))
            .with_keyboard(Keyboard::Campaign(name)),
        ),
        None => transition.reply(
            Reply::text(
                "✅ Campaign source received!\n\n\
                 Now send the campaign name (e.g., spring_sale, product_launch, holiday_promo):",
            )
            .with_keyboard(Keyboard::Remove),
        ),
    }
}

pub(crate) async fn on_campaign_choice(
    deps: &Collaborators,
    session: &Session,
    event: &Event,
) -> Transition {
    let suggested = session.scratch.suggested_campaign.as_deref().unwrap_or("");
    let Some(choice) = text_of(event).and_then(|t| CampaignChoice::from_text(t, suggested)) else {
        return reprompt(session);
    };
    match choice {
        CampaignChoice::UseSuggested => finish(deps, session, suggested).await,
        CampaignChoice::Custom => Transition::to(DialogState::AwaitingUtmCampaign).reply(
            Reply::text("Enter your custom campaign name:").with_keyboard(Keyboard::Remove),
        ),
    }
}

pub(crate) async fn on_campaign(deps: &Collaborators, session: &Session, event: &Event) -> Transition {
    match text_of(event) {
        Some(campaign) => finish(deps, session, campaign).await,
        None => reprompt(session),
    }
}

/// Build, shorten and report the tracking link; the flow ends either way.
async fn finish(deps: &Collaborators, session: &Session, campaign: &str) -> Transition {
    let reply = match build_and_shorten(deps, session, campaign).await {
        Ok(text) => {
            info!(session_id = %session.id, "utm link created");
            Reply::text(text)
        }
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "utm link failed");
            Reply::text(format!("Error creating UTM URL: {e}"))
        }
    };
    what_next(
        Transition::to(DialogState::Choosing)
            .update(ScratchUpdate::ClearFlow(Flow::Utm))
            .reply(reply),
    )
}

async fn build_and_shorten(
    deps: &Collaborators,
    session: &Session,
    campaign: &str,
) -> BotResult<String> {
    let (Some(base), Some(source)) = (
        session.scratch.utm_url.as_deref(),
        session.scratch.utm_source.as_deref(),
    ) else {
        return Err(BotError::url_build_failed("url or source was not collected"));
    };
    let full = build_utm_url(base, source, campaign)?;
    let short = deps.shortener.shorten(&full).await?;
    Ok(format!(
        "🔗 UTM Tracking URL Created!\n\n\
         📊 Tracking Details:\n\
         • Source: {source}\n\
         • Campaign: {campaign}\n\n\
         🔗 Full UTM URL:\n{full}\n\n\
         ✂️ Shortened URL:\n{short}"
    ))
}
