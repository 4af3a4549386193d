use tracing::{info, warn};

use crate::dialog::event::Event;
use crate::dialog::handlers::{reprompt, what_next};
use crate::dialog::machine::Collaborators;
use crate::dialog::reply::Reply;
use crate::dialog::session::{Session, Transition};
use crate::dialog::state::DialogState;

pub(crate) async fn on_url(deps: &Collaborators, session: &Session, event: &Event) -> Transition {
    let Event::Text(text) = event else {
        return reprompt(session);
    };
    let long_url = text.trim();
    if long_url.is_empty() {
        return reprompt(session);
    }

    let reply = match deps.shortener.shorten(long_url).await {
        Ok(short) => {
            info!(session_id = %session.id, "url shortened");
            Reply::text(format!("Shortened URL:\n{short}"))
        }
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "url shortening failed");
            Reply::text(format!("Error: {e}"))
        }
    };
    what_next(Transition::to(DialogState::Choosing).reply(reply))
}
