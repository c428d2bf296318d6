use crate::config::Settings;
use crate::models::ModelDetail;

use super::html::{content_tag, icon, Html};

/// Status badges for a model: a "new" pill when the model carries the
/// configured new tag, then a warning icon when it has problems.
pub fn status_badges(model: &ModelDetail, settings: &Settings) -> Html {
    let mut badges = Vec::with_capacity(2);

    if settings.new_tag().is_some_and(|tag| model.has_tag(tag)) {
        badges.push(content_tag(
            "span",
            Html::text("new"),
            &[("class", Some("badge rounded-pill bg-info"))],
        ));
    }

    if !model.problems.is_empty() {
        badges.push(content_tag(
            "span",
            icon("exclamation-triangle-fill", "Problem"),
            &[("class", Some("text-warning align-middle"))],
        ));
    }

    content_tag(
        "span",
        badges.into_iter().collect(),
        &[("class", Some("status-badges"))],
    )
}
