//! Bundled demo: an issue-entry form with a dropdown and a callback button.

use crate::domain::{Callback, NodeDescription};

/// Id given to the title input of the form.
pub const TITLE_INPUT_ID: &str = "apples";

/// Container id the demo mounts into by default.
pub const DEMO_CONTAINER_ID: &str = "test-id";

/// Issue-entry form. `on_summon` becomes the `onclick` of the last button.
pub fn issue_form(on_summon: Callback) -> NodeDescription {
    let title = NodeDescription::new("input")
        .prop("className", "w3-input w3-border")
        .prop("id", TITLE_INPUT_ID)
        .prop("type", "text")
        .prop("placeholder", "New issue title")
        .prop("autofocus", true);

    let details = NodeDescription::new("textarea")
        .prop("className", "w3-input w3-border")
        .prop("id", "Issues.ID_NEW_ISSUE_DETAILS")
        .prop("placeholder", "Details (Optional)");

    let milestones_button = NodeDescription::new("button")
        .prop("id", "Issues.ID_NEW_ISSUE_MILESTONES_BUTTON")
        .prop(
            "className",
            "w3-button full-width Milestones.CLASS_BUTTON_NO_MILESTONE",
        )
        // String handlers are not callable; hosts store null like a browser
        .prop("onclick", "Controls.toggleMilestones()")
        .children([NodeDescription::new("i")
            .prop("className", "fa fa-map-signs fa-1x")
            .prop("aria-hidden", "true")]);

    let milestones = NodeDescription::new("div")
        .prop("className", "w3-dropdown-click margin-top-1em")
        .children([
            milestones_button,
            NodeDescription::new("div")
                .prop("id", "Issues.ID_NEW_ISSUE_MILESTONES_LIST")
                .prop("className", "w3-dropdown-content w3-bar-block w3-border"),
        ]);

    let summon = NodeDescription::new("button")
        .prop("onclick", on_summon)
        .prop("textContent", "click me to call function");

    NodeDescription::new("div")
        .prop(
            "className",
            "w3-row w3-dark-grey w3-padding issue-margin-bottom",
        )
        .prop("title", "apples")
        .children([title, details, milestones, summon])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_form_shape() {
        let form = issue_form(Callback::new("summon", || {}));
        assert_eq!(form.tag(), "div");
        assert_eq!(form.node_count(), 8);
        assert_eq!(form.depth(), 4);
    }
}
