use serde::Serialize;

use crate::i18n::Translations;

use super::html::{content_tag, Html};

/// Licenses offered when editing a model, in display order.
pub const LICENSE_IDS: [&str; 10] = [
    "CC-BY-4.0",
    "CC-BY-NC-4.0",
    "CC-BY-ND-4.0",
    "CC-BY-NC-ND-4.0",
    "CC-BY-NC-SA-4.0",
    "CC-BY-SA-4.0",
    "CC-PDDC",
    "CC0-1.0",
    "MIT",
    "LicenseRef-Commercial",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseOption {
    pub label: String,
    pub id: &'static str,
    pub selected: bool,
}

/// Localized label for a license id. Translation keys drop the periods
/// (`CC-BY-4.0` is `licenses.CC-BY-40`); unknown ids fall back to the id itself.
pub fn license_label(translations: &Translations, id: &str) -> String {
    let key = format!("licenses.{}", id.replace('.', ""));
    translations.t(&key, id)
}

/// The fixed license list, with `selected` marking the matching option.
/// A `selected` value outside the list simply matches nothing.
pub fn license_options(translations: &Translations, selected: Option<&str>) -> Vec<LicenseOption> {
    LICENSE_IDS
        .iter()
        .map(|&id| LicenseOption {
            label: license_label(translations, id),
            id,
            selected: selected == Some(id),
        })
        .collect()
}

/// Render options as `<option>` elements for a `<select>`.
pub fn license_select_options(translations: &Translations, selected: Option<&str>) -> Html {
    license_options(translations, selected)
        .into_iter()
        .map(|option| {
            let mut attrs = vec![("value", Some(option.id))];
            if option.selected {
                attrs.push(("selected", Some("selected")));
            }
            content_tag("option", Html::text(&option.label), &attrs)
        })
        .collect()
}
