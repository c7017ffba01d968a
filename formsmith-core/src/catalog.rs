//! Built-in template catalog.
//!
//! A fixed collection of complete templates offered for one-click
//! loading. The contents are data, not logic; loading one clones it
//! into the editor.

use serde::Serialize;

use crate::{
    FieldId, FieldKind, FieldOption, FieldType, FieldValidation, FormField, FormStep, FormTemplate,
    StepId,
};

/// Summary of a catalog entry, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    /// Template identifier.
    pub id: String,
    /// Template name.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// All built-in templates, freshly constructed.
#[must_use]
pub fn templates() -> Vec<FormTemplate> {
    vec![contact_form(), job_application(), event_registration()]
}

/// Look up a built-in template by id.
#[must_use]
pub fn find(id: &str) -> Option<FormTemplate> {
    templates().into_iter().find(|template| template.id == id)
}

/// Summaries for every built-in template.
#[must_use]
pub fn summaries() -> Vec<TemplateSummary> {
    templates()
        .into_iter()
        .map(|template| TemplateSummary {
            id: template.id,
            name: template.name,
            description: template.description,
        })
        .collect()
}

/// Catalog field with a stable id.
fn field(id: &str, field_type: FieldType, label: &str, name: &str) -> FormField {
    FormField {
        id: FieldId::from_string(id),
        kind: FieldKind::new(field_type),
        label: label.to_string(),
        name: name.to_string(),
        placeholder: None,
        help_text: None,
        validation: None,
    }
}

/// Catalog step with a stable id.
fn step(id: &str, title: &str, fields: Vec<FormField>) -> FormStep {
    FormStep {
        id: StepId::from_string(id),
        title: title.to_string(),
        fields,
    }
}

fn choice(id: &str, field_type: FieldType, label: &str, name: &str, options: &[(&str, &str)]) -> FormField {
    let options = options
        .iter()
        .map(|(label, value)| FieldOption::new(*label, *value))
        .collect();
    FormField {
        kind: FieldKind::from_parts(field_type, Some(options)),
        ..field(id, field_type, label, name)
    }
}

const EMAIL_PATTERN: &str = r"[\w.-]+@[\w.-]+\.\w+";

fn contact_form() -> FormTemplate {
    FormTemplate {
        id: "template-contact".to_string(),
        name: "Contact Form".to_string(),
        description: Some("Name, email and a message".to_string()),
        steps: vec![step(
            "contact-details",
            "Contact Details",
            vec![
                field("contact-name", FieldType::Text, "Full Name", "full_name")
                    .with_placeholder("Jane Doe")
                    .with_validation(FieldValidation::required().with_min_length(2)),
                field("contact-email", FieldType::Email, "Email Address", "email")
                    .with_placeholder("jane@example.com")
                    .with_validation(
                        FieldValidation::required()
                            .with_pattern(EMAIL_PATTERN)
                            .with_pattern_error("Please enter a valid email address"),
                    ),
                field("contact-message", FieldType::Textarea, "Message", "message")
                    .with_placeholder("How can we help?")
                    .with_validation(FieldValidation::required().with_min_length(10)),
            ],
        )],
    }
}

fn job_application() -> FormTemplate {
    FormTemplate {
        id: "template-job-application".to_string(),
        name: "Job Application".to_string(),
        description: Some("Two-step application with personal details and experience".to_string()),
        steps: vec![
            step(
                "job-personal",
                "Personal Information",
                vec![
                    field("job-name", FieldType::Text, "Full Name", "full_name")
                        .with_validation(FieldValidation::required()),
                    field("job-email", FieldType::Email, "Email Address", "email")
                        .with_validation(
                            FieldValidation::required().with_pattern(EMAIL_PATTERN),
                        ),
                    field("job-phone", FieldType::Text, "Phone Number", "phone")
                        .with_placeholder("+1 555 000 0000")
                        .with_help_text("Include the country code"),
                ],
            ),
            step(
                "job-experience",
                "Experience",
                vec![
                    choice(
                        "job-position",
                        FieldType::Select,
                        "Position",
                        "position",
                        &[
                            ("Software Engineer", "engineer"),
                            ("Product Designer", "designer"),
                            ("Project Manager", "manager"),
                        ],
                    )
                    .with_validation(FieldValidation::required()),
                    field(
                        "job-years",
                        FieldType::Number,
                        "Years of Experience",
                        "years_experience",
                    ),
                    field(
                        "job-cover",
                        FieldType::Textarea,
                        "Cover Letter",
                        "cover_letter",
                    )
                    .with_validation(FieldValidation::required().with_min_length(50)),
                ],
            ),
        ],
    }
}

fn event_registration() -> FormTemplate {
    FormTemplate {
        id: "template-event".to_string(),
        name: "Event Registration".to_string(),
        description: Some("Attendee details and ticket preferences".to_string()),
        steps: vec![
            step(
                "event-attendee",
                "Attendee",
                vec![
                    field("event-name", FieldType::Text, "Full Name", "full_name")
                        .with_validation(FieldValidation::required()),
                    field("event-email", FieldType::Email, "Email Address", "email")
                        .with_validation(
                            FieldValidation::required().with_pattern(EMAIL_PATTERN),
                        ),
                ],
            ),
            step(
                "event-preferences",
                "Preferences",
                vec![
                    choice(
                        "event-ticket",
                        FieldType::Radio,
                        "Ticket Type",
                        "ticket_type",
                        &[
                            ("Standard", "standard"),
                            ("VIP", "vip"),
                            ("Student", "student"),
                        ],
                    )
                    .with_validation(FieldValidation::required()),
                    choice(
                        "event-diet",
                        FieldType::Select,
                        "Dietary Preference",
                        "dietary",
                        &[
                            ("None", "none"),
                            ("Vegetarian", "vegetarian"),
                            ("Vegan", "vegan"),
                            ("Gluten-free", "gluten_free"),
                        ],
                    ),
                    field("event-date", FieldType::Date, "Attendance Date", "attendance_date")
                        .with_validation(FieldValidation::required()),
                    // A single yes/no checkbox; the option list stays empty.
                    choice(
                        "event-newsletter",
                        FieldType::Checkbox,
                        "Subscribe to the newsletter",
                        "newsletter",
                        &[],
                    ),
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_catalog_is_not_empty() {
        assert!(!templates().is_empty());
    }

    #[test]
    fn test_template_ids_are_unique() {
        let ids: Vec<_> = templates().into_iter().map(|t| t.id).collect();
        let unique: BTreeSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_every_template_upholds_step_invariant() {
        for template in templates() {
            assert!(template.step_count() >= 1, "{} has no steps", template.id);
        }
    }

    #[test]
    fn test_field_ids_are_unique_within_each_template() {
        for template in templates() {
            let ids: Vec<_> = template.fields().map(|f| f.id.clone()).collect();
            let unique: BTreeSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len(), "{} repeats field ids", template.id);
        }
    }

    #[test]
    fn test_find_returns_matching_template() {
        let template = find("template-contact").expect("known id");
        assert_eq!(template.name, "Contact Form");
        assert!(find("template-unknown").is_none());
    }

    #[test]
    fn test_summaries_match_templates() {
        let summaries = summaries();
        assert_eq!(summaries.len(), templates().len());
        assert_eq!(summaries[0].id, "template-contact");
    }

    #[test]
    fn test_choice_fields_carry_authored_options() {
        let template = find("template-event").expect("known id");
        let ticket = template
            .fields()
            .find(|f| f.name == "ticket_type")
            .expect("ticket field");
        let options = ticket.kind.options().expect("radio has options");
        assert_eq!(options.len(), 3);
        assert_eq!(options[1].value, "vip");
    }
}
