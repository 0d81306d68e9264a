//! # Request Form Projection
//!
//! Projects the configuration model into the operator-facing request form:
//! the fields someone fills in to request a badge. The form is generic
//! across badges, so per-badge required-ness cannot be expressed here —
//! an input is listed whenever any badge references it, and marked
//! optional. Required-ness is re-validated per badge by the assertion
//! builder against the same model, so the two surfaces cannot disagree.
//!
//! Field order is fixed (badge selection, recipient email, then inputs
//! sorted by id) to keep the rendered document byte-stable.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use bakery_config::ConfigModel;

use crate::error::SynthResult;

/// Filename of the rendered request form.
pub const REQUEST_FORM_FILE: &str = "request-form.yml";

/// The value type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// One value out of a fixed option list.
    Choice,
    /// Free-form string.
    String,
}

/// A single field of the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Prompt shown to the operator.
    pub description: String,
    /// Whether the surface must insist on a value. Only the fixed leading
    /// fields are required here; input required-ness is per badge.
    pub required: bool,
    /// Field value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Option list for choice fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Render the request form document as YAML.
pub fn render_request_form(model: &ConfigModel) -> SynthResult<String> {
    let mut form = Mapping::new();

    let badge_ids: Vec<String> = model.badges().keys().cloned().collect();
    insert(
        &mut form,
        "badge_id",
        FormField {
            description: "Select the badge".to_string(),
            required: true,
            field_type: FieldType::Choice,
            options: Some(badge_ids),
        },
    )?;
    insert(
        &mut form,
        "recipient_email",
        FormField {
            description: "Recipient's Email".to_string(),
            required: true,
            field_type: FieldType::String,
            options: None,
        },
    )?;

    // Union of inputs referenced by any badge, sorted by id. Inputs no
    // badge references are deliberately absent: the form only collects
    // what some badge can consume.
    for input_id in model.referenced_inputs() {
        let definition = &model.inputs()[input_id];
        insert(
            &mut form,
            input_id,
            FormField {
                description: definition.description.clone(),
                required: false,
                field_type: FieldType::String,
                options: None,
            },
        )?;
    }

    Ok(serde_yaml::to_string(&form)?)
}

fn insert(form: &mut Mapping, key: &str, field: FormField) -> SynthResult<()> {
    form.insert(Value::String(key.to_string()), serde_yaml::to_value(&field)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
repository_url: https://badges.example.org
issuers:
  acme:
    name: Acme Corp
    url: https://acme.example
    email: badges@acme.example
    publicKey: https://badges.example.org/public/acme-pubkey.pem
    private_key_secret_name: ACME_PRIVATE_KEY
global_inputs:
  evidence_url:
    description: Link to the contribution
  mentor:
    description: Name of the mentor
  unused_input:
    description: Referenced by no badge
badges:
  reviewer:
    name: Reviewer
    description: Awarded for reviews
    image: badges/reviewer.png
    criteria: https://badges.example.org/criteria/reviewer
    issuer_id: acme
    inputs:
      mentor: false
  contributor:
    name: Contributor
    description: Awarded for a merged contribution
    image: badges/contributor.png
    criteria: https://badges.example.org/criteria/contributor
    issuer_id: acme
    inputs:
      evidence_url: true
"#;

    fn model() -> ConfigModel {
        ConfigModel::from_yaml_str(CONFIG).unwrap()
    }

    #[test]
    fn leading_fields_then_sorted_inputs() {
        let yaml = render_request_form(&model()).unwrap();
        let badge_pos = yaml.find("badge_id:").unwrap();
        let email_pos = yaml.find("recipient_email:").unwrap();
        let evidence_pos = yaml.find("evidence_url:").unwrap();
        let mentor_pos = yaml.find("mentor:").unwrap();
        assert!(badge_pos < email_pos);
        assert!(email_pos < evidence_pos);
        assert!(evidence_pos < mentor_pos);
    }

    #[test]
    fn badge_options_are_sorted() {
        let yaml = render_request_form(&model()).unwrap();
        let contributor = yaml.find("- contributor").unwrap();
        let reviewer = yaml.find("- reviewer").unwrap();
        assert!(contributor < reviewer);
    }

    #[test]
    fn unreferenced_inputs_are_absent() {
        let yaml = render_request_form(&model()).unwrap();
        assert!(!yaml.contains("unused_input"));
    }

    #[test]
    fn inputs_carry_descriptions_and_are_optional() {
        let yaml = render_request_form(&model()).unwrap();
        assert!(yaml.contains("Link to the contribution"));
        let parsed: serde_yaml::Mapping = serde_yaml::from_str(&yaml).unwrap();
        let field: FormField =
            serde_yaml::from_value(parsed[&Value::String("evidence_url".into())].clone()).unwrap();
        assert!(!field.required);
        assert_eq!(field.field_type, FieldType::String);
    }

    #[test]
    fn rendering_is_deterministic() {
        let m = model();
        assert_eq!(
            render_request_form(&m).unwrap(),
            render_request_form(&m).unwrap()
        );
    }
}
