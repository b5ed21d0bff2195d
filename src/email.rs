//! Email template rendering.
//!
//! Templates are plain text files containing literal placeholder tokens
//! (`<email>`, `<url>`, `<name>`, `<reservationId>`, `<fromDate>`,
//! `<toDate>`, `<message>`, `<costValue>`, `<depositCost>`). Rendering is
//! pure find/replace; there is no escaping and no conditional syntax.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::Result;

/// A loaded email template.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    text: String,
}

/// Substitution values for one rendered email. Fields a given template does
/// not mention are simply left unused.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    pub email: String,
    pub url: String,
    pub name: String,
    pub reservation_id: String,
    pub from_date: String,
    pub to_date: String,
    pub message: String,
    pub cost: i64,
    pub deposit: i64,
}

impl EmailTemplate {
    /// Load a template from a text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Reading email template");
        Ok(Self {
            text: fs::read_to_string(path)?,
        })
    }

    /// Create a template from raw text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Render the template against a set of values.
    pub fn render(&self, values: &TemplateValues) -> String {
        self.text
            .replace("<email>", &values.email)
            .replace("<url>", &values.url)
            .replace("<name>", &values.name)
            .replace("<reservationId>", &values.reservation_id)
            .replace("<fromDate>", &values.from_date)
            .replace("<toDate>", &values.to_date)
            .replace("<message>", &values.message)
            .replace("<costValue>", &values.cost.to_string())
            .replace("<depositCost>", &values.deposit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_tokens() {
        let template = EmailTemplate::from_text("Hi <name>, ref <reservationId>");
        let values = TemplateValues {
            name: "Ann".to_string(),
            reservation_id: "R1".to_string(),
            ..Default::default()
        };
        assert_eq!(template.render(&values), "Hi Ann, ref R1");
    }

    #[test]
    fn formats_numeric_fields_as_decimal() {
        let template = EmailTemplate::from_text("Cost: <costValue> Ft, deposit: <depositCost> Ft");
        let values = TemplateValues {
            cost: 100,
            deposit: 40,
            ..Default::default()
        };
        assert_eq!(template.render(&values), "Cost: 100 Ft, deposit: 40 Ft");
    }

    #[test]
    fn leaves_unknown_text_untouched() {
        let template = EmailTemplate::from_text("Dear <name>, visit <url> <unknown>");
        let values = TemplateValues {
            name: "Bob".to_string(),
            url: "https://example.com/d/1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            template.render(&values),
            "Dear Bob, visit https://example.com/d/1 <unknown>"
        );
    }

    #[test]
    fn loads_template_from_file() {
        let path = std::env::temp_dir().join("lavender-template-test.txt");
        fs::write(&path, "Hello <email>").unwrap();
        let template = EmailTemplate::load(&path).unwrap();
        let values = TemplateValues {
            email: "a@b.hu".to_string(),
            ..Default::default()
        };
        assert_eq!(template.render(&values), "Hello a@b.hu");
        let _ = fs::remove_file(&path);
    }
}
