//! Outbound transactional mail.
//!
//! Nothing here touches invite state: a failed send is reported to the caller
//! and the stored record stays as it was.

pub mod resend;

pub use resend::ResendMailer;

use askama::Template;
use thiserror::Error;

use crate::models::InviteRecord;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to render mail: {0}")]
    Render(#[from] askama::Error),
    #[error("mail provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Welcome,
    InviteNotice,
    InviteCode,
    Verified,
}

impl MailKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "welcome" => Some(MailKind::Welcome),
            "invite_notice" => Some(MailKind::InviteNotice),
            "invite_code" => Some(MailKind::InviteCode),
            "verified" => Some(MailKind::Verified),
            _ => None,
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            MailKind::Welcome => "Your TimeTable account has been created",
            MailKind::InviteNotice => "You have been invited to TimeTable",
            MailKind::InviteCode => "TimeTable invitation - registration code",
            MailKind::Verified => "Verification complete - welcome to TimeTable",
        }
    }

    /// Message returned to the caller after a successful send.
    pub fn sent_message(self) -> &'static str {
        match self {
            MailKind::Welcome => "Welcome mail sent.",
            MailKind::InviteNotice => "Invitation mail sent.",
            MailKind::InviteCode => "Invitation code sent.",
            MailKind::Verified => "Verification mail sent.",
        }
    }
}

/// Free-form fields a mail may mention. Blank values fall back to defaults
/// when rendered.
#[derive(Debug, Clone, Default)]
pub struct MailDetails {
    pub name: String,
    pub company: String,
    pub role: String,
    pub invited_by: String,
    pub contractor: String,
    pub team: String,
    pub code: String,
    pub expires_at: String,
}

#[derive(Debug, Clone)]
pub struct Mail {
    pub kind: MailKind,
    pub to: String,
    pub details: MailDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub to: String,
    pub subject: &'static str,
    pub html: String,
}

struct MailContext<'a> {
    name: &'a str,
    company: &'a str,
    role: &'a str,
    invited_by: &'a str,
    contractor: &'a str,
    team: &'a str,
    code: &'a str,
    expires_at: &'a str,
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { fallback } else { value }
}

#[derive(Template)]
#[template(path = "mail/welcome.html")]
struct WelcomeTemplate<'a> {
    mail: MailContext<'a>,
}

#[derive(Template)]
#[template(path = "mail/invite_notice.html")]
struct InviteNoticeTemplate<'a> {
    mail: MailContext<'a>,
}

#[derive(Template)]
#[template(path = "mail/invite_code.html")]
struct InviteCodeTemplate<'a> {
    mail: MailContext<'a>,
}

#[derive(Template)]
#[template(path = "mail/verified.html")]
struct VerifiedTemplate<'a> {
    mail: MailContext<'a>,
}

impl Mail {
    /// The registration-code mail for a freshly created invite.
    pub fn invite_code(record: &InviteRecord) -> Self {
        Self {
            kind: MailKind::InviteCode,
            to: record.email.clone(),
            details: MailDetails {
                name: record.name.clone(),
                company: record.company.clone(),
                role: record.role.clone(),
                invited_by: record.invited_by.clone(),
                contractor: record.contractor.clone(),
                team: record.team.clone(),
                code: record.code.clone(),
                expires_at: record.expires_at.clone(),
            },
        }
    }

    pub fn render(&self) -> Result<RenderedMail, MailError> {
        let d = &self.details;
        let mail = MailContext {
            name: or_default(&d.name, "user"),
            company: or_default(&d.company, "TimeTable"),
            role: or_default(&d.role, "Employee"),
            invited_by: or_default(&d.invited_by, "administrator"),
            contractor: d.contractor.trim(),
            team: d.team.trim(),
            code: d.code.trim(),
            expires_at: or_default(&d.expires_at, "24 hours"),
        };

        let html = match self.kind {
            MailKind::Welcome => WelcomeTemplate { mail }.render()?,
            MailKind::InviteNotice => InviteNoticeTemplate { mail }.render()?,
            MailKind::InviteCode => InviteCodeTemplate { mail }.render()?,
            MailKind::Verified => VerifiedTemplate { mail }.render()?,
        };

        Ok(RenderedMail {
            to: self.to.clone(),
            subject: self.kind.subject(),
            html,
        })
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// False when sends are skipped because delivery is not configured.
    fn enabled(&self) -> bool;

    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Used when no mail provider is configured.
pub struct DisabledNotifier;

#[async_trait::async_trait]
impl Notifier for DisabledNotifier {
    fn enabled(&self) -> bool {
        false
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        tracing::debug!(to = %mail.to, kind = ?mail.kind, "mail delivery not configured, skipping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(kind: MailKind, details: MailDetails) -> Mail {
        Mail {
            kind,
            to: "a@b.com".into(),
            details,
        }
    }

    #[test]
    fn kind_parse() {
        assert_eq!(MailKind::parse("invite_code"), Some(MailKind::InviteCode));
        assert_eq!(MailKind::parse("welcome"), Some(MailKind::Welcome));
        assert_eq!(MailKind::parse("bogus"), None);
    }

    #[test]
    fn blank_fields_use_defaults() {
        let rendered = mail(MailKind::InviteNotice, MailDetails::default()).render().unwrap();
        assert!(rendered.html.contains("Hello user,"));
        assert!(rendered.html.contains("<strong>TimeTable</strong>"));
        assert!(rendered.html.contains("<strong>Employee</strong>"));
        assert!(rendered.html.contains("<strong>administrator</strong>"));
    }

    #[test]
    fn invite_code_mail_lists_optional_lines_only_when_set() {
        let details = MailDetails {
            name: "Jan".into(),
            company: "Acme".into(),
            code: "ABCD2345".into(),
            expires_at: "2025-01-31T09:00:00.000Z".into(),
            ..Default::default()
        };
        let without = mail(MailKind::InviteCode, details.clone()).render().unwrap();
        assert!(without.html.contains("ABCD2345"));
        assert!(without.html.contains("2025-01-31T09:00:00.000Z"));
        assert!(!without.html.contains("Subcontractor"));
        assert!(!without.html.contains("Team:"));

        let with = mail(
            MailKind::InviteCode,
            MailDetails {
                contractor: "Bouw BV".into(),
                team: "North".into(),
                ..details
            },
        )
        .render()
        .unwrap();
        assert!(with.html.contains("Subcontractor: <strong>Bouw BV</strong>"));
        assert!(with.html.contains("Team: <strong>North</strong>"));
        assert_eq!(with.subject, "TimeTable invitation - registration code");
    }

    #[test]
    fn values_are_html_escaped() {
        let details = MailDetails {
            name: "<script>".into(),
            ..Default::default()
        };
        let rendered = mail(MailKind::Welcome, details).render().unwrap();
        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("script"));
    }
}
