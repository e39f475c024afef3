//! E-mail templates
//!
//! Subjects and HTML bodies for every message MCare sends. All values
//! coming from users are HTML-escaped before interpolation.

use crate::domain::calendar::long_date;
use crate::domain::duty::Duty;
use crate::domain::user::User;

/// Subject and HTML body of one message, recipients not yet attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub html: String,
}

/// Which duty event a message announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyNotice {
    Assigned,
    Updated,
    Reminder,
}

impl DutyNotice {
    fn subject(&self, group_name: &str, date: &str) -> String {
        match self {
            Self::Assigned => format!("New Duty Assigned for {} on {}", group_name, date),
            Self::Updated => format!("Duty Updated for {} on {}", group_name, date),
            Self::Reminder => format!("Reminder: Duty Tomorrow ({})", group_name),
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            Self::Assigned => "New Duty Assigned",
            Self::Updated => "Your Duty Has Been Updated",
            Self::Reminder => "Your Duty Reminder",
        }
    }

    fn intro(&self) -> &'static str {
        match self {
            Self::Assigned => "You have been assigned a new duty with the following details:",
            Self::Updated => "Your previous duty has been updated with the following details:",
            Self::Reminder => "This is a reminder that you have a duty scheduled <b>tomorrow</b>:",
        }
    }

    fn closing(&self) -> &'static str {
        match self {
            Self::Reminder => "Please prepare accordingly. Thank you for your commitment!",
            _ => "Please be on time. This is an automated notification.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Updated => "updated",
            Self::Reminder => "reminder",
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(headline: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; background: #f9faf7; padding: 20px;">
  <div style="max-width: 600px; margin: auto; background: #ffffff; border-radius: 12px; overflow: hidden;">
    <div style="background: linear-gradient(135deg, #2e7d32, #c0ca33); padding: 20px; text-align: center;">
      <h1 style="margin: 0; font-size: 24px; color: #ffffff;">MCare</h1>
      <p style="margin: 5px 0 0; color: #fdfde7; font-size: 14px;">{headline}</p>
    </div>
    <div style="padding: 20px; color: #333;">
{body}
    </div>
    <div style="background: #2e7d32; padding: 15px; text-align: center; font-size: 13px; color: #ffffff;">
      <p style="margin: 0;">MCare. All Rights Reserved.</p>
    </div>
  </div>
</div>"#,
        headline = headline,
        body = body
    )
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        r#"        <tr><td style="padding: 8px; border: 1px solid #ddd; font-weight: bold; background: #f9fbe7;">{}</td><td style="padding: 8px; border: 1px solid #ddd;">{}</td></tr>"#,
        label,
        escape_html(value)
    )
}

/// Render a duty message addressed to `greeting` (a person's name, or
/// the group as a whole in batch delivery).
pub fn duty_email(kind: DutyNotice, greeting: &str, group_name: &str, duty: &Duty) -> Rendered {
    let date = long_date(duty.day());
    let rows = [
        detail_row("Group", group_name),
        detail_row("Date", &date),
        detail_row("Time", &duty.time_range),
        detail_row("Place", &duty.place),
        detail_row("Clinical Instructor", &duty.clinical_instructor),
        detail_row("Area", &duty.area),
    ]
    .join("\n");

    let body = format!(
        r#"      <p style="font-size: 16px;">Hello <b style="color: #2e7d32;">{greeting}</b>,</p>
      <p style="font-size: 16px;">{intro}</p>
      <table style="width: 100%; border-collapse: collapse; margin-top: 15px;">
{rows}
      </table>
      <p style="margin-top: 20px; font-size: 15px; color: #555;">{closing}</p>"#,
        greeting = escape_html(greeting),
        intro = kind.intro(),
        rows = rows,
        closing = kind.closing(),
    );

    Rendered {
        subject: kind.subject(group_name, &date),
        html: layout(kind.headline(), &body),
    }
}

pub fn welcome_email(user: &User) -> Rendered {
    let name = user.display_name();
    let body = format!(
        r#"      <p style="font-size: 16px;">Hello <b style="color: #2e7d32;">{name}</b>,</p>
      <p style="font-size: 16px;">Your MCare account is ready. Sign in with your username <b>{username}</b> to see your group, your duty schedule and your attendance QR code.</p>
      <p style="margin-top: 20px; font-size: 15px; color: #555;">School ID: {school_id}</p>"#,
        name = escape_html(name),
        username = escape_html(&user.username),
        school_id = escape_html(&user.school_id),
    );

    Rendered {
        subject: format!("Welcome to MCare, {}!", name),
        html: layout("Welcome aboard", &body),
    }
}

pub fn password_changed_email(user: &User, changed_at: &str) -> Rendered {
    let body = format!(
        r#"      <p style="font-size: 16px;">Hello <b style="color: #2e7d32;">{name}</b>,</p>
      <p style="font-size: 16px;">The password of your MCare account was changed on {changed_at}.</p>
      <p style="margin-top: 20px; font-size: 15px; color: #555;">If you did not make this change, contact your administrator immediately.</p>"#,
        name = escape_html(user.display_name()),
        changed_at = escape_html(changed_at),
    );

    Rendered {
        subject: "Your MCare Account Password Has Been Changed".to_string(),
        html: layout("Security notice", &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn duty() -> Duty {
        Duty {
            id: "d1".into(),
            group_id: "g1".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            place: "St. Luke's <Main>".into(),
            time_range: "7:00 AM - 3:00 PM".into(),
            clinical_instructor: "Dr. Cruz".into(),
            area: "Pediatrics".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn duty_subjects_carry_group_and_long_date() {
        let d = duty();
        assert_eq!(
            duty_email(DutyNotice::Assigned, "Ana", "Group A", &d).subject,
            "New Duty Assigned for Group A on Tuesday, June 10, 2025"
        );
        assert_eq!(
            duty_email(DutyNotice::Updated, "Ana", "Group A", &d).subject,
            "Duty Updated for Group A on Tuesday, June 10, 2025"
        );
        assert_eq!(
            duty_email(DutyNotice::Reminder, "Ana", "Group A", &d).subject,
            "Reminder: Duty Tomorrow (Group A)"
        );
    }

    #[test]
    fn duty_body_lists_every_field_escaped() {
        let rendered = duty_email(DutyNotice::Assigned, "<Ana>", "Group A", &duty());
        assert!(rendered.html.contains("St. Luke&#39;s &lt;Main&gt;"));
        assert!(rendered.html.contains("&lt;Ana&gt;"));
        assert!(rendered.html.contains("7:00 AM - 3:00 PM"));
        assert!(rendered.html.contains("Dr. Cruz"));
        assert!(rendered.html.contains("Pediatrics"));
        assert!(!rendered.html.contains("<Main>"));
    }

    #[test]
    fn reminder_body_says_tomorrow() {
        let rendered = duty_email(DutyNotice::Reminder, "Ana", "Group A", &duty());
        assert!(rendered.html.contains("<b>tomorrow</b>"));
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(escape_html(r#"a&b<c>"d"'e'"#), "a&amp;b&lt;c&gt;&quot;d&quot;&#39;e&#39;");
    }
}
