use chrono::{DateTime, Utc};

use super::Email;

/// Who an email is addressed to.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Offer terms as they appear in the offer email.
#[derive(Debug, Clone, Copy)]
pub struct OfferTerms<'a> {
    pub position: &'a str,
    pub salary: f64,
    pub letter_url: &'a str,
    pub accept_url: &'a str,
}

const MEETING_LINK_PENDING: &str = "Will be shared soon";

/// Renders the four candidate emails, signed with the company name.
#[derive(Debug, Clone, Copy)]
pub struct EmailTemplates<'a> {
    company: &'a str,
}

impl<'a> EmailTemplates<'a> {
    pub fn new(company: &'a str) -> Self {
        Self { company }
    }

    pub fn application_received(&self, to: Recipient<'_>, job_title: &str) -> Email {
        let name = escape_html(to.name);
        let title = escape_html(job_title);
        let body = format!(
            "<h2>Thank You for Your Application!</h2>\n\
             <p>Dear {name},</p>\n\
             <p>We have received your application for the position of <strong>{title}</strong>.</p>\n\
             <p>Our HR team will review your application and get back to you soon.</p>"
        );
        Email {
            to: to.email.to_string(),
            subject: format!("Application Received - {job_title}"),
            html: self.wrap(&body),
            text: format!(
                "Dear {},\n\nThank you for applying for {job_title}. We will review your application and get back to you soon.\n\n{}",
                to.name,
                self.sign_off()
            ),
        }
    }

    pub fn interview_scheduled(
        &self,
        to: Recipient<'_>,
        job_title: &str,
        scheduled_time: DateTime<Utc>,
        meeting_link: Option<&str>,
    ) -> Email {
        let when = format_when(scheduled_time);
        let link_html = match meeting_link {
            Some(link) => {
                let link = escape_html(link);
                format!("<a href=\"{link}\">{link}</a>")
            }
            None => MEETING_LINK_PENDING.to_string(),
        };
        let body = format!(
            "<h2>Interview Scheduled!</h2>\n\
             <p>Dear {},</p>\n\
             <p>Congratulations! You have been shortlisted for the position of <strong>{}</strong>.</p>\n\
             <p><strong>Interview Details:</strong></p>\n\
             <ul>\n<li>Date &amp; Time: {when}</li>\n<li>Meeting Link: {link_html}</li>\n</ul>\n\
             <p>Please be on time. We look forward to speaking with you!</p>",
            escape_html(to.name),
            escape_html(job_title),
        );
        Email {
            to: to.email.to_string(),
            subject: format!("Interview Scheduled - {job_title}"),
            html: self.wrap(&body),
            text: format!(
                "Dear {},\n\nYour interview for {job_title} has been scheduled for {when}.\n\nMeeting Link: {}\n\n{}",
                to.name,
                meeting_link.unwrap_or(MEETING_LINK_PENDING),
                self.sign_off()
            ),
        }
    }

    pub fn offer_letter(&self, to: Recipient<'_>, terms: OfferTerms<'_>) -> Email {
        let salary = format_salary(terms.salary);
        let position = escape_html(terms.position);
        let body = format!(
            "<h2>Congratulations! Job Offer</h2>\n\
             <p>Dear {},</p>\n\
             <p>We are pleased to offer you the position of <strong>{position}</strong> at {}.</p>\n\
             <p><strong>Offer Details:</strong></p>\n\
             <ul>\n<li>Position: {position}</li>\n<li>Salary: {salary}</li>\n</ul>\n\
             <p><a href=\"{}\">View Offer Letter</a></p>\n\
             <p><a href=\"{}\" style=\"background-color: #4CAF50; color: white; padding: 10px 20px; \
             text-decoration: none; border-radius: 5px; display: inline-block;\">Accept Offer</a></p>",
            escape_html(to.name),
            escape_html(self.company),
            escape_html(terms.letter_url),
            escape_html(terms.accept_url),
        );
        Email {
            to: to.email.to_string(),
            subject: format!("Job Offer - {}", terms.position),
            html: self.wrap(&body),
            text: format!(
                "Dear {},\n\nCongratulations! We are offering you the position of {} with a salary of {salary}.\n\nOffer Letter: {}\nAccept Offer: {}\n\n{}",
                to.name,
                terms.position,
                terms.letter_url,
                terms.accept_url,
                self.sign_off()
            ),
        }
    }

    pub fn rejection(&self, to: Recipient<'_>, job_title: &str) -> Email {
        let body = format!(
            "<h2>Application Update</h2>\n\
             <p>Dear {},</p>\n\
             <p>Thank you for your interest in the position of <strong>{}</strong> at {}.</p>\n\
             <p>After careful consideration, we have decided to move forward with other candidates \
             whose qualifications more closely match our current needs.</p>\n\
             <p>We appreciate the time you invested in the application process and wish you the best in your job search.</p>",
            escape_html(to.name),
            escape_html(job_title),
            escape_html(self.company),
        );
        Email {
            to: to.email.to_string(),
            subject: format!("Application Update - {job_title}"),
            html: self.wrap(&body),
            text: format!(
                "Dear {},\n\nThank you for applying for {job_title}. After careful consideration, we have decided to move forward with other candidates. We wish you the best in your job search.\n\n{}",
                to.name,
                self.sign_off()
            ),
        }
    }

    fn sign_off(&self) -> String {
        format!("Best regards,\n{}", self.company)
    }

    fn wrap(&self, body: &str) -> String {
        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
             {body}\n<br>\n<p>Best regards,</p>\n<p><strong>{}</strong></p>\n</div>",
            escape_html(self.company)
        )
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `85000.5` -> `$85,000.50`
pub fn format_salary(salary: f64) -> String {
    let cents = (salary * 100.0).round() as i64;
    let (whole, frac) = (cents / 100, (cents % 100).abs());
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

fn format_when(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d, %Y at %H:%M UTC").to_string()
}
