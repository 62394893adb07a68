//! Applicant contact links and resume file naming.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `Resume_<name>.pdf`, with every whitespace character in the name replaced by `_`.
pub fn resume_filename(full_name: &str) -> String {
    let name: String = full_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("Resume_{name}.pdf")
}

pub fn tel_uri(phone: &str) -> String {
    format!("tel:{phone}")
}

/// Pre-filled `mailto:` link thanking the applicant for applying to `job_title`.
pub fn mailto_uri(email: &str, full_name: &str, job_title: &str, company: &str) -> String {
    let subject = format!("Regarding your application for {job_title}");
    let body = format!(
        "Dear {full_name},\n\nThank you for applying for the {job_title} position at {company}.\n\n"
    );
    format!(
        "mailto:{email}?subject={}&body={}",
        encode_component(&subject),
        encode_component(&body)
    )
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
