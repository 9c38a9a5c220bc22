use colored::Colorize;

use ctd_client::UserProfile;

pub const CONTACT_FOOTER: &str = "For any discrepancies/changes, contact varleen@thapar.edu";

/// Read-only profile card
pub fn render(profile: &UserProfile) -> String {
    let fields = [
        ("Display Name", &profile.display_name),
        ("Email", &profile.email),
        ("Roll Number", &profile.roll),
        ("Branch", &profile.branch),
        ("Year", &profile.year),
        ("Mobile", &profile.mobile),
    ];

    let mut out = format!("{}\n\n", "Profile".bold());
    for (label, value) in fields {
        let value = value.as_deref().unwrap_or("-");
        out.push_str(&format!("  {:<14}{}\n", format!("{}:", label), value));
    }
    out.push_str(&format!("\n{}\n", CONTACT_FOOTER.dimmed()));
    out
}
