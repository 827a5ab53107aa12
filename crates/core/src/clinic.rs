//! Clinic identity and contact details.

use serde::{Deserialize, Serialize};

/// Identity of the clinic the assistant speaks for.
///
/// The domain scopes retrieval to the clinic's own pages; the contact
/// details end up in every "please contact us" fallback message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicProfile {
    /// Display name of the clinic
    pub name: String,

    /// Website domain used to filter knowledge base documents
    pub domain: String,

    /// Public phone number
    pub phone: String,

    /// Public email address
    pub email: String,

    /// Region used to localize pricing searches
    pub region: String,

    /// Lead physician
    pub doctor: String,
}

impl Default for ClinicProfile {
    fn default() -> Self {
        Self {
            name: "Haut Labor Oldenburg".to_string(),
            domain: "haut-labor.de".to_string(),
            phone: "+49 (0) 157 834 488 90".to_string(),
            email: "info@haut-labor.de".to_string(),
            region: "Germany".to_string(),
            doctor: "Dr. Larisa Pfahl".to_string(),
        }
    }
}

impl ClinicProfile {
    /// Phone and email joined for use in sentences ("... at X or Y").
    pub fn contact_line(&self) -> String {
        format!("{} or {}", self.phone, self.email)
    }
}
