use chrono::{DateTime, Utc};
use domain_users::{FarmerApplicationStatus, Role, UserPatch, UserSummary};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Review status of an application
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Statuses that count toward the one-active-application rule
    pub const ACTIVE: [ApplicationStatus; 2] =
        [ApplicationStatus::Pending, ApplicationStatus::Approved];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// The write-back this status requires on the owning user
    pub fn user_patch(self) -> UserPatch {
        match self {
            ApplicationStatus::Approved => UserPatch {
                role: Some(Role::Farmer),
                farmer_application_status: Some(FarmerApplicationStatus::Approved),
            },
            ApplicationStatus::Rejected => UserPatch {
                role: None,
                farmer_application_status: Some(FarmerApplicationStatus::Rejected),
            },
            ApplicationStatus::Pending => UserPatch {
                role: None,
                farmer_application_status: Some(FarmerApplicationStatus::Pending),
            },
        }
    }
}

/// Farmer application entity as stored in `farmer_applications`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FarmerApplication {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub business_address: String,
    pub business_phone: String,
    pub business_email: String,
    pub business_description: String,
    pub certifications: Option<String>,
    pub experience: Option<String>,
    pub products: Option<String>,
    pub id_card_url: Option<String>,
    pub proof_of_farm_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission body; the applicant is always the caller
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplicationDetails {
    #[validate(length(min = 1, max = 200))]
    pub business_name: String,
    #[validate(length(min = 1, max = 500))]
    pub business_address: String,
    #[validate(length(min = 5, max = 30))]
    pub business_phone: String,
    #[validate(email, length(max = 255))]
    pub business_email: String,
    #[validate(length(min = 1, max = 5000))]
    pub business_description: String,
    #[validate(length(max = 2000))]
    pub certifications: Option<String>,
    #[validate(length(max = 2000))]
    pub experience: Option<String>,
    #[validate(length(max = 2000))]
    pub products: Option<String>,
    #[validate(url)]
    pub id_card_url: Option<String>,
    #[validate(url)]
    pub proof_of_farm_url: Option<String>,
}

/// Partial update of business details; never touches status
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateApplicationDetails {
    #[validate(length(min = 1, max = 200))]
    pub business_name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub business_address: Option<String>,
    #[validate(length(min = 5, max = 30))]
    pub business_phone: Option<String>,
    #[validate(email, length(max = 255))]
    pub business_email: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub business_description: Option<String>,
    #[validate(length(max = 2000))]
    pub certifications: Option<String>,
    #[validate(length(max = 2000))]
    pub experience: Option<String>,
    #[validate(length(max = 2000))]
    pub products: Option<String>,
    #[validate(url)]
    pub id_card_url: Option<String>,
    #[validate(url)]
    pub proof_of_farm_url: Option<String>,
}

impl UpdateApplicationDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

/// An application together with who submitted it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationWithApplicant {
    #[serde(flatten)]
    pub application: FarmerApplication,
    /// Absent if the user record no longer resolves
    pub applicant: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

/// Query filters for listing applications
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for ApplicationFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    100
}

impl FarmerApplication {
    pub fn new(user_id: Uuid, details: ApplicationDetails) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            business_name: details.business_name,
            business_address: details.business_address,
            business_phone: details.business_phone,
            business_email: details.business_email,
            business_description: details.business_description,
            certifications: details.certifications,
            experience: details.experience,
            products: details.products,
            id_card_url: details.id_card_url,
            proof_of_farm_url: details.proof_of_farm_url,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_details(&mut self, update: UpdateApplicationDetails) {
        if let Some(v) = update.business_name {
            self.business_name = v;
        }
        if let Some(v) = update.business_address {
            self.business_address = v;
        }
        if let Some(v) = update.business_phone {
            self.business_phone = v;
        }
        if let Some(v) = update.business_email {
            self.business_email = v;
        }
        if let Some(v) = update.business_description {
            self.business_description = v;
        }
        if update.certifications.is_some() {
            self.certifications = update.certifications;
        }
        if update.experience.is_some() {
            self.experience = update.experience;
        }
        if update.products.is_some() {
            self.products = update.products;
        }
        if update.id_card_url.is_some() {
            self.id_card_url = update.id_card_url;
        }
        if update.proof_of_farm_url.is_some() {
            self.proof_of_farm_url = update.proof_of_farm_url;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ApplicationDetails {
        ApplicationDetails {
            business_name: "Green Acres".to_string(),
            business_address: "12 Farm Road".to_string(),
            business_phone: "+2348000000000".to_string(),
            business_email: "hello@greenacres.ng".to_string(),
            business_description: "Cassava and yams".to_string(),
            certifications: None,
            experience: Some("10 years".to_string()),
            products: None,
            id_card_url: None,
            proof_of_farm_url: None,
        }
    }

    #[test]
    fn new_application_is_pending() {
        let app = FarmerApplication::new(Uuid::now_v7(), details());
        assert_eq!(app.status, ApplicationStatus::Pending);
    }

    #[test]
    fn approval_makes_the_user_a_farmer() {
        let patch = ApplicationStatus::Approved.user_patch();
        assert_eq!(patch.role, Some(Role::Farmer));
        assert_eq!(
            patch.farmer_application_status,
            Some(FarmerApplicationStatus::Approved)
        );
    }

    #[test]
    fn rejection_leaves_role_alone() {
        let patch = ApplicationStatus::Rejected.user_patch();
        assert_eq!(patch.role, None);
        assert_eq!(
            patch.farmer_application_status,
            Some(FarmerApplicationStatus::Rejected)
        );
    }

    #[test]
    fn apply_details_keeps_status() {
        let mut app = FarmerApplication::new(Uuid::now_v7(), details());
        app.status = ApplicationStatus::Approved;

        app.apply_details(UpdateApplicationDetails {
            business_name: Some("Greener Acres".to_string()),
            ..Default::default()
        });

        assert_eq!(app.business_name, "Greener Acres");
        assert_eq!(app.experience.as_deref(), Some("10 years"));
        assert_eq!(app.status, ApplicationStatus::Approved);
    }

    #[test]
    fn applicant_is_flattened_next_to_application_fields() {
        let app = FarmerApplication::new(Uuid::now_v7(), details());
        let json = serde_json::to_value(ApplicationWithApplicant {
            application: app,
            applicant: None,
        })
        .unwrap();

        assert_eq!(json["business_name"], "Green Acres");
        assert_eq!(json["status"], "pending");
        assert!(json["applicant"].is_null());
    }
}
