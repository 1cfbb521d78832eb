use crate::{
    crud::{Record, STUDENT_PROFILES, new_record_id},
    data::{
        format_optional_date, is_safe_url, is_valid_email, parse_gpa, parse_optional_date,
        search_matches,
    },
};
use bitflags::bitflags;
use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub student_id: String,
    pub email: String,
    pub major: String,
    pub gpa: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<Date>,
    pub resume_url: String,
    pub profile_picture: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
}

impl Record for StudentProfile {
    const COLLECTION: &'static str = STUDENT_PROFILES;

    fn id(&self) -> &str {
        &self.id
    }
}

///`STU-` followed by the current unix time in milliseconds
pub fn generate_student_id() -> String {
    format!("STU-{}", Timestamp::now().as_millisecond())
}

impl StudentProfile {
    ///the profile provisioned when someone signs up through the auth modal
    pub fn signup_stub(full_name: &str, email: &str) -> Self {
        Self {
            id: new_record_id(),
            full_name: full_name.trim().to_string(),
            student_id: generate_student_id(),
            email: email.trim().to_string(),
            ..Default::default()
        }
    }

    pub fn matches_search(&self, term: &str) -> bool {
        search_matches(
            term,
            [
                self.full_name.as_str(),
                self.student_id.as_str(),
                self.email.as_str(),
                self.major.as_str(),
            ],
        )
    }

    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StudentFormProblems: u8 {
        const MISSING_NAME =        0b0000_0001;
        const INVALID_EMAIL =       0b0000_0010;
        const BAD_GPA =             0b0000_0100;
        const BAD_GRADUATION_DATE = 0b0000_1000;
        const BAD_RESUME_URL =      0b0001_0000;
        const BAD_PICTURE_URL =     0b0010_0000;
    }
}

impl StudentFormProblems {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|e| match e {
            Self::MISSING_NAME => Some("Full name is required"),
            Self::INVALID_EMAIL => Some("Please enter a valid email address"),
            Self::BAD_GPA => Some("GPA must be a number"),
            Self::BAD_GRADUATION_DATE => Some("Graduation date must be a valid date"),
            Self::BAD_RESUME_URL => Some("Resume URL must start with http:// or https://"),
            Self::BAD_PICTURE_URL => Some("Profile picture URL must start with http:// or https://"),
            _ => None,
        })
    }
}

///exactly what the create/edit form posts, all as strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub gpa: String,
    #[serde(default)]
    pub graduation_date: String,
    #[serde(default)]
    pub resume_url: String,
    #[serde(default)]
    pub profile_picture: String,
}

impl From<&StudentProfile> for StudentProfileForm {
    fn from(profile: &StudentProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            major: profile.major.clone(),
            gpa: profile.gpa.to_string(),
            graduation_date: format_optional_date(profile.graduation_date),
            resume_url: profile.resume_url.clone(),
            profile_picture: profile.profile_picture.clone(),
        }
    }
}

impl StudentProfileForm {
    ///copies the form onto `profile`, leaving `_id` and `studentId` alone
    pub fn apply_to(&self, profile: &mut StudentProfile) -> Result<(), StudentFormProblems> {
        let mut problems = StudentFormProblems::empty();

        if self.full_name.trim().is_empty() {
            problems |= StudentFormProblems::MISSING_NAME;
        }
        if !is_valid_email(self.email.trim()) {
            problems |= StudentFormProblems::INVALID_EMAIL;
        }
        if !is_safe_url(&self.resume_url) {
            problems |= StudentFormProblems::BAD_RESUME_URL;
        }
        if !is_safe_url(&self.profile_picture) {
            problems |= StudentFormProblems::BAD_PICTURE_URL;
        }
        let gpa = parse_gpa(&self.gpa).inspect_err(|_| problems |= StudentFormProblems::BAD_GPA);
        let graduation_date = parse_optional_date(&self.graduation_date)
            .inspect_err(|_| problems |= StudentFormProblems::BAD_GRADUATION_DATE);

        let (Ok(gpa), Ok(graduation_date)) = (gpa, graduation_date) else {
            return Err(problems);
        };
        if !problems.is_empty() {
            return Err(problems);
        }

        profile.full_name = self.full_name.trim().to_string();
        profile.email = self.email.trim().to_string();
        profile.major = self.major.trim().to_string();
        profile.gpa = gpa;
        profile.graduation_date = graduation_date;
        profile.resume_url = self.resume_url.trim().to_string();
        profile.profile_picture = self.profile_picture.trim().to_string();

        Ok(())
    }

    pub fn into_new_profile(self) -> Result<StudentProfile, StudentFormProblems> {
        let mut profile = StudentProfile {
            id: new_record_id(),
            student_id: generate_student_id(),
            ..Default::default()
        };
        self.apply_to(&mut profile)?;
        Ok(profile)
    }
}
