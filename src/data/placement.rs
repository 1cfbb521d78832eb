use crate::{
    crud::{Record, STUDENT_PLACEMENTS, new_record_id},
    data::{format_optional_date, is_safe_url, parse_optional_date, search_matches},
};
use bitflags::bitflags;
use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

///the statuses the forms offer, the stored field itself is free text
pub const CONVENTIONAL_STATUSES: [&str; 4] = ["pending", "active", "completed", "cancelled"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudentPlacement {
    #[serde(rename = "_id")]
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub placement_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    pub company_website: String,
    pub offer_letter_url: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
}

impl Record for StudentPlacement {
    const COLLECTION: &'static str = STUDENT_PLACEMENTS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl StudentPlacement {
    pub fn matches_search(&self, term: &str) -> bool {
        search_matches(
            term,
            [
                self.company_name.as_str(),
                self.job_title.as_str(),
                self.placement_status.as_str(),
            ],
        )
    }

    ///`None` or `"all"` lets everything through
    pub fn matches_status(&self, status: Option<&str>) -> bool {
        match status.map(str::trim) {
            None | Some("" | "all") => true,
            Some(status) => self.placement_status.trim().eq_ignore_ascii_case(status),
        }
    }

    pub fn status_badge_classes(&self) -> &'static str {
        match self.placement_status.trim().to_lowercase().as_str() {
            "active" => "bg-green-700 text-green-100",
            "pending" => "bg-yellow-700 text-yellow-100",
            "completed" => "bg-blue-700 text-blue-100",
            "cancelled" => "bg-red-700 text-red-100",
            _ => "bg-gray-600 text-gray-100",
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct PlacementFormProblems: u8 {
        const MISSING_COMPANY =      0b0000_0001;
        const MISSING_JOB_TITLE =    0b0000_0010;
        const BAD_START_DATE =       0b0000_0100;
        const BAD_END_DATE =         0b0000_1000;
        const BAD_WEBSITE_URL =      0b0001_0000;
        const BAD_OFFER_LETTER_URL = 0b0010_0000;
    }
}

impl PlacementFormProblems {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|e| match e {
            Self::MISSING_COMPANY => Some("Company name is required"),
            Self::MISSING_JOB_TITLE => Some("Job title is required"),
            Self::BAD_START_DATE => Some("Start date must be a valid date"),
            Self::BAD_END_DATE => Some("End date must be a valid date"),
            Self::BAD_WEBSITE_URL => Some("Company website must start with http:// or https://"),
            Self::BAD_OFFER_LETTER_URL => Some("Offer letter URL must start with http:// or https://"),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPlacementForm {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub placement_status: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub company_website: String,
    #[serde(default)]
    pub offer_letter_url: String,
}

impl From<&StudentPlacement> for StudentPlacementForm {
    fn from(placement: &StudentPlacement) -> Self {
        Self {
            company_name: placement.company_name.clone(),
            job_title: placement.job_title.clone(),
            placement_status: placement.placement_status.clone(),
            start_date: format_optional_date(placement.start_date),
            end_date: format_optional_date(placement.end_date),
            company_website: placement.company_website.clone(),
            offer_letter_url: placement.offer_letter_url.clone(),
        }
    }
}

impl StudentPlacementForm {
    pub fn apply_to(&self, placement: &mut StudentPlacement) -> Result<(), PlacementFormProblems> {
        let mut problems = PlacementFormProblems::empty();

        if self.company_name.trim().is_empty() {
            problems |= PlacementFormProblems::MISSING_COMPANY;
        }
        if self.job_title.trim().is_empty() {
            problems |= PlacementFormProblems::MISSING_JOB_TITLE;
        }
        if !is_safe_url(&self.company_website) {
            problems |= PlacementFormProblems::BAD_WEBSITE_URL;
        }
        if !is_safe_url(&self.offer_letter_url) {
            problems |= PlacementFormProblems::BAD_OFFER_LETTER_URL;
        }
        let start_date = parse_optional_date(&self.start_date)
            .inspect_err(|_| problems |= PlacementFormProblems::BAD_START_DATE);
        let end_date = parse_optional_date(&self.end_date)
            .inspect_err(|_| problems |= PlacementFormProblems::BAD_END_DATE);

        let (Ok(start_date), Ok(end_date)) = (start_date, end_date) else {
            return Err(problems);
        };
        if !problems.is_empty() {
            return Err(problems);
        }

        placement.company_name = self.company_name.trim().to_string();
        placement.job_title = self.job_title.trim().to_string();
        placement.placement_status = self.placement_status.trim().to_string();
        placement.start_date = start_date;
        placement.end_date = end_date;
        placement.company_website = self.company_website.trim().to_string();
        placement.offer_letter_url = self.offer_letter_url.trim().to_string();

        Ok(())
    }

    pub fn into_new_placement(self) -> Result<StudentPlacement, PlacementFormProblems> {
        let mut placement = StudentPlacement {
            id: new_record_id(),
            ..Default::default()
        };
        self.apply_to(&mut placement)?;
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crud::{CrudStore, create_record, get_all_records, memory::InMemoryCrudStore},
        data::search_matches,
    };
    use serde_json::{Value, json};

    fn acme() -> StudentPlacement {
        StudentPlacement {
            id: "p1".into(),
            company_name: "Acme".into(),
            job_title: "SWE".into(),
            placement_status: "Active".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn search_over_fetched_collection() {
        let store = InMemoryCrudStore::new();
        let Value::Object(doc) = json!({
            "_id": "p1",
            "companyName": "Acme",
            "jobTitle": "SWE",
            "placementStatus": "Active",
        }) else {
            unreachable!()
        };
        store.create(STUDENT_PLACEMENTS, doc).await.unwrap();

        let all: Vec<StudentPlacement> = get_all_records(&store).await.unwrap();
        let filtered: Vec<_> = all.iter().filter(|p| p.matches_search("acme")).collect();
        assert_eq!(filtered.len(), 1);

        let none: Vec<_> = all.iter().filter(|p| p.matches_search("globex")).collect();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn created_placements_come_back_with_timestamps() {
        let store = InMemoryCrudStore::new();
        let created = create_record(&store, &acme()).await.unwrap();

        assert!(created.created_date.is_some());
        assert_eq!(created.created_date, created.updated_date);
        assert_eq!(created.company_name, "Acme");
    }

    #[test]
    fn search_matches_each_field() {
        let placement = acme();
        assert!(placement.matches_search("acm"));
        assert!(placement.matches_search("swe"));
        assert!(placement.matches_search("ACTIVE"));
        assert!(!placement.matches_search("pending"));
        assert!(search_matches("", [placement.company_name.as_str()]));
    }

    #[test]
    fn status_filter() {
        let placement = acme();
        assert!(placement.matches_status(None));
        assert!(placement.matches_status(Some("all")));
        assert!(placement.matches_status(Some("")));
        assert!(placement.matches_status(Some("active")));
        assert!(!placement.matches_status(Some("completed")));
    }

    #[test]
    fn unconventional_statuses_are_kept() {
        let form = StudentPlacementForm {
            company_name: "Acme".into(),
            job_title: "SWE".into(),
            placement_status: "On Hold".into(),
            ..Default::default()
        };

        let placement = form.into_new_placement().unwrap();
        assert_eq!(placement.placement_status, "On Hold");
        assert_eq!(placement.status_badge_classes(), "bg-gray-600 text-gray-100");
    }

    #[test]
    fn form_requires_company_and_title() {
        let form = StudentPlacementForm {
            start_date: "2026-02-30".into(),
            ..Default::default()
        };

        assert_eq!(
            form.into_new_placement().unwrap_err(),
            PlacementFormProblems::MISSING_COMPANY
                | PlacementFormProblems::MISSING_JOB_TITLE
                | PlacementFormProblems::BAD_START_DATE
        );
    }

    #[test]
    fn form_rejects_script_links() {
        let form = StudentPlacementForm {
            company_name: "Acme".into(),
            job_title: "SWE Intern".into(),
            company_website: "javascript:alert(document.cookie)".into(),
            offer_letter_url: " JAVASCRIPT:alert(1)".into(),
            ..Default::default()
        };
        assert_eq!(
            form.into_new_placement().unwrap_err(),
            PlacementFormProblems::BAD_WEBSITE_URL | PlacementFormProblems::BAD_OFFER_LETTER_URL
        );

        let mut placement = acme();
        let form = StudentPlacementForm {
            company_website: "https://acme.example".into(),
            offer_letter_url: "ftp://acme.example/offer.pdf".into(),
            ..StudentPlacementForm::from(&placement)
        };
        assert_eq!(
            form.apply_to(&mut placement).unwrap_err(),
            PlacementFormProblems::BAD_OFFER_LETTER_URL
        );
        assert_eq!(placement, acme());
    }

    #[test]
    fn form_round_trips_through_edit() {
        let mut placement = acme();
        placement.start_date = Some(jiff::civil::date(2026, 1, 5));

        let mut form = StudentPlacementForm::from(&placement);
        assert_eq!(form.start_date, "2026-01-05");
        form.placement_status = "completed".into();
        form.end_date = "2026-07-01".into();
        form.apply_to(&mut placement).unwrap();

        assert_eq!(placement.id, "p1");
        assert_eq!(placement.placement_status, "completed");
        assert_eq!(placement.end_date, Some(jiff::civil::date(2026, 7, 1)));
    }
}
