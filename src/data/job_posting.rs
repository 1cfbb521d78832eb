use crate::{
    crud::{JOB_POSTINGS, Record},
    data::search_matches,
};
use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

///Postings are only ever listed here, whatever writes them lives elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub application_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<Date>,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
}

impl Record for JobPosting {
    const COLLECTION: &'static str = JOB_POSTINGS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl JobPosting {
    pub fn matches_search(&self, term: &str) -> bool {
        search_matches(
            term,
            [
                self.job_title.as_str(),
                self.department.as_str(),
                self.location.as_str(),
                self.employment_type.as_str(),
            ],
        )
    }
}

///newest first, undated postings last
pub fn sort_newest_first(postings: &mut [JobPosting]) {
    postings.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
}
