//! 311 call center inquiries

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::data::traits::Dataset;
use crate::query::{Column, Record, Schema};

/// One inquiry. `inquiry_date` / `inquiry_time` are stored and serialized
/// as `date` / `time`; the query engine accepts either spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CallCenterInquiry {
    #[serde(default)]
    pub id: i64,
    pub hbc_unique_key: Option<String>,
    pub unique_id: Option<String>,
    #[serde(rename = "date")]
    #[sqlx(rename = "date")]
    pub inquiry_date: Option<NaiveDateTime>,
    #[serde(rename = "time")]
    #[sqlx(rename = "time")]
    pub inquiry_time: Option<String>,
    pub date_time: Option<NaiveDateTime>,
    pub agency: Option<String>,
    pub agency_name: Option<String>,
    pub inquiry_name: Option<String>,
    pub brief_description: Option<String>,
    pub call_resolution: Option<String>,
}

impl Record for CallCenterInquiry {
    fn query_schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<CallCenterInquiry>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            type C = CallCenterInquiry;
            Schema::new(vec![
                Column::integer("id", |r: &C| r.id.into()).required(),
                Column::text("hbc_unique_key", |r: &C| r.hbc_unique_key.clone().into()),
                Column::text("unique_id", |r: &C| r.unique_id.clone().into()),
                Column::datetime("inquiry_date", |r: &C| r.inquiry_date.into()).wire("date"),
                Column::text("inquiry_time", |r: &C| r.inquiry_time.clone().into()).wire("time"),
                Column::datetime("date_time", |r: &C| r.date_time.into()),
                Column::text("agency", |r: &C| r.agency.clone().into()),
                Column::text("agency_name", |r: &C| r.agency_name.clone().into()),
                Column::text("inquiry_name", |r: &C| r.inquiry_name.clone().into()),
                Column::text("brief_description", |r: &C| {
                    r.brief_description.clone().into()
                }),
                Column::text("call_resolution", |r: &C| r.call_resolution.clone().into()),
            ])
        })
    }
}

impl Dataset for CallCenterInquiry {
    const TABLE: &'static str = "nyc_open_data_311_call_center_inquiry";
    const NAME: &'static str = "call center inquiry";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
