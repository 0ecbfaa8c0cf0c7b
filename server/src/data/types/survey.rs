//! 311 customer satisfaction survey responses

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::data::traits::Dataset;
use crate::query::{Column, Record, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomerSatisfactionSurvey {
    #[serde(default)]
    pub id: i64,
    pub year: Option<String>,
    pub campaign: Option<String>,
    pub channel: Option<String>,
    pub survey_type: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub completion_time: Option<NaiveDateTime>,
    pub survey_language: Option<String>,
    pub overall_satisfaction: Option<String>,
    pub wait_time: Option<String>,
    pub agent_customer_service: Option<String>,
    pub agent_job_knowledge: Option<String>,
    pub answer_satisfaction: Option<String>,
    pub nps: Option<i64>,
}

impl Record for CustomerSatisfactionSurvey {
    fn query_schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<CustomerSatisfactionSurvey>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            type S = CustomerSatisfactionSurvey;
            Schema::new(vec![
                Column::integer("id", |r: &S| r.id.into()).required(),
                Column::text("year", |r: &S| r.year.clone().into()),
                Column::text("campaign", |r: &S| r.campaign.clone().into()),
                Column::text("channel", |r: &S| r.channel.clone().into()),
                Column::text("survey_type", |r: &S| r.survey_type.clone().into()),
                Column::datetime("start_time", |r: &S| r.start_time.into()),
                Column::datetime("completion_time", |r: &S| r.completion_time.into()),
                Column::text("survey_language", |r: &S| r.survey_language.clone().into()),
                Column::text("overall_satisfaction", |r: &S| {
                    r.overall_satisfaction.clone().into()
                }),
                Column::text("wait_time", |r: &S| r.wait_time.clone().into()),
                Column::text("agent_customer_service", |r: &S| {
                    r.agent_customer_service.clone().into()
                }),
                Column::text("agent_job_knowledge", |r: &S| {
                    r.agent_job_knowledge.clone().into()
                }),
                Column::text("answer_satisfaction", |r: &S| {
                    r.answer_satisfaction.clone().into()
                }),
                Column::integer("nps", |r: &S| r.nps.into()),
            ])
        })
    }
}

impl Dataset for CustomerSatisfactionSurvey {
    const TABLE: &'static str = "nyc_open_data_311_customer_satisfaction_survey";
    const NAME: &'static str = "survey";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
