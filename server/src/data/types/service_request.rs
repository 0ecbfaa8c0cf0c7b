//! 311 service requests

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::data::traits::Dataset;
use crate::query::{Column, Record, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceRequest {
    #[serde(default)]
    pub id: i64,
    pub hbc_unique_key: Option<String>,
    pub unique_key: Option<String>,
    pub created_date: Option<NaiveDateTime>,
    pub closed_date: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
    pub resolution_action_updated_date: Option<NaiveDateTime>,
    pub agency: Option<String>,
    pub agency_name: Option<String>,
    pub complaint_type: Option<String>,
    pub descriptor: Option<String>,
    pub location_type: Option<String>,
    pub incident_zip: Option<String>,
    pub incident_address: Option<String>,
    pub street_name: Option<String>,
    pub address_type: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    pub community_board: Option<String>,
    pub borough: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "x_coordinate_state_plane")]
    #[sqlx(rename = "x_coordinate_state_plane")]
    pub x_coordinate: Option<f64>,
    #[serde(rename = "y_coordinate_state_plane")]
    #[sqlx(rename = "y_coordinate_state_plane")]
    pub y_coordinate: Option<f64>,
}

impl Record for ServiceRequest {
    fn query_schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<ServiceRequest>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            type S = ServiceRequest;
            Schema::new(vec![
                Column::integer("id", |r: &S| r.id.into()).required(),
                Column::text("hbc_unique_key", |r: &S| r.hbc_unique_key.clone().into()),
                Column::text("unique_key", |r: &S| r.unique_key.clone().into()),
                Column::datetime("created_date", |r: &S| r.created_date.into()),
                Column::datetime("closed_date", |r: &S| r.closed_date.into()),
                Column::datetime("due_date", |r: &S| r.due_date.into()),
                Column::datetime("resolution_action_updated_date", |r: &S| {
                    r.resolution_action_updated_date.into()
                }),
                Column::text("agency", |r: &S| r.agency.clone().into()),
                Column::text("agency_name", |r: &S| r.agency_name.clone().into()),
                Column::text("complaint_type", |r: &S| r.complaint_type.clone().into()),
                Column::text("descriptor", |r: &S| r.descriptor.clone().into()),
                Column::text("location_type", |r: &S| r.location_type.clone().into()),
                Column::text("incident_zip", |r: &S| r.incident_zip.clone().into()),
                Column::text("incident_address", |r: &S| r.incident_address.clone().into()),
                Column::text("street_name", |r: &S| r.street_name.clone().into()),
                Column::text("address_type", |r: &S| r.address_type.clone().into()),
                Column::text("city", |r: &S| r.city.clone().into()),
                Column::text("status", |r: &S| r.status.clone().into()),
                Column::text("community_board", |r: &S| r.community_board.clone().into()),
                Column::text("borough", |r: &S| r.borough.clone().into()),
                Column::float("latitude", |r: &S| r.latitude.into()),
                Column::float("longitude", |r: &S| r.longitude.into()),
                Column::float("x_coordinate", |r: &S| r.x_coordinate.into())
                    .wire("x_coordinate_state_plane"),
                Column::float("y_coordinate", |r: &S| r.y_coordinate.into())
                    .wire("y_coordinate_state_plane"),
            ])
        })
    }
}

impl Dataset for ServiceRequest {
    const TABLE: &'static str = "nyc_open_data_311_service_requests";
    const NAME: &'static str = "service request";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
