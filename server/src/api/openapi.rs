//! OpenAPI specification and Swagger UI
//!
//! Dataset endpoints are served by generic handlers, so their paths are
//! added by [`DatasetPaths`] rather than `#[utoipa::path]` attributes.

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::openapi::path::{
    HttpMethod, OperationBuilder, Parameter, ParameterBuilder, ParameterIn,
};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::{
    Content, ContentBuilder, OpenApi as OpenApiDoc, Ref, Required, Response, ResponseBuilder,
};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::api::routes::health;
use crate::api::types::ErrorBody;
use crate::api::server::dataset_mounts;
use crate::data::types::{CallCenterInquiry, CustomerSatisfactionSurvey, ServiceRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HBC API",
        version = env!("CARGO_PKG_VERSION"),
        description = "OData-style REST access to NYC 311 datasets"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "datasets", description = "Dataset queries and CRUD")
    ),
    paths(health::health),
    components(schemas(
        health::HealthResponse,
        ErrorBody,
        CustomerSatisfactionSurvey,
        CallCenterInquiry,
        ServiceRequest,
    )),
    modifiers(&DatasetPaths)
)]
pub struct ApiDoc;

/// Adds the CRUD paths of every mounted dataset
pub struct DatasetPaths;

impl Modify for DatasetPaths {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        for mount in dataset_mounts() {
            add_dataset_paths(openapi, &mount.path, mount.name, &mount.schema);
        }
    }
}

/// Query-string options accepted by collection reads
const QUERY_OPTIONS: &[(&str, &str)] = &[
    ("$filter", "Boolean filter expression, e.g. `borough eq 'BRONX'`"),
    ("$orderby", "Comma-separated `column [asc|desc]` keys"),
    ("$select", "Comma-separated columns to return"),
    ("$apply", "`groupby((column))` with per-group counts"),
    ("$top", "Maximum rows to return"),
    ("$skip", "Rows to skip after ordering"),
    ("$count", "Include `@odata.count` when true"),
];

fn json_body(schema: &str) -> Content {
    ContentBuilder::new()
        .schema(Some(Ref::from_schema_name(schema)))
        .build()
}

fn response(description: &str) -> Response {
    ResponseBuilder::new().description(description).build()
}

fn json_response(description: &str, schema: &str) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content("application/json", json_body(schema))
        .build()
}

fn error_response(description: &str) -> Response {
    json_response(description, "ErrorBody")
}

fn id_parameter() -> Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some("Record id"))
        .build()
}

fn add_dataset_paths(openapi: &mut OpenApiDoc, path: &str, name: &str, schema: &str) {
    let paths = &mut openapi.paths;
    let item = format!("{}/{{id}}", path);
    let batch = format!("{}/batch", path);
    let tag = "datasets";

    let mut list = OperationBuilder::new()
        .tag(tag)
        .summary(Some(format!("Query {} records", name)))
        .response(
            "200",
            response("`{ \"value\": [...] }` plus optional `@odata.count`"),
        )
        .response("400", error_response("Invalid query option"));
    for (option, description) in QUERY_OPTIONS {
        list = list.parameter(
            ParameterBuilder::new()
                .name(*option)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .description(Some(*description))
                .build(),
        );
    }
    paths.add_path_operation(path, vec![HttpMethod::Get], list.build());

    paths.add_path_operation(
        path,
        vec![HttpMethod::Post],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!("Insert one {} record", name)))
            .request_body(Some(
                RequestBodyBuilder::new()
                    .content("application/json", json_body(schema))
                    .required(Some(Required::True))
                    .build(),
            ))
            .response(
                "201",
                json_response("Created; `Location` points at the new record", schema),
            )
            .build(),
    );

    paths.add_path_operation(
        &batch,
        vec![HttpMethod::Post],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!("Insert many {} records in one transaction", name)))
            .response("200", response("Stored records"))
            .response("400", error_response("Empty batch"))
            .build(),
    );

    paths.add_path_operation(
        &batch,
        vec![HttpMethod::Put],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!(
                "Upsert {} records: known ids are updated, the rest inserted",
                name
            )))
            .response("204", response("Applied"))
            .build(),
    );

    paths.add_path_operation(
        &item,
        vec![HttpMethod::Get],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!("Get one {} record", name)))
            .parameter(id_parameter())
            .response("200", json_response("Record", schema))
            .response("404", error_response("Not found"))
            .build(),
    );

    paths.add_path_operation(
        &item,
        vec![HttpMethod::Put],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!("Replace a {} record", name)))
            .parameter(id_parameter())
            .request_body(Some(
                RequestBodyBuilder::new()
                    .content("application/json", json_body(schema))
                    .required(Some(Required::True))
                    .build(),
            ))
            .response("204", response("Updated"))
            .response("404", error_response("Not found"))
            .build(),
    );

    paths.add_path_operation(
        &item,
        vec![HttpMethod::Delete],
        OperationBuilder::new()
            .tag(tag)
            .summary(Some(format!("Delete a {} record", name)))
            .parameter(id_parameter())
            .response("204", response("Deleted"))
            .response("404", error_response("Not found"))
            .build(),
    );
}

/// Schema name a dataset's record type is registered under
pub fn schema_name<R: ToSchema>() -> String {
    R::name().into_owned()
}

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>HBC API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;
