use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
use crate::test_utils::{setup_test_app, setup_test_app_with_state};
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::NaiveDate;
use common::{
    AssignPersonsRequest, CreateDelegateRequest, CreateGovernmentRequest, CreatePersonRequest,
    CreateProductRequest, CreateRegionRequest, CreateReportRequest, CreateSampleRequest,
    CreateSpecialtyRequest, DelegateDto, DoctorDetail, GovernmentDto, ImportSummary, Paginated,
    PersonDto, PharmacienDetail, ProductDto, RegionDto, ReportDto, ReportProductLine,
    ReportSampleLine, SampleDto, SpecialtyDto,
};
use rust_decimal::Decimal;
use serde_json::json;
use services::ImportEvent;

async fn test_server() -> TestServer {
    TestServer::new(setup_test_app().await).unwrap()
}

async fn create_government(server: &TestServer, name: &str) -> GovernmentDto {
    let response = server
        .post("/api/v1/governments")
        .json(&CreateGovernmentRequest {
            name: name.to_string(),
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<ApiResponse<GovernmentDto>>().data
}

async fn create_region(server: &TestServer, name: &str, government_id: i32) -> RegionDto {
    let response = server
        .post("/api/v1/regions")
        .json(&CreateRegionRequest {
            name: name.to_string(),
            government_id,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<ApiResponse<RegionDto>>().data
}

fn person_request(firstname: &str, lastname: &str, region: &RegionDto) -> CreatePersonRequest {
    CreatePersonRequest {
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        address: "Avenue Habib Bourguiba".to_string(),
        phone_number: "71000000".to_string(),
        email: None,
        code: None,
        potential: None,
        government_id: region.government_id,
        region_id: region.id,
        doctor: None,
        pharmacien: None,
        wholesaler: None,
    }
}

async fn create_person(server: &TestServer, request: CreatePersonRequest) -> PersonDto {
    let response = server.post("/api/v1/persons").json(&request).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<ApiResponse<PersonDto>>().data
}

fn csv_upload(body: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(body.as_bytes().to_vec())
            .file_name("upload.csv")
            .mime_type("text/csv"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let server = test_server().await;

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.database, "connected");
}

#[tokio::test]
async fn test_openapi_document_lists_resources() {
    let server = test_server().await;

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status(StatusCode::OK);
    let doc: serde_json::Value = response.json();
    assert_eq!(doc["info"]["title"], "FieldOps API");
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/api/v1/persons",
        "/api/v1/persons/import/doctors",
        "/api/v1/products/import",
        "/api/v1/reports/{report_id}",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
}

#[tokio::test]
async fn test_government_crud_and_not_found() {
    let server = test_server().await;
    let created = create_government(&server, "Tunis").await;

    let response = server
        .put(&format!("/api/v1/governments/{}", created.id))
        .json(&json!({ "name": "Grand Tunis" }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: ApiResponse<GovernmentDto> = response.json();
    assert!(body.success);
    assert_eq!(body.data.name, "Grand Tunis");

    let response = server
        .delete(&format!("/api/v1/governments/{}", created.id))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .get(&format!("/api/v1/governments/{}", created.id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "NOT_FOUND");
    assert!(!error.success);
}

#[tokio::test]
async fn test_region_requires_existing_government() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/regions")
        .json(&CreateRegionRequest {
            name: "Bardo".to_string(),
            government_id: 99,
        })
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Government with id 99 not found");
}

#[tokio::test]
async fn test_full_last_page_still_reports_next_page() {
    let server = test_server().await;
    for name in ["Ariana", "Beja", "Gabes", "Kef"] {
        create_government(&server, name).await;
    }

    let response = server
        .get("/api/v1/governments")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .await;
    response.assert_status(StatusCode::OK);
    let page: Paginated<GovernmentDto> = response.json();
    assert_eq!(page.total, 4);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].name, "Gabes");
    assert!(page.has_next_page);

    let response = server
        .get("/api/v1/governments")
        .add_query_param("page", 3)
        .add_query_param("limit", 2)
        .await;
    let page: Paginated<GovernmentDto> = response.json();
    assert!(page.data.is_empty());
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn test_list_rejects_zero_limit() {
    let server = test_server().await;

    let response = server
        .get("/api/v1/products")
        .add_query_param("limit", 0)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rejects_page_past_the_cap() {
    let server = test_server().await;

    let response = server
        .get("/api/v1/governments")
        .add_query_param("page", 10_000_001u64)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/governments")
        .add_query_param("page", 10_000_000u64)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_person_filters_and_search() {
    let server = test_server().await;
    let tunis = create_government(&server, "Tunis").await;
    let bardo = create_region(&server, "Bardo", tunis.id).await;

    let response = server
        .post("/api/v1/specialties")
        .json(&CreateSpecialtyRequest {
            name: "Cardiologie".to_string(),
            abbreviation: "CAR".to_string(),
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    let cardio = response.json::<ApiResponse<SpecialtyDto>>().data;

    let mut doctor = person_request("Jean-Paul", "Dupont", &bardo);
    doctor.doctor = Some(DoctorDetail {
        doctor_type: Some(1),
        specialty_id: Some(cardio.id),
    });
    let doctor = create_person(&server, doctor).await;
    assert_eq!(doctor.person_type, 1);
    assert_eq!(
        doctor.doctor.as_ref().and_then(|d| d.specialty.as_ref()).map(|s| s.id),
        Some(cardio.id)
    );

    let mut pharmacist = person_request("Rim", "Jebali", &bardo);
    pharmacist.pharmacien = Some(PharmacienDetail {
        contact: None,
        pharmacy_type: Some(2),
        pharmacy_name: "Pharmacie du Bardo".to_string(),
    });
    let pharmacist = create_person(&server, pharmacist).await;

    // doctor-only keys are dropped when the type does not select doctors
    let response = server
        .get("/api/v1/persons")
        .add_query_param("specialty", "1,2")
        .add_query_param("type", 2)
        .await;
    response.assert_status(StatusCode::OK);
    let page: Paginated<PersonDto> = response.json();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, pharmacist.id);

    let response = server
        .get("/api/v1/persons")
        .add_query_param("search", "jean dupont")
        .await;
    let page: Paginated<PersonDto> = response.json();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, doctor.id);

    let response = server
        .get("/api/v1/persons")
        .add_query_param("type", 7)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "INVALID_ARGUMENT");

    let response = server
        .post("/api/v1/persons/filter")
        .json(&json!({ "region": { "id": bardo.id }, "type": 1 }))
        .await;
    response.assert_status(StatusCode::OK);
    let rows: Vec<PersonDto> = response.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, doctor.id);
}

#[tokio::test]
async fn test_person_needs_exactly_one_type_detail() {
    let server = test_server().await;
    let tunis = create_government(&server, "Tunis").await;
    let bardo = create_region(&server, "Bardo", tunis.id).await;

    let response = server
        .post("/api/v1/persons")
        .json(&person_request("Sami", "Ali", &bardo))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "VALIDATION_ERROR");

    let mut both = person_request("Sami", "Ali", &bardo);
    both.doctor = Some(DoctorDetail::default());
    both.pharmacien = Some(PharmacienDetail {
        pharmacy_name: "Pharmacie".to_string(),
        ..Default::default()
    });
    let response = server.post("/api/v1/persons").json(&both).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delegate_assignment_lifecycle() {
    let server = test_server().await;
    let tunis = create_government(&server, "Tunis").await;
    let bardo = create_region(&server, "Bardo", tunis.id).await;
    let mut doctor = person_request("Sami", "Ali", &bardo);
    doctor.doctor = Some(DoctorDetail::default());
    let doctor = create_person(&server, doctor).await;
    let mut other = person_request("Nour", "Said", &bardo);
    other.doctor = Some(DoctorDetail::default());
    let other = create_person(&server, other).await;

    let mut delegate = CreateDelegateRequest {
        firstname: "Karim".to_string(),
        lastname: "Trabelsi".to_string(),
        phone_number: "98000000".to_string(),
        address: "Sfax".to_string(),
        email: Some("karim@example.com".to_string()),
        password: None,
    };
    let response = server.post("/api/v1/delegates").json(&delegate).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    delegate.password = Some("secret".to_string());
    let response = server.post("/api/v1/delegates").json(&delegate).await;
    response.assert_status(StatusCode::CREATED);
    let delegate_dto = response.json::<ApiResponse<DelegateDto>>().data;

    let response = server.post("/api/v1/delegates").json(&delegate).await;
    response.assert_status(StatusCode::CONFLICT);

    let response = server
        .post(&format!("/api/v1/delegates/{}/assign-persons", delegate_dto.id))
        .json(&AssignPersonsRequest {
            person: vec![doctor.id],
        })
        .await;
    response.assert_status(StatusCode::OK);
    let assigned = response.json::<ApiResponse<DelegateDto>>().data;
    assert_eq!(assigned.person_ids, vec![doctor.id]);

    let response = server
        .get(&format!("/api/v1/persons/delegate/{}", delegate_dto.id))
        .add_query_param("typeIds", "1,2")
        .await;
    response.assert_status(StatusCode::OK);
    let page: Paginated<PersonDto> = response.json();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, doctor.id);

    let response = server
        .get(&format!("/api/v1/persons/delegate/{}", delegate_dto.id))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get(&format!("/api/v1/persons/not-delegate/{}/1", delegate_dto.id))
        .await;
    let page: Paginated<PersonDto> = response.json();
    let ids: Vec<i32> = page.data.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![other.id]);

    for expected in [1, 0] {
        let response = server
            .delete(&format!("/api/v1/persons/{}/delegates", doctor.id))
            .add_query_param("delegateIds", delegate_dto.id)
            .await;
        response.assert_status(StatusCode::OK);
        let removed: ApiResponse<u64> = response.json();
        assert_eq!(removed.data, expected);
    }

    let response = server
        .delete(&format!("/api/v1/persons/{}/delegates", doctor.id))
        .add_query_param("delegateIds", "abc")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_doctor_import_streams_progress_and_is_idempotent() {
    let (app, state) = setup_test_app_with_state().await;
    let server = TestServer::new(app).unwrap();
    create_government(&server, "tunis").await;
    let mut events = state.notifier.subscribe();

    let csv = "name,government,region,specialty\nSami Ali,TUNIS,,Cardiologie\nNour Said,Sousse,,\n";
    let response = server
        .post("/api/v1/persons/import/doctors")
        .multipart(csv_upload(csv))
        .await;
    response.assert_status(StatusCode::OK);
    let summary = response.json::<ApiResponse<ImportSummary>>().data;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.created, 2);

    let mut progress = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ImportEvent::Progress(percent) = event {
            progress.push(percent);
        }
    }
    assert_eq!(progress, vec![0, 50]);

    let response = server.get("/api/v1/governments").await;
    let governments: Paginated<GovernmentDto> = response.json();
    let names: Vec<&str> = governments.data.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["tunis", "unknown"]);

    let response = server
        .post("/api/v1/persons/import/doctors")
        .multipart(csv_upload(csv))
        .await;
    let summary = response.json::<ApiResponse<ImportSummary>>().data;
    assert_eq!(summary.created, 0);

    let response = server.get("/api/v1/persons/type/1").await;
    let page: Paginated<PersonDto> = response.json();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_import_rejects_unknown_format() {
    let server = test_server().await;

    let response = server
        .post("/api/v1/samples/import")
        .add_query_param("format", "xlsx")
        .multipart(csv_upload("code,name\nS1,Doliprane\n"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "PARSE_ERROR");
}

#[tokio::test]
async fn test_product_import_skips_matching_code() {
    let server = test_server().await;
    let response = server
        .post("/api/v1/products")
        .json(&CreateProductRequest {
            name: "Paracetamol".to_string(),
            price: Some(Decimal::new(35, 1)),
            family: None,
            product_creation_date: None,
            product_code: Some("P100".to_string()),
            bar_code: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/products/import")
        .multipart(csv_upload("code,name,price\nP100,Aspirin,2\nP200,Ibuprofene,\"4,2\"\n"))
        .await;
    response.assert_status(StatusCode::OK);
    let summary = response.json::<ApiResponse<ImportSummary>>().data;
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 1);

    let response = server
        .post("/api/v1/products/filter")
        .json(&json!({ "productCode": ["p100", "p200"] }))
        .await;
    let products: Vec<ProductDto> = response.json();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "ibuprofene");
    assert_eq!(products[0].price, Decimal::new(42, 1));
}

#[tokio::test]
async fn test_duplicate_sample_is_a_conflict() {
    let server = test_server().await;
    let request = CreateSampleRequest {
        name: "Doliprane 500".to_string(),
        sample_code: Some("S1".to_string()),
    };

    server
        .post("/api/v1/samples")
        .json(&request)
        .await
        .assert_status(StatusCode::CREATED);
    let response = server.post("/api/v1/samples").json(&request).await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "CONFLICT");
}

#[tokio::test]
async fn test_export_persons_as_csv() {
    let server = test_server().await;
    let tunis = create_government(&server, "Tunis").await;
    let bardo = create_region(&server, "Bardo", tunis.id).await;
    let mut wholesaler = person_request("Ali", "Ben Salah", &bardo);
    wholesaler.wholesaler = Some(common::WholesalerDetail {
        company_name: "Grossiste Sud".to_string(),
    });
    let wholesaler = create_person(&server, wholesaler).await;

    let response = server.get("/api/v1/persons/export/type/3").await;

    response.assert_status(StatusCode::OK);
    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "id,firstname,lastname,address,phoneNumber,email,type,doctorId,pharmacienId,wholesalerId,governmentId,regionId"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with(&format!("{},Ali,Ben Salah,", wholesaler.id)));
}

#[tokio::test]
async fn test_report_lifecycle_and_filters() {
    let server = test_server().await;
    let tunis = create_government(&server, "Tunis").await;
    let bardo = create_region(&server, "Bardo", tunis.id).await;
    let mut doctor = person_request("Sami", "Ali", &bardo);
    doctor.doctor = Some(DoctorDetail::default());
    let doctor = create_person(&server, doctor).await;

    let response = server
        .post("/api/v1/delegates")
        .json(&CreateDelegateRequest {
            firstname: "Karim".to_string(),
            lastname: "Trabelsi".to_string(),
            phone_number: "98000000".to_string(),
            address: "Sfax".to_string(),
            email: Some("karim@example.com".to_string()),
            password: Some("secret".to_string()),
        })
        .await;
    let delegate = response.json::<ApiResponse<DelegateDto>>().data;

    let response = server
        .post("/api/v1/samples")
        .json(&CreateSampleRequest {
            name: "Doliprane 500".to_string(),
            sample_code: None,
        })
        .await;
    let sample = response.json::<ApiResponse<SampleDto>>().data;

    let mut report = CreateReportRequest {
        name: "Visite Bardo".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        duration: "30min".to_string(),
        specialty: "Cardiologie".to_string(),
        note: "Interested in samples".to_string(),
        status: "done".to_string(),
        government_id: tunis.id,
        region_id: bardo.id,
        person_id: doctor.id,
        delegate_id: delegate.id,
        samples: vec![ReportSampleLine {
            sample_id: sample.id,
            quantity: 3,
        }],
        products: vec![ReportProductLine {
            product_id: 404,
            potential: "A".to_string(),
        }],
    };
    let response = server.post("/api/v1/reports").json(&report).await;
    response.assert_status(StatusCode::NOT_FOUND);

    report.products.clear();
    let response = server.post("/api/v1/reports").json(&report).await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<ApiResponse<ReportDto>>().data;
    assert_eq!(created.report_samples.len(), 1);
    assert_eq!(created.report_samples[0].quantity, 3);

    let response = server
        .get("/api/v1/reports")
        .add_query_param("dateInterval", "2024-03-01,2024-03-31")
        .add_query_param("sampleId", sample.id)
        .await;
    let page: Paginated<ReportDto> = response.json();
    assert_eq!(page.total, 1);

    let response = server
        .get("/api/v1/reports")
        .add_query_param("dateInterval", "2024-04-01,2024-04-30")
        .await;
    let page: Paginated<ReportDto> = response.json();
    assert_eq!(page.total, 0);

    let response = server
        .get(&format!("/api/v1/reports/{}", created.id))
        .await;
    let fetched = response.json::<ApiResponse<ReportDto>>().data;
    assert_eq!(
        fetched.report_samples[0].sample.as_ref().map(|s| s.name.as_str()),
        Some("Doliprane 500")
    );

    server
        .delete(&format!("/api/v1/reports/{}", created.id))
        .await
        .assert_status(StatusCode::OK);
    server
        .get(&format!("/api/v1/reports/{}", created.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
