use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::use_cases::{
    GetDocumentChunksUseCase, GetDocumentUseCase, ListDocumentsUseCase, ProcessDocumentUseCase,
    UploadDocumentUseCase, get_document::GetDocumentError,
    get_document_chunks::{GetDocumentChunksError, GetDocumentChunksRequest},
    list_documents::{ListDocumentsError, ListDocumentsRequest},
    process_document::ProcessDocumentError,
    upload_document::{UploadDocumentError, UploadDocumentRequest},
};
use crate::presentation::http::dto::{
    DocumentChunksResponseDto, DocumentListResponseDto, DocumentResponseDto, PaginationDto,
    PaginationMetaDto, error_response, ok_response,
};

pub struct DocumentHandler {
    upload_use_case: Arc<UploadDocumentUseCase>,
    get_document_use_case: Arc<GetDocumentUseCase>,
    list_documents_use_case: Arc<ListDocumentsUseCase>,
    get_chunks_use_case: Arc<GetDocumentChunksUseCase>,
    process_document_use_case: Arc<ProcessDocumentUseCase>,
}

impl DocumentHandler {
    pub fn new(
        upload_use_case: Arc<UploadDocumentUseCase>,
        get_document_use_case: Arc<GetDocumentUseCase>,
        list_documents_use_case: Arc<ListDocumentsUseCase>,
        get_chunks_use_case: Arc<GetDocumentChunksUseCase>,
        process_document_use_case: Arc<ProcessDocumentUseCase>,
    ) -> Self {
        Self {
            upload_use_case,
            get_document_use_case,
            list_documents_use_case,
            get_chunks_use_case,
            process_document_use_case,
        }
    }

    /// Multipart upload with an `organization_id` text field and a `file` part.
    pub async fn upload_document(
        State(handler): State<Arc<DocumentHandler>>,
        mut multipart: Multipart,
    ) -> Response {
        let mut organization_id: Option<Uuid> = None;
        let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_MULTIPART", e),
            };

            match field.name() {
                Some("organization_id") => {
                    let text = match field.text().await {
                        Ok(text) => text,
                        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_MULTIPART", e),
                    };
                    match Uuid::parse_str(text.trim()) {
                        Ok(id) => organization_id = Some(id),
                        Err(_) => {
                            return error_response(
                                StatusCode::BAD_REQUEST,
                                "INVALID_ORGANIZATION_ID",
                                "organization_id must be a UUID",
                            );
                        }
                    }
                }
                Some("file") => {
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        return error_response(StatusCode::BAD_REQUEST, "NO_FILE_NAME", "File part has no file name");
                    };
                    let content_type = field.content_type().map(str::to_string);
                    match field.bytes().await {
                        Ok(bytes) => file = Some((file_name, content_type, bytes.to_vec())),
                        Err(e) => return error_response(StatusCode::BAD_REQUEST, "INVALID_MULTIPART", e),
                    }
                }
                _ => {}
            }
        }

        let Some(organization_id) = organization_id else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "NO_ORGANIZATION_ID",
                "organization_id field is required",
            );
        };
        let Some((file_name, content_type, file_data)) = file else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "NO_FILE_PROVIDED",
                "No file provided in the request",
            );
        };

        let request = UploadDocumentRequest {
            organization_id,
            file_name,
            file_data,
            content_type,
        };

        match handler.upload_use_case.execute(request).await {
            Ok(response) => ok_response(StatusCode::CREATED, DocumentResponseDto::from(response.document)),
            Err(e) => {
                let (status, code) = match &e {
                    UploadDocumentError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
                    UploadDocumentError::DuplicateDocument(_) => (StatusCode::CONFLICT, "DUPLICATE_DOCUMENT"),
                    UploadDocumentError::OrganizationNotFound(_) => {
                        (StatusCode::NOT_FOUND, "ORGANIZATION_NOT_FOUND")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_FAILED"),
                };
                error_response(status, code, e)
            }
        }
    }

    pub async fn list_documents(
        State(handler): State<Arc<DocumentHandler>>,
        Path(organization_id): Path<Uuid>,
        Query(pagination): Query<PaginationDto>,
    ) -> Response {
        let request = ListDocumentsRequest {
            organization_id,
            skip: pagination.skip,
            limit: pagination.limit,
        };

        match handler.list_documents_use_case.execute(request).await {
            Ok(response) => ok_response(
                StatusCode::OK,
                DocumentListResponseDto {
                    documents: response.documents.into_iter().map(DocumentResponseDto::from).collect(),
                    meta: PaginationMetaDto {
                        offset: response.skip,
                        limit: response.limit,
                        total: response.total_count,
                    },
                },
            ),
            Err(e @ ListDocumentsError::ValidationError(_)) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e)
            }
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "LIST_FAILED", e),
        }
    }

    pub async fn get_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Response {
        match handler.get_document_use_case.execute(document_id).await {
            Ok(document) => ok_response(StatusCode::OK, DocumentResponseDto::from(document)),
            Err(e @ GetDocumentError::DocumentNotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND", e)
            }
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", e),
        }
    }

    pub async fn get_document_chunks(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
        Query(pagination): Query<PaginationDto>,
    ) -> Response {
        let request = GetDocumentChunksRequest {
            document_id,
            skip: Some(pagination.skip),
            limit: Some(pagination.limit),
        };

        match handler.get_chunks_use_case.execute(request).await {
            Ok(response) => ok_response(StatusCode::OK, DocumentChunksResponseDto::from(response)),
            Err(e @ GetDocumentChunksError::DocumentNotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND", e)
            }
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", e),
        }
    }

    pub async fn reprocess_document(
        State(handler): State<Arc<DocumentHandler>>,
        Path(document_id): Path<Uuid>,
    ) -> Response {
        match handler.process_document_use_case.schedule_reprocess(document_id).await {
            Ok(document) => ok_response(StatusCode::ACCEPTED, DocumentResponseDto::from(document)),
            Err(e) => {
                let (status, code) = match &e {
                    ProcessDocumentError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND"),
                    ProcessDocumentError::AlreadyProcessing(_) => (StatusCode::CONFLICT, "ALREADY_PROCESSING"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "REPROCESS_FAILED"),
                };
                error_response(status, code, e)
            }
        }
    }
}
