#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use serde_json::Value;
    use utoipa::OpenApi;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};

    fn properties_of(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            other => panic!("{} should be an object schema, got {:?}", name, other),
        }
    }

    #[test]
    fn test_document_serializes() {
        let json: Value = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(json["info"]["title"], "Lapis API");
        assert!(json["paths"].as_object().unwrap().len() > 10);
    }

    #[test]
    fn test_error_and_health_schemas() {
        let error = properties_of("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(error.iter().any(|p| p == field), "ErrorResponse lacks {}", field);
        }

        let health = properties_of("HealthResponse");
        for field in ["status", "version", "database"] {
            assert!(health.iter().any(|p| p == field), "HealthResponse lacks {}", field);
        }
    }

    #[test]
    fn test_user_schema_has_no_password() {
        let user = properties_of("UserDto");
        assert!(user.iter().any(|p| p == "formatted_phone_number"));
        assert!(user.iter().any(|p| p == "staff_memo"));
        assert!(!user.iter().any(|p| p == "password"));
    }

    #[test]
    fn test_health_documents_failure() {
        let openapi = ApiDoc::openapi();
        let health = openapi.paths.paths.get("/health").expect("/health");
        let get = health.operations.get(&PathItemType::Get).expect("GET /health");
        assert!(get.responses.responses.contains_key("200"));
        assert!(get.responses.responses.contains_key("500"));
        assert!(get.security.is_none());
    }

    #[test]
    fn test_schema_references_use_short_names() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(!json.contains("crate.schemas"));
        assert!(!json.contains("common.ErrorResponse"));
        assert!(json.contains("#/components/schemas/ErrorResponse"));
    }

    #[test]
    fn test_openapi_paths_cover_public_and_staff_api() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/api/api-jwt-auth/",
            "/api/api-jwt-auth/refresh/",
            "/api/api-jwt-auth/verify/",
            "/api/rest-auth/registration/",
            "/api/users/me/",
            "/api/users/me/withdraw/",
            "/api/message-tokens/",
            "/admin/users/",
            "/admin/users/{user_id}/voucher/",
            "/admin/teacher-groups/{group_id}/",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }

        let me = paths.get("/api/users/me/").unwrap();
        assert!(me.operations.contains_key(&PathItemType::Get));
        assert!(me.operations.contains_key(&PathItemType::Patch));

        let tokens = paths.get("/api/message-tokens/").unwrap();
        assert_eq!(tokens.operations.len(), 3);
    }

    #[test]
    fn test_jwt_security_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("jwt"));

        let json = serde_json::to_value(&openapi).unwrap();
        assert_eq!(
            json["components"]["securitySchemes"]["jwt"]["name"],
            "Authorization"
        );
        assert_eq!(json["components"]["securitySchemes"]["jwt"]["in"], "header");
    }

    #[test]
    fn test_voucher_operation_schema_present() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        assert!(components.schemas.contains_key("VoucherOperation"));
        assert!(components.schemas.contains_key("VoucherHistoryDto"));
        assert!(components.schemas.contains_key("UserDto"));
    }
}
