//! Integration tests for the EdgeGrid client using wiremock
//!
//! These tests verify request paths, bodies and signing headers against
//! mocked Akamai endpoints, along with handling of error responses.

use akamai_provider::api::*;
use akamai_provider::edgegrid::{EdgeGridClient, EdgeGridCredentials};
use akamai_provider::{Provider, ProviderError};
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_json, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_PATTERN: &str =
    r"^EG1-HMAC-SHA256 client_token=ct-1;access_token=at-1;timestamp=\d{8}T\d{2}:\d{2}:\d{2}\+0000;nonce=[0-9a-f-]{36};signature=[A-Za-z0-9+/=]+$";

const POLICY: &str = "/appsec/v1/configs/43253/versions/7/security-policies/AAAA_81230";

fn client_for(server: &MockServer) -> EdgeGridClient {
    let creds = EdgeGridCredentials::new("akab-test.luna.akamaiapis.net", "ct-1", "cs-1", "at-1");
    EdgeGridClient::with_base_url(creds, Url::parse(&server.uri()).unwrap()).unwrap()
}

async fn mount_configuration(server: &MockServer, latest: i64, staging: i64) {
    Mock::given(method("GET"))
        .and(path("/appsec/v1/configs/43253"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 43253,
            "name": "site",
            "latestVersion": latest,
            "stagingVersion": staging
        })))
        .mount(server)
        .await;
}

mod http_client_tests {
    use super::*;

    /// Every request carries an EdgeGrid Authorization header
    #[tokio::test]
    async fn test_get_configuration_is_signed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253"))
            .and(header_regex("authorization", AUTH_PATTERN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 43253,
                "name": "site",
                "latestVersion": 7,
                "productionVersion": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let configuration = client_for(&server)
            .get_configuration(GetConfigurationRequest { config_id: 43253 })
            .await
            .unwrap();

        assert_eq!(configuration.latest_version, 7);
        assert_eq!(configuration.staging_version, 0);
        assert_eq!(configuration.production_version, 5);
        assert!(configuration.latest_is_editable());
    }

    #[tokio::test]
    async fn test_clone_version_posts_source_version() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/appsec/v1/configs/43253/versions"))
            .and(body_json(json!({"createFromVersion": 7, "ruleUpdate": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "configId": 43253,
                "version": 8,
                "basedOn": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cloned = client_for(&server)
            .clone_configuration_version(CloneVersionRequest {
                config_id: 43253,
                create_from_version: 7,
                rule_update: false,
                requested_by: "evalRule".into(),
            })
            .await
            .unwrap();

        assert_eq!(cloned.version, 8);
        assert_eq!(cloned.based_on, Some(7));
    }

    #[tokio::test]
    async fn test_eval_rule_action_only_update() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/eval-rules/1", POLICY)))
            .and(body_json(json!({"action": "alert"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"action": "alert"})))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .update_eval_rule(UpdateEvalRuleRequest {
                config_id: 43253,
                version: 7,
                policy_id: "AAAA_81230".into(),
                rule_id: 1,
                action: "alert".into(),
                condition_exception: None,
            })
            .await
            .unwrap();

        assert_eq!(resp.action, "alert");
    }

    #[tokio::test]
    async fn test_eval_rule_update_with_condition_exception() {
        let server = MockServer::start().await;
        let exception = json!({"exception": {"headerCookieOrParamValues": ["abc"]}});

        Mock::given(method("PUT"))
            .and(path(format!("{}/eval-rules/1/action-condition-exception", POLICY)))
            .and(body_json(json!({"action": "deny", "conditionException": exception})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": "deny",
                "conditionException": exception
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .update_eval_rule(UpdateEvalRuleRequest {
                config_id: 43253,
                version: 7,
                policy_id: "AAAA_81230".into(),
                rule_id: 1,
                action: "deny".into(),
                condition_exception: Some(exception.clone()),
            })
            .await
            .unwrap();

        assert_eq!(resp.condition_exception, Some(exception));
    }

    #[tokio::test]
    async fn test_api_constraints_query_and_remove() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/api-request-constraints", POLICY)))
            .and(query_param("apiId", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiEndpoints": [{"id": 1, "action": "alert"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/api-request-constraints/1", POLICY)))
            .and(body_json(json!({"action": "none"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apiEndpoints": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client
            .get_api_request_constraints(GetApiRequestConstraintsRequest {
                config_id: 43253,
                version: 7,
                policy_id: "AAAA_81230".into(),
                api_id: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(resp.action_for(1), Some("alert"));

        let removed = client
            .remove_api_request_constraints(RemoveApiRequestConstraintsRequest {
                config_id: 43253,
                version: 7,
                policy_id: "AAAA_81230".into(),
                api_id: Some(1),
                action: "none".into(),
            })
            .await
            .unwrap();
        assert!(removed.api_endpoints.is_empty());
    }

    #[tokio::test]
    async fn test_list_and_create_cp_codes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/papi/v1/cpcodes"))
            .and(query_param("contractId", "ctr_1"))
            .and(query_param("groupId", "grp_2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cpcodes": {"items": [{
                    "cpcodeId": "cpc_555",
                    "cpcodeName": "my-site",
                    "productIds": ["prd_Web_App_Accel"],
                    "createdDate": "2024-01-01T00:00:00Z"
                }]}
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/papi/v1/cpcodes"))
            .and(body_json(json!({"productId": "prd_Web_App_Accel", "cpcodeName": "other"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "cpcodeLink": "/papi/v1/cpcodes/cpc_777?contractId=ctr_1&groupId=grp_2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let list = ListCpCodesRequest {
            contract_id: "ctr_1".into(),
            group_id: "grp_2".into(),
        };
        let found = client.find_cp_code(list.clone(), "555").await.unwrap().unwrap();
        assert_eq!(found.cpcode_name, "my-site");
        assert!(client.find_cp_code(list, "other").await.unwrap().is_none());

        let created = client
            .create_cp_code(CreateCpCodeRequest {
                contract_id: "ctr_1".into(),
                group_id: "grp_2".into(),
                product_id: "prd_Web_App_Accel".into(),
                cpcode_name: "other".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.cpcode_id, "cpc_777");
    }

    #[tokio::test]
    async fn test_account_switch_key_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253"))
            .and(query_param("accountSwitchKey", "1-ABCDE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 43253})))
            .expect(1)
            .mount(&server)
            .await;

        let creds = EdgeGridCredentials::new("akab-test.luna.akamaiapis.net", "ct-1", "cs-1", "at-1")
            .with_account_key(Some("1-ABCDE".into()));
        let client = EdgeGridClient::with_base_url(creds, Url::parse(&server.uri()).unwrap()).unwrap();

        client
            .get_configuration(GetConfigurationRequest { config_id: 43253 })
            .await
            .unwrap();
    }
}

mod error_handling_tests {
    use super::*;

    /// Non-success responses keep status and problem detail
    #[tokio::test]
    async fn test_403_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "type": "https://problems.luna.akamaiapis.net/-/pep-authn/deny",
                "title": "Not authorized",
                "detail": "The client does not have the grant needed"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_configuration(GetConfigurationRequest { config_id: 43253 })
            .await
            .unwrap_err();

        match err {
            ProviderError::Api {
                status, detail, ..
            } => {
                assert_eq!(status, 403);
                assert_eq!(detail, "The client does not have the grant needed");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/protections", POLICY)))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_policy_protections(GetPolicyProtectionsRequest {
                config_id: 43253,
                version: 7,
                policy_id: "AAAA_81230".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    /// A failed version lookup stops the lifecycle before any write
    #[tokio::test]
    async fn test_failed_version_lookup_aborts_create() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/appsec/v1/configs/43253"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = Provider::new(Arc::new(client_for(&server)));
        let geo = provider.resource("akamai_appsec_ip_geo_protection").unwrap();
        let config = json!({"config_id": 43253, "security_policy_id": "AAAA_81230", "enabled": true});
        let mut d = akamai_provider::framework::ResourceData::from_config(
            geo.schema(),
            config.as_object().unwrap(),
        )
        .unwrap();

        let err = geo.create(&mut d).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(d.id().is_empty());
    }
}

mod lifecycle_over_http {
    use super::*;

    /// Full create against the HTTP client: version lookup, read-modify-write, read back
    #[tokio::test]
    async fn test_ip_geo_protection_create() {
        let server = MockServer::start().await;
        mount_configuration(&server, 7, 6).await;

        Mock::given(method("GET"))
            .and(path(format!("{}/protections", POLICY)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "applyApiConstraints": true,
                "applyNetworkLayerControls": false
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/protections", POLICY)))
            .and(body_json(json!({
                "applyApiConstraints": true,
                "applyApplicationLayerControls": false,
                "applyBotmanControls": false,
                "applyNetworkLayerControls": true,
                "applyRateControls": false,
                "applyReputationControls": false,
                "applySlowPostControls": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "applyApiConstraints": true,
                "applyNetworkLayerControls": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = Provider::new(Arc::new(client_for(&server)));
        let geo = provider.resource("akamai_appsec_ip_geo_protection").unwrap();
        let config = json!({"config_id": 43253, "security_policy_id": "AAAA_81230", "enabled": true});
        let mut d = akamai_provider::framework::ResourceData::from_config(
            geo.schema(),
            config.as_object().unwrap(),
        )
        .unwrap();

        geo.create(&mut d).await.unwrap();

        assert_eq!(d.id(), "43253:AAAA_81230");
        // the mocked GET still reports the old value; read reflects the remote
        assert!(!d.get_bool("enabled").unwrap());
        assert!(d.get_string("output_text").is_ok());
    }
}
